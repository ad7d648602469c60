//! Processed, panel-ready metrics derived from the cache and trend state.

use std::collections::HashMap;

/// Dashboard-ready view of the latest usage data.
///
/// Produced by [`crate::source::UsageSource::fetch`] on every call; panels
/// extract their payloads from this document.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub total_cost: f64,
    pub total_tokens: f64,
    /// Dollars per hour over the trailing hour.
    pub burn_rate: f64,
    /// Tokens-per-dollar efficiency, 0..=100.
    pub efficiency: f64,
    /// Model name -> share of observed occurrences, in percent.
    pub model_distribution: HashMap<String, f64>,
    /// Session tokens as a percentage of the max context window.
    pub context_utilization: f64,
    /// Trailing cost samples for the trend chart.
    pub trend_data: Vec<f64>,
    /// Percent change in cost between the two most recent trend samples.
    pub cost_trend: f64,
    /// Percent change in tokens between the two most recent trend samples.
    pub token_trend: f64,
    /// True when the source has fallen back to synthetic data.
    pub synthetic: bool,
}
