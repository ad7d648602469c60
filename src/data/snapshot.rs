//! Raw provider document model.
//!
//! The provider command emits a single JSON document. Every field carries a
//! serde default so any tolerably-shaped document deserializes; absent or
//! wrong-typed sections become zeros and empty strings.

use serde::{Deserialize, Serialize};

/// Usage totals for one accounting window (session, daily, weekly, monthly).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowUsage {
    pub tokens: f64,
    pub cost: f64,
}

/// The raw usage document as emitted by the provider command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageSnapshot {
    /// Cumulative cost in dollars.
    pub total_cost: f64,
    /// Cumulative token count.
    pub total_tokens: f64,
    /// Model name attributed to the most recent usage.
    pub model: String,
    /// Current session usage.
    pub session: WindowUsage,
    pub daily: WindowUsage,
    pub weekly: WindowUsage,
    pub monthly: WindowUsage,
}
