//! Rate-limited usage data source with caching and synthetic fallback.
//!
//! [`UsageSource`] wraps a [`Provider`] (normally an external command) and
//! turns raw usage documents into panel-ready [`DashboardMetrics`]. It
//! fetches at most once per interval, serves cached data in between, and
//! permanently switches to synthetic data the first time the provider
//! fails. Every accepted document feeds the trend log and metric history.

mod command;
mod mock;

pub use command::{CommandProvider, Provider, SourceError, DEFAULT_TIMEOUT};
pub use mock::SyntheticGenerator;

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::data::{
    DashboardMetrics, MetricHistory, TrendLog, TrendMetric, TrendPeriod, TrendSample,
    UsageSnapshot,
};

/// Largest context window tracked for utilization, in tokens.
pub const MAX_CONTEXT_WINDOW: f64 = 200_000.0;

/// Tokens-per-dollar ratio treated as 100% efficient.
const EFFICIENCY_BASELINE: f64 = 10_000.0;

/// Minimum seconds between provider fetches by default.
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_secs(5);

/// Current time as fractional unix seconds.
fn now_unix() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0.0, |d| d.as_secs_f64())
}

/// Tokens-per-dollar efficiency normalized so [`EFFICIENCY_BASELINE`]
/// tokens per dollar scores 100, capped at 100. Zero cost scores 0.
pub fn efficiency_score(cost: f64, tokens: f64) -> f64 {
    if cost > 0.0 {
        (tokens / cost / EFFICIENCY_BASELINE * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Rate-limited fetch-or-cache source of dashboard metrics.
pub struct UsageSource {
    provider: Box<dyn Provider>,
    generator: SyntheticGenerator,
    fetch_interval: Duration,
    last_fetch: Option<Instant>,
    /// Set once on the first provider failure; never cleared.
    mock_mode: bool,
    last_valid: Option<UsageSnapshot>,
    model_usage: HashMap<String, u64>,
    session_tokens: f64,
    trend: TrendLog,
    history: MetricHistory,
}

impl std::fmt::Debug for UsageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageSource")
            .field("provider", &self.provider.describe())
            .field("mock_mode", &self.mock_mode)
            .field("trend_len", &self.trend.len())
            .finish()
    }
}

impl UsageSource {
    /// Create a source over the given provider with a custom fetch interval.
    pub fn new(provider: Box<dyn Provider>, fetch_interval: Duration) -> Self {
        Self {
            provider,
            generator: SyntheticGenerator::default(),
            fetch_interval,
            last_fetch: None,
            mock_mode: false,
            last_valid: None,
            model_usage: HashMap::new(),
            session_tokens: 0.0,
            trend: TrendLog::default(),
            history: MetricHistory::default(),
        }
    }

    /// Create a source with the default fetch interval.
    pub fn with_default_interval(provider: Box<dyn Provider>) -> Self {
        Self::new(provider, DEFAULT_FETCH_INTERVAL)
    }

    /// Description of the underlying provider for the status bar.
    pub fn description(&self) -> &str {
        self.provider.describe()
    }

    /// True once the source has switched to synthetic data.
    pub fn is_synthetic(&self) -> bool {
        self.mock_mode
    }

    /// Trailing sparkline samples for a recorded metric name.
    pub fn sparkline(&self, metric: &str) -> Vec<f64> {
        self.history.sparkline(metric)
    }

    /// Trend series for a metric over a period (most recent last).
    pub fn trend_series(&self, metric: TrendMetric, period: TrendPeriod) -> Vec<f64> {
        self.trend.series(metric, period, now_unix())
    }

    /// Fetch the latest metrics, honoring the rate limit.
    ///
    /// Within the interval this derives metrics from the cached document
    /// without touching the provider or the histories, so repeated calls
    /// return identical data. When the interval has elapsed, one provider
    /// invocation is attempted (unless already in synthetic mode); any
    /// failure flips the source to synthetic mode for good.
    pub fn fetch(&mut self) -> DashboardMetrics {
        let now = Instant::now();
        let within_interval = self
            .last_fetch
            .is_some_and(|last| now.duration_since(last) < self.fetch_interval);

        if within_interval {
            let snapshot = match &self.last_valid {
                Some(cached) => cached.clone(),
                None => self.generator.next_snapshot(),
            };
            return self.process(&snapshot);
        }

        let snapshot = if self.mock_mode {
            self.generator.next_snapshot()
        } else {
            match self.provider.invoke() {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    // One-way transition; report it exactly once
                    self.mock_mode = true;
                    tracing::warn!(
                        error = %err,
                        "provider unavailable, switching to synthetic data for this run"
                    );
                    self.generator.next_snapshot()
                }
            }
        };

        self.ingest(&snapshot);
        self.last_fetch = Some(now);
        let metrics = self.process(&snapshot);
        self.last_valid = Some(snapshot);
        metrics
    }

    /// Fold an accepted document into the cache, trend log, and histories.
    fn ingest(&mut self, snapshot: &UsageSnapshot) {
        let at = now_unix();

        if !snapshot.model.is_empty() {
            *self.model_usage.entry(snapshot.model.clone()).or_insert(0) += 1;
        }
        self.session_tokens = snapshot.session.tokens;

        self.trend.push(TrendSample {
            at,
            cost: snapshot.total_cost,
            tokens: snapshot.total_tokens,
        });

        self.history.record("cost", snapshot.total_cost);
        self.history.record("tokens", snapshot.total_tokens);
        self.history.record("burn_rate", self.trend.burn_rate(at));
        self.history.record("context_util", self.context_utilization());
        self.history
            .record("efficiency", efficiency_score(snapshot.total_cost, snapshot.total_tokens));
    }

    /// Derive the panel-ready document from a snapshot plus current state.
    fn process(&self, snapshot: &UsageSnapshot) -> DashboardMetrics {
        let now = now_unix();
        let trend_data = {
            let series = self.trend.series(TrendMetric::Cost, TrendPeriod::Daily, now);
            let skip = series.len().saturating_sub(crate::data::history::SPARKLINE_POINTS);
            series[skip..].to_vec()
        };

        DashboardMetrics {
            total_cost: snapshot.total_cost,
            total_tokens: snapshot.total_tokens,
            burn_rate: self.trend.burn_rate(now),
            efficiency: efficiency_score(snapshot.total_cost, snapshot.total_tokens),
            model_distribution: self.model_distribution(),
            context_utilization: self.context_utilization(),
            trend_data,
            cost_trend: self.trend.cost_trend(),
            token_trend: self.trend.token_trend(),
            synthetic: self.mock_mode,
        }
    }

    /// Each model's share of observed occurrences, in percent.
    ///
    /// Empty when nothing has been observed.
    pub fn model_distribution(&self) -> HashMap<String, f64> {
        let total: u64 = self.model_usage.values().sum();
        if total == 0 {
            return HashMap::new();
        }
        self.model_usage
            .iter()
            .map(|(model, count)| (model.clone(), *count as f64 / total as f64 * 100.0))
            .collect()
    }

    /// Session tokens as a percentage of the max context window.
    pub fn context_utilization(&self) -> f64 {
        self.session_tokens / MAX_CONTEXT_WINDOW * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted provider: returns queued results, then errors.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        responses: Vec<Result<UsageSnapshot, SourceError>>,
        invocations: usize,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<UsageSnapshot, SourceError>>) -> Self {
            Self {
                responses,
                invocations: 0,
            }
        }
    }

    impl Provider for ScriptedProvider {
        fn invoke(&mut self) -> Result<UsageSnapshot, SourceError> {
            self.invocations += 1;
            if self.responses.is_empty() {
                Err(SourceError::Timeout)
            } else {
                self.responses.remove(0)
            }
        }

        fn describe(&self) -> &str {
            "scripted"
        }
    }

    fn snapshot(cost: f64, tokens: f64, model: &str) -> UsageSnapshot {
        UsageSnapshot {
            total_cost: cost,
            total_tokens: tokens,
            model: model.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_efficiency_score() {
        assert_eq!(efficiency_score(0.0, 50_000.0), 0.0);
        // Exactly the baseline ratio scores 100
        assert_eq!(efficiency_score(3.0, 30_000.0), 100.0);
        // Better than baseline is capped
        assert_eq!(efficiency_score(1.0, 1_000_000.0), 100.0);
        assert!((efficiency_score(2.0, 10_000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_limit_serves_cache() {
        let provider = ScriptedProvider::new(vec![Ok(snapshot(1.0, 100.0, "opus"))]);
        let mut source = UsageSource::new(Box::new(provider), Duration::from_secs(60));

        let first = source.fetch();
        let second = source.fetch();

        assert_eq!(first.total_cost, second.total_cost);
        assert_eq!(first.total_tokens, second.total_tokens);
        assert_eq!(first.model_distribution, second.model_distribution);
        // Second call did not re-ingest
        assert_eq!(source.trend.len(), 1);
    }

    #[test]
    fn test_provider_failure_switches_to_synthetic_permanently() {
        let provider = ScriptedProvider::new(vec![
            Err(SourceError::Timeout),
            Ok(snapshot(9.0, 9.0, "never-seen")),
        ]);
        let mut source = UsageSource::new(Box::new(provider), Duration::ZERO);

        let metrics = source.fetch();
        assert!(metrics.synthetic);
        assert!(source.is_synthetic());

        // Subsequent fetches never try the provider again, even though it
        // would now succeed
        for _ in 0..5 {
            assert!(source.fetch().synthetic);
        }
        assert!(!source.model_distribution().contains_key("never-seen"));
    }

    #[test]
    fn test_successful_fetch_feeds_histories() {
        let provider = ScriptedProvider::new(vec![
            Ok(snapshot(1.0, 10_000.0, "opus")),
            Ok(snapshot(2.0, 20_000.0, "sonnet")),
            Ok(snapshot(3.0, 30_000.0, "opus")),
        ]);
        let mut source = UsageSource::new(Box::new(provider), Duration::ZERO);

        for _ in 0..3 {
            source.fetch();
        }

        assert_eq!(source.trend.len(), 3);
        assert_eq!(source.sparkline("cost"), vec![1.0, 2.0, 3.0]);

        let dist = source.model_distribution();
        let sum: f64 = dist.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((dist["opus"] - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_distribution_empty_without_observations() {
        let provider = ScriptedProvider::new(vec![]);
        let source = UsageSource::new(Box::new(provider), Duration::ZERO);
        assert!(source.model_distribution().is_empty());
    }

    #[test]
    fn test_context_utilization() {
        let mut snap = snapshot(1.0, 1.0, "opus");
        snap.session.tokens = 50_000.0;
        let provider = ScriptedProvider::new(vec![Ok(snap)]);
        let mut source = UsageSource::new(Box::new(provider), Duration::ZERO);

        let metrics = source.fetch();
        assert!((metrics.context_utilization - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_percentages() {
        let provider = ScriptedProvider::new(vec![
            Ok(snapshot(10.0, 100.0, "opus")),
            Ok(snapshot(15.0, 50.0, "opus")),
        ]);
        let mut source = UsageSource::new(Box::new(provider), Duration::ZERO);

        source.fetch();
        let metrics = source.fetch();
        assert!((metrics.cost_trend - 50.0).abs() < 1e-9);
        assert!((metrics.token_trend - -50.0).abs() < 1e-9);
    }
}
