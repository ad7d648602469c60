//! Rolling per-metric sample buffers for sparklines.

use std::collections::{HashMap, VecDeque};

/// Default number of samples retained per metric.
pub const DEFAULT_CAPACITY: usize = 50;

/// Number of trailing points exposed for sparkline views.
pub const SPARKLINE_POINTS: usize = 20;

/// Fixed-capacity rolling buffers of float samples, keyed by metric name.
///
/// Appending beyond capacity evicts the oldest sample, so each buffer
/// always holds the most recent `capacity` values.
#[derive(Debug, Clone)]
pub struct MetricHistory {
    series: HashMap<String, VecDeque<f64>>,
    capacity: usize,
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MetricHistory {
    /// Create an empty history with the given per-metric capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            series: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample for a metric, evicting the oldest if at capacity.
    pub fn record(&mut self, metric: &str, value: f64) {
        let buf = self.series.entry(metric.to_string()).or_default();
        buf.push_back(value);
        while buf.len() > self.capacity {
            buf.pop_front();
        }
    }

    /// Number of samples currently held for a metric.
    pub fn len(&self, metric: &str) -> usize {
        self.series.get(metric).map_or(0, VecDeque::len)
    }

    /// True when no samples are held for a metric.
    pub fn is_empty(&self, metric: &str) -> bool {
        self.len(metric) == 0
    }

    /// All retained samples for a metric, oldest first.
    pub fn samples(&self, metric: &str) -> Vec<f64> {
        self.series.get(metric).map_or_else(Vec::new, |buf| buf.iter().copied().collect())
    }

    /// The trailing [`SPARKLINE_POINTS`] samples for a metric, oldest first.
    pub fn sparkline(&self, metric: &str) -> Vec<f64> {
        let Some(buf) = self.series.get(metric) else {
            return Vec::new();
        };
        let skip = buf.len().saturating_sub(SPARKLINE_POINTS);
        buf.iter().skip(skip).copied().collect()
    }
}
