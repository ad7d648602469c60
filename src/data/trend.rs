//! Trend log for burn-rate and percent-change calculations.

use std::collections::VecDeque;

/// Default number of trend samples retained.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Seconds in the trailing window used for burn-rate computation.
const BURN_RATE_WINDOW_SECS: f64 = 3600.0;

/// A single observation of cumulative cost and tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSample {
    /// Unix timestamp in seconds.
    pub at: f64,
    /// Cumulative cost in dollars at this point.
    pub cost: f64,
    /// Cumulative token count at this point.
    pub tokens: f64,
}

/// Which series to extract from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendMetric {
    Cost,
    Tokens,
}

/// Time window for filtering trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
    All,
}

impl TrendPeriod {
    fn cutoff(self, now: f64) -> f64 {
        match self {
            TrendPeriod::Daily => now - 24.0 * 3600.0,
            TrendPeriod::Weekly => now - 7.0 * 24.0 * 3600.0,
            TrendPeriod::Monthly => now - 30.0 * 24.0 * 3600.0,
            TrendPeriod::All => f64::MIN,
        }
    }
}

/// Append-only, capacity-bounded log of (timestamp, cost, tokens) samples.
///
/// Feeds burn-rate and percent-change computations; all queries are pure
/// functions of the retained samples.
#[derive(Debug, Clone)]
pub struct TrendLog {
    samples: VecDeque<TrendSample>,
    capacity: usize,
}

impl Default for TrendLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TrendLog {
    /// Create an empty log retaining at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, evicting the oldest when at capacity.
    pub fn push(&mut self, sample: TrendSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Spending rate in dollars per hour over the trailing hour.
    ///
    /// Computed from the first and last samples whose timestamps fall within
    /// the hour before `now`. Returns 0.0 when fewer than two samples fall
    /// in the window or when elapsed time is not positive.
    pub fn burn_rate(&self, now: f64) -> f64 {
        let cutoff = now - BURN_RATE_WINDOW_SECS;
        let mut window = self.samples.iter().filter(|s| s.at > cutoff);

        let Some(first) = window.next() else {
            return 0.0;
        };
        let Some(last) = window.last() else {
            return 0.0;
        };

        let elapsed_hours = (last.at - first.at) / 3600.0;
        if elapsed_hours > 0.0 {
            (last.cost - first.cost) / elapsed_hours
        } else {
            0.0
        }
    }

    /// Percent change in cost between the two most recent samples.
    ///
    /// Returns 0.0 with fewer than two samples or a zero denominator.
    pub fn cost_trend(&self) -> f64 {
        self.latest_change(|s| s.cost)
    }

    /// Percent change in tokens between the two most recent samples.
    pub fn token_trend(&self) -> f64 {
        self.latest_change(|s| s.tokens)
    }

    fn latest_change(&self, field: impl Fn(&TrendSample) -> f64) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let prev = field(&self.samples[n - 2]);
        let curr = field(&self.samples[n - 1]);
        if prev == 0.0 {
            return 0.0;
        }
        (curr - prev) / prev * 100.0
    }

    /// Extract a metric series for samples newer than the period cutoff.
    pub fn series(&self, metric: TrendMetric, period: TrendPeriod, now: f64) -> Vec<f64> {
        let cutoff = period.cutoff(now);
        self.samples
            .iter()
            .filter(|s| s.at > cutoff)
            .map(|s| match metric {
                TrendMetric::Cost => s.cost,
                TrendMetric::Tokens => s.tokens,
            })
            .collect()
    }
}
