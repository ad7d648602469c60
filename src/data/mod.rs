//! Data models: raw snapshots, rolling histories, and derived metrics.
//!
//! ## Data flow
//!
//! ```text
//! UsageSnapshot (raw provider JSON)
//!        │
//!        ▼
//! UsageSource::fetch()
//!        │
//!        ├──▶ TrendLog (burn rate, percent change)
//!        ├──▶ MetricHistory (sparklines)
//!        │
//!        └──▶ DashboardMetrics (panel-ready document)
//! ```

pub mod history;
pub mod metrics;
pub mod snapshot;
pub mod trend;

pub use history::MetricHistory;
pub use metrics::DashboardMetrics;
pub use snapshot::{UsageSnapshot, WindowUsage};
pub use trend::{TrendLog, TrendMetric, TrendPeriod, TrendSample};
