//! # spendwatch
//!
//! A live, keyboard-interactive terminal dashboard for AI API usage and
//! spend metrics.
//!
//! Spendwatch polls a usage provider (an external command emitting JSON) at
//! a bounded rate, derives trend and efficiency statistics, and renders a
//! themed multi-panel layout that updates in place.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Dashboard                           │
//! │  ┌────────┐    ┌──────────┐    ┌────────┐    ┌──────────┐  │
//! │  │  app   │───▶│  source  │───▶│   ui   │───▶│ Terminal │  │
//! │  │(engine)│    │ (fetch)  │    │(render)│    │          │  │
//! │  └───┬────┘    └──────────┘    └────────┘    └──────────┘  │
//! │      ▲                                                     │
//! │      │ actions (single-slot channel)                       │
//! │  ┌───┴────┐                                                │
//! │  │ events │◀── keyboard listener thread (raw mode)         │
//! │  └────────┘                                                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: the engine: panel registry, live loop, action handling
//! - **[`source`]**: rate-limited fetch-or-cache over a [`Provider`], with
//!   permanent synthetic fallback when the provider is unavailable
//! - **[`data`]**: rolling histories, the trend log, and derived metrics
//! - **[`panel`]** / **[`layout`]**: the panel model and slot assignment
//! - **[`events`]**: keyboard listener with scoped raw-mode acquisition
//! - **[`ui`]**: ratatui rendering and the theme tables
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use spendwatch::{CommandProvider, Dashboard, DashboardConfig, UsageSource};
//!
//! # fn main() -> anyhow::Result<()> {
//! let provider = CommandProvider::new(
//!     vec!["ccusage".into(), "--json".into()],
//!     Duration::from_secs(10),
//! )?;
//! let source = UsageSource::with_default_interval(Box::new(provider));
//! let mut dashboard = Dashboard::new(source);
//! dashboard.initialize(&DashboardConfig::default());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod layout;
pub mod panel;
pub mod source;
pub mod ui;

pub use app::{stats_report, Dashboard, LayoutExport};
pub use config::{DashboardConfig, PanelSpec};
pub use data::{DashboardMetrics, MetricHistory, TrendLog, UsageSnapshot};
pub use events::{Action, KeyboardListener};
pub use panel::{Panel, PanelData, PanelKind, PanelRegistry, StatusKind};
pub use source::{CommandProvider, Provider, SourceError, UsageSource};
pub use ui::{Theme, ThemeName};
