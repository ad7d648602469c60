//! The dashboard engine: state, panel operations, and the live loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::{backend::Backend, Terminal};
use serde::{Deserialize, Serialize};

use crate::config::{clamp_refresh_rate, DashboardConfig};
use crate::data::DashboardMetrics;
use crate::events::{Action, KeyboardListener};
use crate::layout::SlotGrid;
use crate::panel::{Panel, PanelData, PanelKind, PanelRegistry, StatusKind};
use crate::source::UsageSource;
use crate::ui;
use crate::ui::theme::{Theme, ThemeName};

/// Engine loop tick; independent of the data refresh rate.
const TICK: Duration = Duration::from_millis(100);

/// Status messages disappear after this long.
const STATUS_TTL: Duration = Duration::from_secs(2);

/// The help overlay disappears after this long.
const HELP_TTL: Duration = Duration::from_secs(3);

/// Serializable layout snapshot; panel payloads are excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutExport {
    pub theme: String,
    pub refresh_rate: u64,
    pub panels: Vec<PanelExport>,
}

/// One panel's layout-relevant fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelExport {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: (u16, u16),
    pub size: (u16, u16),
    pub refresh_rate: u64,
}

/// The dashboard engine.
///
/// Owns the panel registry, slot grid, data source, and all live-mode
/// state. Runs `Stopped -> Running -> Stopped`; stop is idempotent. While
/// running, `paused` suppresses timed data refreshes without stopping the
/// draw cadence or the keyboard listener.
pub struct Dashboard {
    pub running: bool,
    pub paused: bool,
    pub theme_name: ThemeName,
    pub theme: Theme,
    pub compact: bool,
    refresh_rate: u64,
    /// When the data was last refreshed.
    pub last_update: Option<Instant>,
    status_message: Option<(String, Instant)>,
    help_shown_at: Option<Instant>,
    pending_export: Option<PathBuf>,
    export_path: PathBuf,
    force_redraw: bool,
    panels: PanelRegistry,
    grid: SlotGrid,
    source: UsageSource,
}

impl Dashboard {
    /// Create an engine over a data source with default settings.
    pub fn new(source: UsageSource) -> Self {
        Self {
            running: false,
            paused: false,
            theme_name: ThemeName::default(),
            theme: Theme::of(ThemeName::default()),
            compact: false,
            refresh_rate: 5,
            last_update: None,
            status_message: None,
            help_shown_at: None,
            pending_export: None,
            export_path: PathBuf::from("spendwatch_layout.json"),
            force_redraw: false,
            panels: PanelRegistry::new(),
            grid: SlotGrid::new(),
            source,
        }
    }

    /// Apply configuration: theme, refresh rate, and the default panels.
    pub fn initialize(&mut self, config: &DashboardConfig) {
        self.set_theme(config.theme);
        self.set_refresh_rate(config.refresh_rate);
        self.compact = config.compact_mode;
        self.export_path = config.export_path.clone();
        for spec in &config.default_panels {
            self.add_panel(Panel::from(spec));
        }
    }

    /// Add a panel (last-write-wins on duplicate id) and assign its slot.
    pub fn add_panel(&mut self, panel: Panel) -> String {
        let id = self.panels.add(panel);
        self.grid.assign(&id);
        id
    }

    /// Replace a panel's payload in place.
    pub fn update_panel(&mut self, id: &str, data: PanelData) -> bool {
        self.panels.update_data(id, data)
    }

    /// Remove a panel, freeing its slot. Other panels keep their slots.
    pub fn remove_panel(&mut self, id: &str) -> bool {
        if self.panels.remove(id) {
            self.grid.release(id);
            true
        } else {
            false
        }
    }

    pub fn panels(&self) -> &PanelRegistry {
        &self.panels
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn source(&self) -> &UsageSource {
        &self.source
    }

    /// Current refresh rate in seconds.
    pub fn refresh_rate(&self) -> u64 {
        self.refresh_rate
    }

    /// Set the refresh rate, clamped to the supported range.
    pub fn set_refresh_rate(&mut self, rate: u64) {
        self.refresh_rate = clamp_refresh_rate(rate);
    }

    /// Switch to a specific theme.
    pub fn set_theme(&mut self, name: ThemeName) {
        self.theme_name = name;
        self.theme = Theme::of(name);
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.set_theme(self.theme_name.next());
    }

    /// Set a transient status message shown in the footer.
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// The current status message, unless it has expired.
    pub fn status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.help_shown_at = if self.help_visible() {
            None
        } else {
            Some(Instant::now())
        };
    }

    /// True while the help overlay should be drawn (auto-expires).
    pub fn help_visible(&self) -> bool {
        self.help_shown_at.is_some_and(|at| at.elapsed() < HELP_TTL)
    }

    /// Queue a layout export, flushed on the next tick.
    pub fn request_export(&mut self) {
        self.pending_export = Some(self.export_path.clone());
    }

    /// Produce the serializable layout snapshot.
    ///
    /// Contains identity and geometry only; panel payloads never appear.
    pub fn export_layout(&self) -> LayoutExport {
        LayoutExport {
            theme: self.theme_name.label().to_string(),
            refresh_rate: self.refresh_rate,
            panels: self
                .panels
                .iter()
                .map(|p| PanelExport {
                    id: p.id.clone(),
                    title: p.title.clone(),
                    kind: p.kind.label().to_string(),
                    position: p.position,
                    size: p.size,
                    refresh_rate: p.refresh_rate,
                })
                .collect(),
        }
    }

    /// Write the layout snapshot to a file as pretty JSON.
    pub fn write_export(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.export_layout())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Toggle pause and report the new state in the footer.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        let state = if self.paused { "paused" } else { "resumed" };
        self.set_status_message(format!("Auto-refresh {}", state));
    }

    /// Leave live mode. Safe to call repeatedly.
    pub fn stop_live(&mut self) {
        self.running = false;
    }

    /// Fetch the latest metrics and push fresh payloads into every panel.
    pub fn refresh_panels(&mut self) {
        let metrics = self.source.fetch();
        let ids: Vec<String> = self.panels.iter().map(|p| p.id.clone()).collect();
        for id in ids {
            let Some(panel) = self.panels.get(&id) else {
                continue;
            };
            if let Some(data) = self.extract_panel_data(panel, &metrics) {
                self.panels.update_data(&id, data);
            }
        }
        self.last_update = Some(Instant::now());
    }

    /// Build a panel's payload from the processed metrics.
    ///
    /// Metric panels are matched by id; other kinds by type. Returns `None`
    /// for panels this source has no data for (their payload is kept).
    fn extract_panel_data(&self, panel: &Panel, metrics: &DashboardMetrics) -> Option<PanelData> {
        match panel.kind {
            PanelKind::Metric => match panel.id.as_str() {
                "cost" => Some(PanelData::Metric {
                    value: format!("${:.2}", metrics.total_cost),
                    trend: metrics.cost_trend,
                    sparkline: self.source.sparkline("cost"),
                }),
                "tokens" => Some(PanelData::Metric {
                    value: format_tokens(metrics.total_tokens),
                    trend: metrics.token_trend,
                    sparkline: self.source.sparkline("tokens"),
                }),
                "burn_rate" => Some(PanelData::Metric {
                    value: format!("${:.4}/hr", metrics.burn_rate),
                    trend: 0.0,
                    sparkline: self.source.sparkline("burn_rate"),
                }),
                "efficiency" => Some(PanelData::Metric {
                    value: format!("{:.0}%", metrics.efficiency),
                    trend: 0.0,
                    sparkline: self.source.sparkline("efficiency"),
                }),
                _ => None,
            },
            PanelKind::Chart => Some(PanelData::Chart {
                values: metrics.trend_data.clone(),
            }),
            PanelKind::Gauge => Some(PanelData::Gauge {
                value: metrics.context_utilization,
                max: 100.0,
            }),
            PanelKind::List => {
                let mut shares: Vec<(&String, &f64)> = metrics.model_distribution.iter().collect();
                shares.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
                Some(PanelData::List {
                    items: shares
                        .into_iter()
                        .map(|(model, pct)| format!("{} {:.1}%", model, pct))
                        .collect(),
                })
            }
            PanelKind::Status => Some(if metrics.synthetic {
                PanelData::Status {
                    status: StatusKind::Warning,
                    message: "provider unavailable, showing synthetic data".to_string(),
                }
            } else {
                PanelData::Status {
                    status: StatusKind::Online,
                    message: self.source.description().to_string(),
                }
            }),
            // Heatmaps keep whatever payload they were given
            PanelKind::Heatmap | PanelKind::Other(_) => None,
        }
    }

    /// Apply a keyboard-triggered action to the engine state.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.stop_live(),
            Action::RefreshNow => {
                self.refresh_panels();
                self.set_status_message("Refreshed");
            }
            Action::ToggleHelp => self.toggle_help(),
            Action::TogglePause => self.toggle_pause(),
            Action::CycleTheme => {
                self.cycle_theme();
                self.set_status_message(format!("Theme: {}", self.theme_name.label()));
            }
            Action::FasterRefresh => {
                self.set_refresh_rate(self.refresh_rate.saturating_sub(1));
                self.set_status_message(format!("Refresh rate: {}s", self.refresh_rate));
            }
            Action::SlowerRefresh => {
                self.set_refresh_rate(self.refresh_rate + 1);
                self.set_status_message(format!("Refresh rate: {}s", self.refresh_rate));
            }
            Action::RequestExport => self.request_export(),
            Action::ClearRedraw => self.force_redraw = true,
            // Reserved for future panel navigation
            Action::Navigate(_) => {}
        }
    }

    /// True when a timed refresh is due.
    fn refresh_due(&self) -> bool {
        !self.paused
            && self
                .last_update
                .map_or(true, |at| at.elapsed() >= Duration::from_secs(self.refresh_rate))
    }

    /// Flush a queued export, surfacing failure only as a status message.
    fn flush_pending_export(&mut self) {
        let Some(path) = self.pending_export.take() else {
            return;
        };
        match self.write_export(&path) {
            Ok(()) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "layout export failed");
                self.set_status_message(format!("Export failed: {}", err));
            }
        }
    }

    /// Run live mode until [`Dashboard::stop_live`] or a quit action.
    ///
    /// Spawns the keyboard listener, then loops on a fixed tick: drain
    /// actions, refresh data when due, flush pending exports, draw. No
    /// error inside the loop terminates it; only explicit stop does.
    pub fn run_live<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.running = true;
        let listener = KeyboardListener::spawn();
        self.refresh_panels();

        while self.running {
            while let Some(action) = listener.try_next() {
                self.apply(action);
            }
            if !self.running {
                break;
            }

            if self.refresh_due() {
                self.refresh_panels();
            }

            if self.force_redraw {
                self.force_redraw = false;
                let _ = terminal.clear();
            }

            self.flush_pending_export();

            self.render_frame(terminal);

            std::thread::sleep(TICK);
        }

        listener.stop();
        Ok(())
    }

    /// Draw one frame. A backend error is logged and swallowed so the live
    /// loop keeps running; the next tick retries.
    fn render_frame<B: Backend>(&mut self, terminal: &mut Terminal<B>) {
        if let Err(err) = terminal.draw(|frame| ui::chrome::draw(frame, self)) {
            tracing::warn!(error = %err, "draw failed, will retry next tick");
        }
    }
}

/// Plain-text usage summary for one-shot stats mode.
pub fn stats_report(metrics: &DashboardMetrics) -> String {
    let mut out = String::new();
    out.push_str("Usage Statistics\n");
    out.push_str(&"=".repeat(40));
    out.push('\n');
    out.push_str(&format!("Total Cost: ${:.2}\n", metrics.total_cost));
    out.push_str(&format!(
        "Total Tokens: {}\n",
        format_tokens(metrics.total_tokens)
    ));
    out.push_str(&format!("Burn Rate: ${:.4}/hr\n", metrics.burn_rate));

    if !metrics.model_distribution.is_empty() {
        out.push_str("\nModel Distribution:\n");
        let mut shares: Vec<_> = metrics.model_distribution.iter().collect();
        shares.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (model, share) in shares {
            out.push_str(&format!("  {}: {:.1}%\n", model, share));
        }
    }
    out
}

/// Format a token count with thousands separators.
fn format_tokens(tokens: f64) -> String {
    let value = tokens.round() as i64;
    let raw = value.abs().to_string();
    let mut out = String::new();
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::UsageSnapshot;
    use crate::source::{Provider, SourceError};
    use tempfile::tempdir;

    #[derive(Debug)]
    struct FixedProvider {
        snapshot: UsageSnapshot,
        invocations: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl Provider for FixedProvider {
        fn invoke(&mut self) -> Result<UsageSnapshot, SourceError> {
            self.invocations.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok(self.snapshot.clone())
        }

        fn describe(&self) -> &str {
            "fixed"
        }
    }

    fn dashboard() -> Dashboard {
        dashboard_counting().0
    }

    fn dashboard_counting() -> (Dashboard, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let invocations = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let provider = FixedProvider {
            snapshot: UsageSnapshot {
                total_cost: 10.0,
                total_tokens: 50_000.0,
                model: "opus".to_string(),
                ..Default::default()
            },
            invocations: std::sync::Arc::clone(&invocations),
        };
        let source = UsageSource::new(Box::new(provider), Duration::ZERO);
        (Dashboard::new(source), invocations)
    }

    #[test]
    fn test_initialize_registers_default_panels() {
        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        assert_eq!(dash.panels().len(), 6);
        assert_eq!(dash.refresh_rate(), 5);
        // Slots assigned in insertion order
        assert_eq!(dash.grid().slot_of("cost"), Some(0));
        assert_eq!(dash.grid().slot_of("models"), Some(5));
    }

    #[test]
    fn test_set_refresh_rate_clamps() {
        let mut dash = dashboard();
        dash.set_refresh_rate(0);
        assert_eq!(dash.refresh_rate(), 1);
        dash.set_refresh_rate(100);
        assert_eq!(dash.refresh_rate(), 60);
        dash.set_refresh_rate(10);
        assert_eq!(dash.refresh_rate(), 10);
    }

    #[test]
    fn test_refresh_rate_actions_clamp() {
        let mut dash = dashboard();
        dash.set_refresh_rate(1);
        dash.apply(Action::FasterRefresh);
        assert_eq!(dash.refresh_rate(), 1);
        dash.set_refresh_rate(60);
        dash.apply(Action::SlowerRefresh);
        assert_eq!(dash.refresh_rate(), 60);
    }

    #[test]
    fn test_toggle_pause_round_trip_and_gating() {
        let (mut dash, invocations) = dashboard_counting();
        assert!(!dash.paused);

        dash.apply(Action::TogglePause);
        assert!(dash.paused);
        // Timed refresh is suppressed while paused, regardless of elapsed time
        assert!(!dash.refresh_due());
        assert_eq!(invocations.load(std::sync::atomic::Ordering::Relaxed), 0);

        dash.apply(Action::TogglePause);
        assert!(!dash.paused);
        assert!(dash.refresh_due());
    }

    #[test]
    fn test_cycle_theme_action() {
        let mut dash = dashboard();
        assert_eq!(dash.theme_name, ThemeName::Monokai);
        dash.apply(Action::CycleTheme);
        assert_eq!(dash.theme_name, ThemeName::Dracula);
        assert!(dash.status_message().unwrap().contains("dracula"));
    }

    #[test]
    fn test_refresh_panels_fills_payloads() {
        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        dash.refresh_panels();

        let cost = dash.panels().get("cost").unwrap();
        match &cost.data {
            PanelData::Metric { value, .. } => assert_eq!(value, "$10.00"),
            other => panic!("unexpected payload: {:?}", other),
        }
        let tokens = dash.panels().get("tokens").unwrap();
        match &tokens.data {
            PanelData::Metric { value, .. } => assert_eq!(value, "50,000"),
            other => panic!("unexpected payload: {:?}", other),
        }
        assert!(dash.last_update.is_some());
    }

    #[test]
    fn test_export_excludes_removed_panel_and_payloads() {
        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        dash.refresh_panels();
        dash.remove_panel("tokens");

        let export = dash.export_layout();
        assert!(export.panels.iter().all(|p| p.id != "tokens"));
        assert_eq!(export.panels.len(), 5);
        assert_eq!(export.theme, "monokai");

        // Payload data never appears in the serialized form
        let json = serde_json::to_string(&export).unwrap();
        assert!(!json.contains("$10.00"));
        assert!(!json.contains("sparkline"));
    }

    #[test]
    fn test_write_export_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");

        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        dash.write_export(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: LayoutExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.refresh_rate, 5);
        assert_eq!(back.panels.len(), 6);
        assert_eq!(back.panels[0].kind, "metric");
    }

    #[test]
    fn test_export_failure_sets_status_only() {
        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        dash.pending_export = Some(PathBuf::from("/nonexistent/dir/layout.json"));
        dash.flush_pending_export();
        assert!(dash.status_message().unwrap().starts_with("Export failed"));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut dash = dashboard();
        dash.running = true;
        dash.stop_live();
        assert!(!dash.running);
        dash.stop_live();
        assert!(!dash.running);
    }

    #[test]
    fn test_remove_panel_frees_slot_only() {
        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        assert!(dash.remove_panel("trend"));
        assert_eq!(dash.grid().slot_of("trend"), None);
        assert_eq!(dash.grid().slot_of("context"), Some(4));
        assert!(!dash.remove_panel("trend"));
    }

    /// Backend whose draw always fails, as when the terminal goes away
    /// underneath the process.
    struct FailingBackend;

    impl Backend for FailingBackend {
        fn draw<'a, I>(&mut self, _content: I) -> std::io::Result<()>
        where
            I: Iterator<Item = (u16, u16, &'a ratatui::buffer::Cell)>,
        {
            Err(std::io::Error::other("backend down"))
        }

        fn hide_cursor(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn show_cursor(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn get_cursor_position(&mut self) -> std::io::Result<ratatui::layout::Position> {
            Ok(ratatui::layout::Position::new(0, 0))
        }

        fn set_cursor_position<P: Into<ratatui::layout::Position>>(
            &mut self,
            _position: P,
        ) -> std::io::Result<()> {
            Ok(())
        }

        fn clear(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn size(&self) -> std::io::Result<ratatui::layout::Size> {
            Ok(ratatui::layout::Size::new(80, 30))
        }

        fn window_size(&mut self) -> std::io::Result<ratatui::backend::WindowSize> {
            Ok(ratatui::backend::WindowSize {
                columns_rows: ratatui::layout::Size::new(80, 30),
                pixels: ratatui::layout::Size::new(0, 0),
            })
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_draw_error_does_not_stop_rendering() {
        let mut dash = dashboard();
        dash.initialize(&DashboardConfig::default());
        dash.refresh_panels();

        let mut terminal = Terminal::new(FailingBackend).unwrap();
        // Repeated failures are swallowed; each tick retries
        dash.render_frame(&mut terminal);
        dash.render_frame(&mut terminal);
    }

    #[test]
    fn test_stats_report_summary() {
        let mut dash = dashboard();
        let metrics = dash.source.fetch();
        let report = stats_report(&metrics);

        assert!(report.starts_with("Usage Statistics\n"));
        assert!(report.contains("Total Cost: $10.00"));
        assert!(report.contains("Total Tokens: 50,000"));
        assert!(report.contains("Burn Rate: $"));
        assert!(report.contains("Model Distribution:"));
        assert!(report.contains("  opus: 100.0%"));
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(0.0), "0");
        assert_eq!(format_tokens(999.0), "999");
        assert_eq!(format_tokens(1_000.0), "1,000");
        assert_eq!(format_tokens(1_234_567.0), "1,234,567");
    }
}
