//! Dashboard configuration: file loading and default panel set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::panel::{Panel, PanelKind};
use crate::ui::theme::ThemeName;

/// Refresh-rate bounds in seconds.
pub const MIN_REFRESH_RATE: u64 = 1;
pub const MAX_REFRESH_RATE: u64 = 60;

/// Clamp a refresh rate to the supported range.
pub fn clamp_refresh_rate(rate: u64) -> u64 {
    rate.clamp(MIN_REFRESH_RATE, MAX_REFRESH_RATE)
}

/// Declarative description of one panel, as found in config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PanelKind,
    #[serde(default)]
    pub position: (u16, u16),
    #[serde(default = "default_span")]
    pub size: (u16, u16),
    #[serde(default = "default_panel_refresh")]
    pub refresh_rate: u64,
}

fn default_span() -> (u16, u16) {
    (1, 1)
}

fn default_panel_refresh() -> u64 {
    5
}

impl From<&PanelSpec> for Panel {
    fn from(spec: &PanelSpec) -> Self {
        let mut panel = Panel::new(&spec.id, &spec.title, spec.kind.clone());
        panel.position = spec.position;
        panel.size = spec.size;
        panel.refresh_rate = spec.refresh_rate;
        panel
    }
}

/// Top-level dashboard configuration.
///
/// Loaded from a JSON or YAML file; every field has a default so a partial
/// file (or none at all) is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub theme: ThemeName,
    /// Seconds between data refreshes; clamped to [1, 60] on use.
    pub refresh_rate: u64,
    /// Drop the header row to fit small terminals.
    pub compact_mode: bool,
    /// Provider argv, e.g. ["ccusage", "--json"].
    pub command: Vec<String>,
    /// Where a requested layout export is written.
    pub export_path: PathBuf,
    pub default_panels: Vec<PanelSpec>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Monokai,
            refresh_rate: 5,
            compact_mode: false,
            command: vec!["ccusage".to_string(), "--json".to_string()],
            export_path: PathBuf::from("spendwatch_layout.json"),
            default_panels: default_panels(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a file, JSON or YAML by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid config {}", path.display()))
    }
}

/// The stock panel set: one panel per grid slot.
fn default_panels() -> Vec<PanelSpec> {
    let spec = |id: &str, title: &str, kind: PanelKind, row: u16, col: u16| PanelSpec {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        position: (row, col),
        size: (1, 1),
        refresh_rate: 5,
    };

    vec![
        spec("cost", "Total Cost", PanelKind::Metric, 0, 0),
        spec("tokens", "Total Tokens", PanelKind::Metric, 0, 1),
        spec("burn_rate", "Burn Rate", PanelKind::Metric, 1, 0),
        spec("trend", "Cost Trend", PanelKind::Chart, 1, 1),
        spec("context", "Context Window", PanelKind::Gauge, 2, 0),
        spec("models", "Model Usage", PanelKind::List, 2, 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clamp_refresh_rate() {
        assert_eq!(clamp_refresh_rate(0), 1);
        assert_eq!(clamp_refresh_rate(100), 60);
        assert_eq!(clamp_refresh_rate(10), 10);
    }

    #[test]
    fn test_defaults_fill_all_slots() {
        let config = DashboardConfig::default();
        assert_eq!(config.default_panels.len(), crate::layout::SLOT_COUNT);
        assert_eq!(config.refresh_rate, 5);
        assert_eq!(config.theme, ThemeName::Monokai);
        assert!(!config.compact_mode);
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "theme": "nord",
                "refresh_rate": 10,
                "compact_mode": true,
                "default_panels": [
                    {{"id": "cost", "title": "Cost", "type": "metric"}}
                ]
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.theme, ThemeName::Nord);
        assert_eq!(config.refresh_rate, 10);
        assert!(config.compact_mode);
        assert_eq!(config.default_panels.len(), 1);
        assert_eq!(config.default_panels[0].kind, PanelKind::Metric);
        // Omitted fields keep their defaults
        assert_eq!(config.command, vec!["ccusage", "--json"]);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "theme: dracula\nrefresh_rate: 3\ndefault_panels:\n  - id: gauge1\n    title: Gauge\n    type: gauge"
        )
        .unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.theme, ThemeName::Dracula);
        assert_eq!(config.refresh_rate, 3);
        assert_eq!(config.default_panels[0].kind, PanelKind::Gauge);
        assert_eq!(config.default_panels[0].size, (1, 1));
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(DashboardConfig::load(Path::new("/nonexistent/spendwatch.yaml")).is_err());
    }

    #[test]
    fn test_panel_spec_to_panel() {
        let spec = PanelSpec {
            id: "x".to_string(),
            title: "X".to_string(),
            kind: PanelKind::Status,
            position: (2, 1),
            size: (1, 2),
            refresh_rate: 7,
        };
        let panel = Panel::from(&spec);
        assert_eq!(panel.id, "x");
        assert_eq!(panel.position, (2, 1));
        assert_eq!(panel.refresh_rate, 7);
    }
}
