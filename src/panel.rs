//! Panel entity and per-type data contracts.

use serde::{Deserialize, Serialize};

/// The closed set of panel types, with a fallback for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Metric,
    Chart,
    List,
    Heatmap,
    Gauge,
    Status,
    /// Unrecognized type; rendered as a placeholder, never an error.
    #[serde(untagged)]
    Other(String),
}

impl PanelKind {
    /// Display label for the kind.
    pub fn label(&self) -> &str {
        match self {
            PanelKind::Metric => "metric",
            PanelKind::Chart => "chart",
            PanelKind::List => "list",
            PanelKind::Heatmap => "heatmap",
            PanelKind::Gauge => "gauge",
            PanelKind::Status => "status",
            PanelKind::Other(name) => name,
        }
    }
}

/// Closed status vocabulary for status panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Online,
    Offline,
    Warning,
    Error,
    #[default]
    Unknown,
}

impl StatusKind {
    /// Uppercase display label.
    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Online => "ONLINE",
            StatusKind::Offline => "OFFLINE",
            StatusKind::Warning => "WARNING",
            StatusKind::Error => "ERROR",
            StatusKind::Unknown => "UNKNOWN",
        }
    }
}

/// Typed panel payload, one schema per panel kind.
///
/// A payload that does not match its panel's kind renders as a placeholder;
/// the renderer never fails on a mismatch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelData {
    Metric {
        value: String,
        /// Percent change shown as a trend arrow.
        #[serde(default)]
        trend: f64,
        #[serde(default)]
        sparkline: Vec<f64>,
    },
    Chart {
        values: Vec<f64>,
    },
    List {
        items: Vec<String>,
    },
    Heatmap {
        matrix: Vec<Vec<f64>>,
    },
    Gauge {
        value: f64,
        max: f64,
    },
    Status {
        status: StatusKind,
        #[serde(default)]
        message: String,
    },
    /// Untyped payload carried through for unknown panel kinds.
    Raw(serde_json::Value),
    #[default]
    Empty,
}

/// A named, typed visual unit in the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    /// Unique, stable key.
    pub id: String,
    pub title: String,
    pub kind: PanelKind,
    /// (row, col) position hint.
    pub position: (u16, u16),
    /// (rows, cols) span hint.
    pub size: (u16, u16),
    /// Informational per-panel refresh rate in seconds.
    pub refresh_rate: u64,
    #[serde(default)]
    pub data: PanelData,
}

impl Panel {
    /// Create a panel with an empty payload.
    pub fn new(id: &str, title: &str, kind: PanelKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            position: (0, 0),
            size: (1, 1),
            refresh_rate: 5,
            data: PanelData::Empty,
        }
    }
}

/// Insertion-ordered panel registry.
///
/// Ids are unique; adding a panel with an existing id replaces it in place
/// (last-write-wins) without changing insertion order.
#[derive(Debug, Clone, Default)]
pub struct PanelRegistry {
    panels: Vec<Panel>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a panel, returning its id.
    pub fn add(&mut self, panel: Panel) -> String {
        let id = panel.id.clone();
        if let Some(existing) = self.panels.iter_mut().find(|p| p.id == panel.id) {
            *existing = panel;
        } else {
            self.panels.push(panel);
        }
        id
    }

    /// Replace a panel's payload. Returns false when the id is unknown.
    pub fn update_data(&mut self, id: &str, data: PanelData) -> bool {
        match self.panels.iter_mut().find(|p| p.id == id) {
            Some(panel) => {
                panel.data = data;
                true
            }
            None => false,
        }
    }

    /// Remove a panel by id. Returns true when a panel was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.panels.len();
        self.panels.retain(|p| p.id != id);
        self.panels.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    /// Panels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
