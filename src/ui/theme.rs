//! Theme configuration for the dashboard.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;
use serde::{Deserialize, Serialize};

use crate::panel::StatusKind;

/// The closed set of selectable themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Monokai,
    Dracula,
    Nord,
}

impl ThemeName {
    /// Cycle to the next theme.
    pub fn next(self) -> Self {
        match self {
            ThemeName::Monokai => ThemeName::Dracula,
            ThemeName::Dracula => ThemeName::Nord,
            ThemeName::Nord => ThemeName::Monokai,
        }
    }

    /// Display label for this theme.
    pub fn label(&self) -> &'static str {
        match self {
            ThemeName::Monokai => "monokai",
            ThemeName::Dracula => "dracula",
            ThemeName::Nord => "nord",
        }
    }
}

/// Color and style table for the dashboard.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub accent: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for panel titles.
    pub title: Style,
    /// Style for metric values.
    pub metric_value: Style,
    /// Style for upward trends.
    pub trend_up: Style,
    /// Style for downward trends.
    pub trend_down: Style,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub info: Color,
    /// Style for secondary/dim text.
    pub dim: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Look up the style table for a named theme.
    pub fn of(name: ThemeName) -> Self {
        match name {
            ThemeName::Monokai => Self::monokai(),
            ThemeName::Dracula => Self::dracula(),
            ThemeName::Nord => Self::nord(),
        }
    }

    fn monokai() -> Self {
        Self {
            accent: Color::Rgb(0xA6, 0xE2, 0x2E),
            border: Color::DarkGray,
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            metric_value: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            trend_up: Style::default().fg(Color::Green),
            trend_down: Style::default().fg(Color::Red),
            warning: Color::Rgb(0xF9, 0x26, 0x72),
            error: Color::Rgb(0xF9, 0x26, 0x72),
            success: Color::Rgb(0xA6, 0xE2, 0x2E),
            info: Color::Rgb(0x66, 0xD9, 0xEF),
            dim: Style::default().add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    fn dracula() -> Self {
        Self {
            accent: Color::Rgb(0x8B, 0xE9, 0xFD),
            border: Color::Magenta,
            title: Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
            metric_value: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            trend_up: Style::default().fg(Color::LightGreen),
            trend_down: Style::default().fg(Color::LightRed),
            warning: Color::Rgb(0xFF, 0xB8, 0x6C),
            error: Color::Rgb(0xFF, 0x55, 0x55),
            success: Color::Rgb(0x50, 0xFA, 0x7B),
            info: Color::Rgb(0xBD, 0x93, 0xF9),
            dim: Style::default().add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    fn nord() -> Self {
        Self {
            accent: Color::Rgb(0x88, 0xC0, 0xD0),
            border: Color::Blue,
            title: Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
            metric_value: Style::default().fg(Color::Cyan),
            trend_up: Style::default().fg(Color::Green),
            trend_down: Style::default().fg(Color::Red),
            warning: Color::Rgb(0xD0, 0x87, 0x70),
            error: Color::Rgb(0xBF, 0x61, 0x6A),
            success: Color::Rgb(0xA3, 0xBE, 0x8C),
            info: Color::Rgb(0x5E, 0x81, 0xAC),
            dim: Style::default().add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    /// Style for a status indicator.
    pub fn status_style(&self, status: StatusKind) -> Style {
        match status {
            StatusKind::Online => Style::default().fg(self.success),
            StatusKind::Offline => Style::default().fg(self.error),
            StatusKind::Warning => Style::default().fg(self.warning),
            StatusKind::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
            StatusKind::Unknown => self.dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle_covers_all() {
        let start = ThemeName::Monokai;
        let mut seen = vec![start];
        let mut current = start.next();
        while current != start {
            seen.push(current);
            current = current.next();
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_theme_name_serde() {
        let name: ThemeName = serde_json::from_str("\"dracula\"").unwrap();
        assert_eq!(name, ThemeName::Dracula);
        assert_eq!(name.label(), "dracula");
    }
}
