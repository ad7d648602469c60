//! Panel rendering: pure dispatch from panel type to a drawable widget.
//!
//! [`render`] is total: malformed payloads and unknown panel types degrade
//! to placeholders, never to an error or panic.

use ratatui::{
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use crate::panel::{Panel, PanelData, PanelKind, StatusKind};
use crate::ui::theme::Theme;

/// Intensity ramp for sparklines, blank to full block (9 levels).
const SPARK_CHARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Intensity ramp for heatmap cells (5 levels).
const HEAT_CHARS: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Character used when every sparkline value is identical.
const FLAT_CHAR: char = '─';

/// Width of the gauge bar in characters.
const GAUGE_WIDTH: usize = 20;

/// Maximum list items shown; the rest are dropped.
const LIST_LIMIT: usize = 5;

/// Render a panel into a themed, self-contained widget.
pub fn render(panel: &Panel, theme: &Theme) -> Paragraph<'static> {
    let body = match (&panel.kind, &panel.data) {
        (PanelKind::Metric, PanelData::Metric { value, trend, sparkline: points }) => {
            metric_body(value, *trend, points, theme)
        }
        (PanelKind::Chart, PanelData::Chart { values }) => chart_body(values, theme),
        (PanelKind::List, PanelData::List { items }) => list_body(items),
        (PanelKind::Heatmap, PanelData::Heatmap { matrix }) => heatmap_body(matrix, theme),
        (PanelKind::Gauge, PanelData::Gauge { value, max }) => gauge_body(*value, *max, theme),
        (PanelKind::Status, PanelData::Status { status, message }) => {
            status_body(*status, message, theme)
        }
        (PanelKind::Other(name), _) => placeholder(
            format!("Panel type '{}' not implemented", name),
            theme,
        ),
        // Payload does not match the panel's declared type
        (_, PanelData::Empty) => placeholder("No data available".to_string(), theme),
        (kind, _) => placeholder(
            format!("No {} data available", kind.label()),
            theme,
        ),
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", panel.title), theme.title))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    Paragraph::new(body).block(block)
}

fn placeholder(message: String, theme: &Theme) -> Text<'static> {
    Text::from(Line::from(Span::styled(message, theme.dim)))
}

fn metric_body(value: &str, trend: f64, points: &[f64], theme: &Theme) -> Text<'static> {
    let mut spans = vec![Span::styled(value.to_string(), theme.metric_value)];
    if trend > 0.0 {
        spans.push(Span::styled(format!(" ↑{:.1}%", trend), theme.trend_up));
    } else if trend < 0.0 {
        spans.push(Span::styled(format!(" ↓{:.1}%", trend.abs()), theme.trend_down));
    }

    let mut lines = vec![Line::from(spans)];
    if !points.is_empty() {
        lines.push(Line::from(Span::styled(
            sparkline(points),
            Style::default().fg(theme.accent),
        )));
    }
    Text::from(lines)
}

fn chart_body(values: &[f64], theme: &Theme) -> Text<'static> {
    if values.is_empty() {
        return placeholder("No data available".to_string(), theme);
    }
    Text::from(Line::from(Span::styled(
        sparkline(values),
        Style::default().fg(theme.accent),
    )))
}

fn list_body(items: &[String]) -> Text<'static> {
    let lines: Vec<Line> = items
        .iter()
        .take(LIST_LIMIT)
        .map(|item| Line::from(format!("• {}", item)))
        .collect();
    Text::from(lines)
}

fn heatmap_body(matrix: &[Vec<f64>], theme: &Theme) -> Text<'static> {
    if matrix.is_empty() {
        return placeholder("No data".to_string(), theme);
    }
    let lines: Vec<Line> = matrix
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|&v| {
                    let level = ((v * 4.0) as isize).clamp(0, 4) as usize;
                    HEAT_CHARS[level]
                })
                .collect();
            Line::from(Span::styled(cells, Style::default().fg(theme.accent)))
        })
        .collect();
    Text::from(lines)
}

fn gauge_body(value: f64, max: f64, theme: &Theme) -> Text<'static> {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * GAUGE_WIDTH as f64).round() as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(GAUGE_WIDTH - filled.min(GAUGE_WIDTH));

    Text::from(Line::from(vec![
        Span::styled(bar, Style::default().fg(theme.accent)),
        Span::raw(format!(" {:>3.0}%", ratio * 100.0)),
    ]))
}

fn status_body(status: StatusKind, message: &str, theme: &Theme) -> Text<'static> {
    let style = theme.status_style(status);
    let mut lines = vec![Line::from(vec![
        Span::styled("● ", style),
        Span::styled(status.label(), style),
    ])];
    if !message.is_empty() {
        lines.push(Line::from(Span::styled(message.to_string(), theme.dim)));
    }
    Text::from(lines)
}

/// Render a numeric series as a one-line sparkline.
///
/// Each value buckets linearly into one of 9 intensity levels using
/// (value − min) / (max − min). When every value is identical the result
/// is a flat line of the same length.
pub fn sparkline(values: &[f64]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return FLAT_CHAR.to_string().repeat(values.len());
    }

    values
        .iter()
        .map(|&v| {
            let level = ((v - min) / (max - min) * 8.0) as usize;
            SPARK_CHARS[level.min(8)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::{Theme, ThemeName};

    fn theme() -> Theme {
        Theme::of(ThemeName::Monokai)
    }

    fn panel_with(kind: PanelKind, data: PanelData) -> Panel {
        let mut panel = Panel::new("p", "Panel", kind);
        panel.data = data;
        panel
    }

    #[test]
    fn test_sparkline_flat_when_min_equals_max() {
        assert_eq!(sparkline(&[5.0, 5.0, 5.0]), "───");
    }

    #[test]
    fn test_sparkline_buckets_extremes() {
        let line = sparkline(&[0.0, 8.0]);
        let chars: Vec<char> = line.chars().collect();
        assert_eq!(chars[0], SPARK_CHARS[0]);
        assert_eq!(chars[1], SPARK_CHARS[8]);
    }

    #[test]
    fn test_sparkline_empty() {
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_render_each_kind() {
        let theme = theme();
        let cases = vec![
            panel_with(
                PanelKind::Metric,
                PanelData::Metric {
                    value: "$42.50".to_string(),
                    trend: 2.5,
                    sparkline: vec![1.0, 2.0],
                },
            ),
            panel_with(PanelKind::Chart, PanelData::Chart { values: vec![1.0, 3.0, 2.0] }),
            panel_with(
                PanelKind::List,
                PanelData::List {
                    items: (0..9).map(|i| format!("item {}", i)).collect(),
                },
            ),
            panel_with(
                PanelKind::Heatmap,
                PanelData::Heatmap {
                    matrix: vec![vec![0.0, 0.5], vec![1.0, 0.25]],
                },
            ),
            panel_with(PanelKind::Gauge, PanelData::Gauge { value: 30.0, max: 100.0 }),
            panel_with(
                PanelKind::Status,
                PanelData::Status {
                    status: StatusKind::Online,
                    message: "all good".to_string(),
                },
            ),
        ];
        for panel in &cases {
            // Total function: must produce a widget for every kind
            let _ = render(panel, &theme);
        }
    }

    #[test]
    fn test_unknown_kind_renders_placeholder() {
        let panel = panel_with(
            PanelKind::Other("treemap".to_string()),
            PanelData::Raw(serde_json::json!({"x": 1})),
        );
        let _ = render(&panel, &theme());
    }

    #[test]
    fn test_mismatched_payload_renders_placeholder() {
        let panel = panel_with(PanelKind::Gauge, PanelData::List { items: vec![] });
        let _ = render(&panel, &theme());
        let panel = panel_with(PanelKind::Metric, PanelData::Empty);
        let _ = render(&panel, &theme());
    }

    #[test]
    fn test_gauge_clamps_and_handles_zero_max() {
        let theme = theme();
        let _ = render(
            &panel_with(PanelKind::Gauge, PanelData::Gauge { value: 500.0, max: 100.0 }),
            &theme,
        );
        let _ = render(
            &panel_with(PanelKind::Gauge, PanelData::Gauge { value: 5.0, max: 0.0 }),
            &theme,
        );
    }

    #[test]
    fn test_heatmap_levels() {
        // value*4 floored, clamped to [0, 4]
        let levels: Vec<usize> = [0.0, 0.2, 0.5, 0.9, 1.0, 7.0, -3.0]
            .iter()
            .map(|&v| ((v * 4.0) as isize).clamp(0, 4) as usize)
            .collect();
        assert_eq!(levels, vec![0, 0, 2, 3, 4, 4, 0]);
    }
}
