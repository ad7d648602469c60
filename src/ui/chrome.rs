//! Dashboard chrome: header bar, panel grid, footer, and help overlay.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::Dashboard;
use crate::layout::slot_rects;
use crate::ui::render;

/// Draw the full dashboard frame.
pub fn draw(frame: &mut Frame, dash: &Dashboard) {
    let area = frame.area();

    let chunks = if dash.compact {
        Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).split(area)
    } else {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area)
    };

    let (main, footer) = if dash.compact {
        (chunks[0], chunks[1])
    } else {
        draw_header(frame, dash, chunks[0]);
        (chunks[1], chunks[2])
    };

    draw_panels(frame, dash, main);
    draw_footer(frame, dash, footer);

    if dash.help_visible() {
        draw_help(frame, dash, area);
    }
}

/// Header: title, theme, refresh rate, pause and data-source state.
fn draw_header(frame: &mut Frame, dash: &Dashboard, area: Rect) {
    let mut spans = vec![
        Span::styled(" SPENDWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(dash.theme_name.label(), Style::default().fg(dash.theme.accent)),
        Span::raw(format!(" │ every {}s │ ", dash.refresh_rate())),
        Span::raw(dash.source().description().to_string()),
    ];

    if dash.source().is_synthetic() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "synthetic data",
            Style::default().fg(dash.theme.warning),
        ));
    }
    if dash.paused {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "PAUSED",
            Style::default().fg(dash.theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render every occupied slot of the grid.
fn draw_panels(frame: &mut Frame, dash: &Dashboard, area: Rect) {
    let rects = slot_rects(area);
    for (slot, rect) in rects.iter().enumerate() {
        let Some(id) = dash.grid().occupant(slot) else {
            continue;
        };
        let Some(panel) = dash.panels().get(id) else {
            continue;
        };
        frame.render_widget(render::render(panel, &dash.theme), *rect);
    }
}

/// Footer: transient status message, else update age and key hints.
fn draw_footer(frame: &mut Frame, dash: &Dashboard, area: Rect) {
    if let Some(msg) = dash.status_message() {
        let paragraph = Paragraph::new(format!(" {} ", msg))
            .style(Style::default().fg(dash.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    let age = match dash.last_update {
        Some(at) => format!("updated {:.1}s ago", at.elapsed().as_secs_f64()),
        None => "loading...".to_string(),
    };
    let line = format!(
        " {} | q:quit r:refresh p:pause t:theme +/-:rate e:export ?:help",
        age
    );
    frame.render_widget(Paragraph::new(line).style(dash.theme.dim), area);
}

/// Centered help overlay listing the keyboard shortcuts.
fn draw_help(frame: &mut Frame, dash: &Dashboard, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", dash.theme.title)),
        Line::from(""),
        Line::from(Span::styled(" General", bold)),
        Line::from("  q         Quit"),
        Line::from("  r         Refresh data now"),
        Line::from("  p / space Pause or resume auto-refresh"),
        Line::from("  c         Clear and redraw"),
        Line::from(""),
        Line::from(Span::styled(" Display", bold)),
        Line::from("  t         Cycle theme"),
        Line::from("  +/=       Faster refresh (-1s)"),
        Line::from("  -/_       Slower refresh (+1s)"),
        Line::from(""),
        Line::from(Span::styled(" Data", bold)),
        Line::from("  e         Export layout to JSON"),
        Line::from(""),
        Line::from(Span::styled("Closes automatically", dash.theme.dim)),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(dash.theme.border_type)
        .border_style(Style::default().fg(dash.theme.accent));

    let width = 40u16.min(area.width.saturating_sub(4));
    let height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}
