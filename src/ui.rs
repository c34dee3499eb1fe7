//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from console state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a key list on the left, the last delivery on the right
//!   and a one-line status bar at the bottom.
//! * Colours and styles are defined inline.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    let [keys_area, delivery_area] =
        Layout::horizontal([Constraint::Length(28), Constraint::Min(1)]).areas(main_area);

    draw_key_list(app, frame, keys_area);
    draw_delivery(app, frame, delivery_area);
    draw_status_bar(app, frame, status_area);
}

/// Render the tracked keys with their pending counts.
fn draw_key_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .keys
        .iter()
        .map(|(key, count)| {
            let count_style = if *count > 0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{key:<18}"), Style::default().fg(Color::White)),
                Span::styled(format!("{count:>3}"), count_style),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Keys ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the reply text of the last drain.
fn draw_delivery(app: &App, frame: &mut Frame, area: Rect) {
    let body = if app.delivery.is_empty() {
        Line::styled(
            "Press Enter to drain the selected key, a to drain all.",
            Style::default().fg(Color::DarkGray),
        )
        .into()
    } else {
        Text::raw(app.delivery.as_str())
    };

    let paragraph = Paragraph::new(body)
        .block(Block::default().title(" Delivered ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let refreshed = app
        .last_refresh
        .map(|d| d.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());
    let (loop_label, loop_color) = if app.refreshing {
        ("live", Color::Green)
    } else {
        ("stopped", Color::Red)
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} pending", app.total_pending()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("refreshed {refreshed}"),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(loop_label, Style::default().fg(loop_color)),
        Span::raw("  q: quit  ↑/↓: move  Enter: drain  a: drain all"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
