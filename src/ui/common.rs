//! Common UI components shared across views.
//!
//! This module contains the header bar, status bar, help overlay and the
//! small building blocks every view uses (framed blocks, scrollable tables,
//! "no data" notes).

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::HealthStatus;

/// Render the header bar with the cluster overview.
///
/// Displays: cluster name, status, node count, heap and the data source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" ES DOCTOR ", Style::default().add_modifier(Modifier::BOLD));

    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            title,
            Span::raw(format!("| {} | ", app.source_description())),
            Span::styled("no data yet", app.theme.muted),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let line = Line::from(vec![
        title,
        Span::raw("| "),
        Span::styled("●", app.theme.es_status_style(&data.status)),
        Span::raw(format!(" {} ", data.cluster_name)),
        Span::styled(data.status.to_uppercase(), app.theme.es_status_style(&data.status)),
        Span::raw(format!(
            " | {} nodes | heap {:.1}% | {} ",
            data.nodes.len(),
            data.heap_total_percent,
            app.source_description()
        )),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: breadcrumb trail, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Menu => "↑↓:select Enter/1-12:open ?:help q:quit",
        View::Distribution => "g:group s:sort ↑↓:scroll r:refresh Esc:back ?:help q:quit",
        _ => "↑↓:scroll r:refresh Esc:back ?:help q:quit",
    };

    let freshness = match (&app.load_error, app.last_refresh) {
        (Some(err), _) => format!("Error: {}", err),
        (None, Some(at)) => format!("Updated {:.1}s ago", at.elapsed().as_secs_f64()),
        (None, None) => "Waiting for data".to_string(),
    };

    let style = if app.load_error.is_some() {
        Style::default().fg(app.theme.critical)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let status = format!(" {} | {} | {}", app.breadcrumb(), freshness, controls);
    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |name: &'static str| {
        Line::from(vec![Span::styled(name, Style::default().add_modifier(Modifier::BOLD))])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Select / scroll"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home        Back to top"),
        Line::from("  Enter 1-12  Open analysis"),
        Line::from("  Esc Bksp    Go back"),
        Line::from(""),
        section(" Shard Distribution"),
        Line::from("  g           Pattern / index grouping"),
        Line::from("  s           Cycle sort column"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh now"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered(area, 44, 21);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Framed block in the theme's style.
pub fn view_block(app: &App, title: impl Into<String>) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Placeholder for views without data: the last error, or a loading note.
pub fn render_no_data(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.load_error {
        Some(err) => Line::styled(
            format!("No data: {}", err),
            app.theme.status_style(HealthStatus::Critical),
        ),
        None => Line::styled("Loading...", app.theme.muted),
    };
    let block = view_block(app, app.current_view.label());
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// A single centered note inside a framed block, e.g. "no issues found".
pub fn render_message(frame: &mut Frame, app: &App, area: Rect, title: &str, message: Line) {
    let paragraph = Paragraph::new(vec![Line::from(""), message])
        .block(view_block(app, title))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Lines in a framed block, scrolled by `app.scroll`.
pub fn render_lines(frame: &mut Frame, app: &App, area: Rect, title: &str, lines: Vec<Line>) {
    let max_scroll = lines.len().saturating_sub(1);
    let scroll = app.scroll.min(max_scroll) as u16;
    let paragraph = Paragraph::new(lines)
        .block(view_block(app, title))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Table in a framed block, scrolled by `app.scroll`.
pub fn render_table<'a, const N: usize>(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: String,
    header: [&'a str; N],
    rows: Vec<Row<'a>>,
    widths: [Constraint; N],
) {
    let offset = app.scroll.min(rows.len().saturating_sub(1));
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(app.theme.header))
        .block(view_block(app, title));
    let mut state = TableState::default().with_offset(offset);
    frame.render_stateful_widget(table, area, &mut state);
}
