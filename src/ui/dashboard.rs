//! Live dashboard rendering.
//!
//! Header gauges on top, the node table by tier in the middle and the three
//! index rankings next to the suggestions at the bottom.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::common::{render_no_data, render_table, view_block};
use crate::analysis::dashboard::{dashboard, Dashboard, RankedIndex};
use crate::app::App;
use crate::data::format::{format_mb, format_rate};
use crate::data::MetricDelta;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let dash = dashboard(data, &app.settings);

    let [header, nodes, bottom] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(6),
        Constraint::Length(9),
    ])
    .areas(area);
    let [rankings, suggestions] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(bottom);

    render_header(frame, app, &dash, header);
    render_nodes(frame, app, &dash, nodes);
    render_rankings(frame, app, &dash, rankings);
    render_suggestions(frame, app, &dash, suggestions);
}

fn render_header(frame: &mut Frame, app: &App, dash: &Dashboard, area: Rect) {
    let h = &dash.header;
    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{}  ", h.cluster_name)),
            Span::styled(h.status.to_uppercase(), app.theme.status_style(h.health)),
            Span::raw(format!(
                "   heap {:.1}%   pending tasks {}",
                h.heap_total_percent, h.pending_tasks
            )),
        ]),
        Line::from(vec![
            Span::raw(format!(
                "shards: {} initializing, {} relocating, ",
                h.initializing_shards, h.relocating_shards
            )),
            Span::styled(
                format!("{} unassigned", h.unassigned_shards),
                if h.unassigned_shards > 0 {
                    Style::default().fg(app.theme.warning)
                } else {
                    Style::default()
                },
            ),
            Span::styled(
                format!("   updated {}", h.updated_at.format("%H:%M:%S UTC")),
                app.theme.muted,
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(view_block(app, "Cluster")), area);
}

fn delta_cell(app: &App, delta: &MetricDelta, precision: usize) -> Cell<'static> {
    Cell::from(delta.display(precision)).style(app.theme.delta_style(delta))
}

fn render_nodes(frame: &mut Frame, app: &App, dash: &Dashboard, area: Rect) {
    let rows: Vec<Row> = dash
        .nodes
        .iter()
        .map(|n| {
            Row::new(vec![
                Cell::from(n.tier.clone()),
                Cell::from(n.name.clone()),
                delta_cell(app, &n.cpu, 0),
                delta_cell(app, &n.heap, 0),
                delta_cell(app, &n.old_gen, 1),
                delta_cell(app, &n.gc_count, 0),
                delta_cell(app, &n.gc_time_ms, 0),
                delta_cell(app, &n.rejections, 0),
                Cell::from(n.status.symbol()).style(app.theme.status_style(n.status)),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!("Nodes ({})", dash.nodes.len()),
        ["Tier", "Node", "CPU%", "Heap%", "Old Gen%", "Old GCs", "GC ms", "Rejected", "Status"],
        rows,
        [
            Constraint::Length(9),
            Constraint::Fill(2),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(6),
        ],
    );
}

fn ranking_lines(title: &str, rows: &[RankedIndex], has_rates: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::raw(title.to_string()))];
    if !has_rates {
        lines.push(Line::from("  (waiting for a second sample)"));
        return lines;
    }
    lines.extend(
        rows.iter()
            .map(|r| Line::from(format!("  {:<28} {:>10}", r.index, format_rate(r.value)))),
    );
    lines
}

fn render_rankings(frame: &mut Frame, app: &App, dash: &Dashboard, area: Rect) {
    let [writers, searchers, heap] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(ranking_lines("docs/s", &dash.top_writers, dash.has_rates))
            .block(view_block(app, "Top writers")),
        writers,
    );
    frame.render_widget(
        Paragraph::new(ranking_lines("queries/s", &dash.top_searchers, dash.has_rates))
            .block(view_block(app, "Top searchers")),
        searchers,
    );

    let rows: Vec<Row> = dash
        .top_heap
        .iter()
        .map(|h| {
            Row::new(vec![
                h.index.clone(),
                format_mb(h.total_mb),
                format_mb(h.segments_mb),
                format_mb(h.query_cache_mb),
                format_mb(h.fielddata_mb),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
    )
    .header(Row::new(["Index", "Heap", "Segs", "QCache", "FData"]).style(app.theme.header))
    .block(view_block(app, "Top heap"));
    frame.render_widget(table, heap);
}

fn render_suggestions(frame: &mut Frame, app: &App, dash: &Dashboard, area: Rect) {
    let lines: Vec<Line> = if dash.suggestions.is_empty() {
        vec![Line::styled(
            "✅ All clear! No critical issues detected.",
            Style::default().fg(app.theme.healthy),
        )]
    } else {
        dash.suggestions
            .iter()
            .map(|s| Line::styled(s.to_string(), app.theme.status_style(s.severity)))
            .collect()
    };
    frame.render_widget(
        Paragraph::new(lines)
            .block(view_block(app, "Suggestions"))
            .wrap(Wrap { trim: true }),
        area,
    );
}
