//! Shard-centric views: distribution, imbalance and dusty shards.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Cell, Row},
    Frame,
};

use super::common::{render_lines, render_message, render_no_data, render_table};
use crate::analysis::distribution::TOP_GROUPS;
use crate::analysis::dusty::DUSTY_DISPLAY_LIMIT;
use crate::analysis::{distribution, dusty_shards, imbalance};
use crate::app::App;
use crate::data::format::{format_mb, format_rate};
use crate::data::{HealthStatus, ShardRow};

pub fn render_distribution(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let groups = distribution(&data.shards, app.group_by, app.sort_key);
    let total = groups.len();

    let rows: Vec<Row> = groups
        .into_iter()
        .take(TOP_GROUPS)
        .map(|g| {
            Row::new(vec![
                g.key,
                g.total_shards.to_string(),
                g.primaries.to_string(),
                g.replicas.to_string(),
                format!("{:.2}", g.total_gb),
                g.nodes_involved.to_string(),
            ])
        })
        .collect();

    let title = format!(
        "Shard Distribution by {} [g] sorted by {} [s] (top {} of {})",
        app.group_by.label(),
        app.sort_key.label(),
        rows.len(),
        total
    );
    render_table(
        frame,
        app,
        area,
        title,
        [app.group_by.label(), "Shards", "Primaries", "Replicas", "Size (GB)", "Nodes"],
        rows,
        [
            Constraint::Fill(3),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(6),
        ],
    );
}

pub fn render_imbalance(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let patterns = imbalance(data);
    let title = "Shard Imbalance";
    if patterns.is_empty() {
        let note = Line::styled(
            "✅ No significant primary shard imbalance detected.",
            Style::default().fg(app.theme.healthy),
        );
        render_message(frame, app, area, title, note);
        return;
    }

    let mut lines = vec![Line::from(format!(
        "{} index pattern(s) with unevenly spread primaries",
        patterns.len()
    ))];
    for p in &patterns {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!(
                "{}  std-dev {:.2}  write {}  search {}",
                p.pattern,
                p.std_dev,
                format_rate(p.write_rate),
                format_rate(p.search_rate)
            ),
            app.theme.header,
        ));
        for n in &p.nodes {
            let style = if n.hotspot {
                app.theme.status_style(HealthStatus::Warning)
            } else {
                Style::default()
            };
            let marker = if n.hotspot { "  ← hotspot" } else { "" };
            lines.push(Line::styled(
                format!("  {:<30} {:>4} primaries{}", n.node, n.count, marker),
                style,
            ));
        }
    }
    render_lines(frame, app, area, title, lines);
}

fn shard_rows(shards: &[ShardRow]) -> Vec<Row<'static>> {
    shards
        .iter()
        .take(DUSTY_DISPLAY_LIMIT)
        .map(|s| {
            Row::new(vec![
                Cell::from(s.index.clone()),
                Cell::from(s.shard.to_string()),
                Cell::from(if s.primary { "p" } else { "r" }),
                Cell::from(s.docs.to_string()),
                Cell::from(format_mb(s.store_mb)),
                Cell::from(s.node.clone().unwrap_or_default()),
            ])
        })
        .collect()
}

const SHARD_WIDTHS: [Constraint; 6] = [
    Constraint::Fill(3),
    Constraint::Length(6),
    Constraint::Length(4),
    Constraint::Length(10),
    Constraint::Length(10),
    Constraint::Fill(1),
];

pub fn render_dusty(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let report = dusty_shards(&data.shards, app.settings.thresholds.dusty_shard_mb);
    if report.is_clean() {
        let note = Line::styled(
            "✅ No empty shards and no shard dust.",
            Style::default().fg(app.theme.healthy),
        );
        render_message(frame, app, area, "Dusty Shards", note);
        return;
    }

    let [empty, dusty] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
    let header = ["Index", "Shard", "P/R", "Docs", "Store", "Node"];

    render_table(
        frame,
        app,
        empty,
        format!("Empty shards ({} total)", report.empty.len()),
        header,
        shard_rows(&report.empty),
        SHARD_WIDTHS,
    );
    render_table(
        frame,
        app,
        dusty,
        format!(
            "Dusty shards below {} ({} total, {})",
            format_mb(report.threshold_mb),
            report.dusty.len(),
            format_mb(report.dusty_store_mb())
        ),
        header,
        shard_rows(&report.dusty),
        SHARD_WIDTHS,
    );
}
