//! Node-centric views: deep dive, load correlation, causality and toxicity.

use std::fmt;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Row},
    Frame,
};

use super::common::{render_lines, render_message, render_no_data, render_table};
use crate::analysis::{causality_chains, deep_dive, node_load, shard_toxicity};
use crate::app::App;
use crate::data::format::{format_mb, format_rate, format_ratio, truncate};
use crate::data::HealthStatus;

/// `" (was x)"` suffix, empty without a previous reading.
fn previous<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| format!(" (was {})", v)).unwrap_or_default()
}

pub fn render_deep_dive(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let t = &app.theme;
    let mut lines: Vec<Line> = Vec::new();

    for node in deep_dive(data) {
        lines.push(Line::from(vec![
            Span::styled(node.name.clone(), t.header),
            Span::styled(
                format!("  CPU {:.0}%", node.cpu_percent),
                t.threshold_style(
                    node.cpu_percent,
                    app.settings.thresholds.cpu_percent * 0.8,
                    app.settings.thresholds.cpu_percent,
                ),
            ),
        ]));

        lines.push(Line::styled("  Thread pools", Style::default().add_modifier(Modifier::BOLD)));
        if node.thread_pools.is_empty() {
            lines.push(Line::styled("    all idle", t.muted));
        }
        for pool in &node.thread_pools {
            let style = if pool.rejected > 0 {
                t.status_style(HealthStatus::Critical)
            } else if pool.queue > 0 {
                t.status_style(HealthStatus::Warning)
            } else {
                Style::default()
            };
            let p = pool.previous.as_ref();
            lines.push(Line::styled(
                format!(
                    "    {:<22} active {}{}  queue {}{}  rejected {}{}  ratio {}",
                    pool.name,
                    pool.active,
                    previous(p.map(|p| p.active)),
                    pool.queue,
                    previous(p.map(|p| p.queue)),
                    pool.rejected,
                    previous(p.map(|p| p.rejected)),
                    format_ratio(pool.rejection_ratio()),
                ),
                style,
            ));
        }

        lines.push(Line::styled(
            "  Circuit breakers",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for breaker in &node.breakers {
            let style = if breaker.tripped > 0 {
                t.status_style(HealthStatus::Critical)
            } else if breaker.usage_ratio() > 0.8 {
                t.status_style(HealthStatus::Warning)
            } else {
                Style::default()
            };
            lines.push(Line::styled(
                format!(
                    "    {:<22} {} / {}{}  {}  tripped {}{}",
                    breaker.name,
                    format_mb(breaker.estimated_mb),
                    format_mb(breaker.limit_mb),
                    previous(breaker.previous_estimated_mb.map(format_mb)),
                    format_ratio(breaker.usage_ratio()),
                    breaker.tripped,
                    previous(breaker.previous_tripped),
                ),
                style,
            ));
        }
        lines.push(Line::from(""));
    }

    render_lines(frame, app, area, "Node Deep Dive (by CPU)", lines);
}

pub fn render_node_load(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let thresholds = &app.settings.thresholds;
    let loads = node_load(data);
    if loads.is_empty() {
        let note = Line::styled("No node load data.", app.theme.muted);
        render_message(frame, app, area, "Node Load Correlation", note);
        return;
    }

    let rows: Vec<Row> = loads
        .iter()
        .map(|l| {
            Row::new(vec![
                Cell::from(l.node.clone()),
                Cell::from(format!("{:.0}", l.cpu_percent)).style(app.theme.threshold_style(
                    l.cpu_percent,
                    thresholds.cpu_percent * 0.8,
                    thresholds.cpu_percent,
                )),
                Cell::from(format!("{:.0}", l.heap_percent)).style(app.theme.threshold_style(
                    l.heap_percent,
                    thresholds.heap_percent * 0.9,
                    thresholds.heap_percent,
                )),
                Cell::from(l.primaries.to_string()),
                Cell::from(l.total_shards.to_string()),
                Cell::from(format_rate(l.write_load)),
                Cell::from(format_rate(l.search_load)),
            ])
        })
        .collect();

    let title = if data.has_rates() {
        "Node Load Correlation".to_string()
    } else {
        "Node Load Correlation (rates after the next refresh)".to_string()
    };
    render_table(
        frame,
        app,
        area,
        title,
        ["Node", "CPU%", "Heap%", "Primaries", "Shards", "Write docs/s", "Search q/s"],
        rows,
        [
            Constraint::Fill(2),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
    );
}

pub fn render_causality(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let chains = causality_chains(data, &app.settings.thresholds);
    let title = "Causality Chains";
    if chains.is_empty() {
        let note = Line::styled(
            "✅ No nodes under critical old-gen memory pressure.",
            Style::default().fg(app.theme.healthy),
        );
        render_message(frame, app, area, title, note);
        return;
    }

    let mut lines = vec![
        Line::styled(
            format!("{} node(s) under memory pressure", chains.len()),
            app.theme.status_style(HealthStatus::Critical),
        ),
        Line::from(""),
    ];
    for chain in &chains {
        lines.push(Line::styled(chain.node.clone(), app.theme.header));
        lines.extend(chain.lines().into_iter().map(|l| Line::from(format!("  {}", l))));
        lines.push(Line::from(""));
    }
    render_lines(frame, app, area, title, lines);
}

pub fn render_toxicity(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let report = shard_toxicity(
        data,
        data.current.tasks.as_ref(),
        app.settings.thresholds.cpu_percent,
    );
    let title = "Shard Toxicity";
    if let Some(message) = report.message {
        let note = if report.hot_nodes.is_empty() {
            Line::styled(format!("✅ {}", message), Style::default().fg(app.theme.healthy))
        } else {
            Line::styled(
                format!("Hot nodes: {}. {}", report.hot_nodes.join(", "), message),
                app.theme.status_style(HealthStatus::Warning),
            )
        };
        render_message(frame, app, area, title, note);
        return;
    }

    let rows: Vec<Row> = report
        .tasks
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.node.clone()),
                Cell::from(format!("{:.0}%", t.cpu_percent)),
                Cell::from(t.tenant.clone()).style(app.theme.header),
                Cell::from(format!("{:.1}", t.running_secs)),
                Cell::from(truncate(&t.description, 120)),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!("{} (hot nodes: {})", title, report.hot_nodes.join(", ")),
        ["Node", "CPU", "Tenant", "Running (s)", "Query"],
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(4),
        ],
    );
}
