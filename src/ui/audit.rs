//! Audit views: slow tasks, template lint, mapping risk and configuration drift.
//!
//! Each reads an optional snapshot section. A missing section means the
//! request failed (the collector logged why), so the view says so instead of
//! reporting a clean result.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Cell, Row},
    Frame,
};

use super::common::{render_lines, render_message, render_no_data, render_table};
use crate::analysis::{configuration_drift, lint_templates, mapping_risks, slow_tasks};
use crate::app::App;
use crate::data::format::{format_count, format_ratio, truncate};
use crate::data::HealthStatus;

fn render_unavailable(frame: &mut Frame, app: &App, area: Rect, what: &str) {
    let note = Line::styled(
        format!("{} unavailable (see the log for the request error).", what),
        app.theme.status_style(HealthStatus::Warning),
    );
    render_message(frame, app, area, app.current_view.label(), note);
}

fn render_all_clear(frame: &mut Frame, app: &App, area: Rect, message: String) {
    let note = Line::styled(format!("✅ {}", message), Style::default().fg(app.theme.healthy));
    render_message(frame, app, area, app.current_view.label(), note);
}

pub fn render_slow_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let Some(tasks) = data.current.tasks.as_ref() else {
        render_unavailable(frame, app, area, "Task list");
        return;
    };
    let threshold = app.settings.thresholds.long_running_task_minutes;
    let slow = slow_tasks(tasks, threshold);
    if slow.is_empty() {
        render_all_clear(
            frame,
            app,
            area,
            format!("No search tasks running longer than {} minutes.", threshold),
        );
        return;
    }

    let rows: Vec<Row> = slow
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.node.clone()),
                Cell::from(format!("{:.1}", t.running_minutes))
                    .style(app.theme.status_style(HealthStatus::Warning)),
                Cell::from(t.action.clone()),
                Cell::from(if t.cancellable { "yes" } else { "no" }),
                Cell::from(truncate(&t.description, 120)),
            ])
        })
        .collect();
    render_table(
        frame,
        app,
        area,
        format!("Slow Search Tasks (> {} min)", threshold),
        ["Node", "Minutes", "Action", "Cancel", "Description"],
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Fill(4),
        ],
    );
}

pub fn render_templates(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let Some(templates) = data.current.templates.as_ref() else {
        render_unavailable(frame, app, area, "Index templates");
        return;
    };
    let reports = lint_templates(
        templates,
        &data.indices,
        app.settings.thresholds.template_shard_count,
    );
    if reports.is_empty() {
        let note = Line::styled("No index templates found.", app.theme.muted);
        render_message(frame, app, area, "Index Template Lint", note);
        return;
    }

    let flagged = reports.iter().filter(|r| !r.is_ok()).count();
    let rows: Vec<Row> = reports
        .iter()
        .map(|r| {
            let style = if r.is_ok() {
                app.theme.status_style(HealthStatus::Healthy)
            } else {
                app.theme.status_style(HealthStatus::Warning)
            };
            Row::new(vec![
                Cell::from(r.name.clone()),
                Cell::from(truncate(&r.patterns.join(", "), 40)),
                Cell::from(r.index_count().to_string()),
                Cell::from(format_count(r.total_docs)),
                Cell::from(r.size_display()),
                Cell::from(r.diagnosis()).style(style),
            ])
        })
        .collect();
    render_table(
        frame,
        app,
        area,
        format!("Index Template Lint ({} of {} flagged)", flagged, reports.len()),
        ["Template", "Patterns", "Indices", "Docs", "Size", "Diagnosis"],
        rows,
        [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Fill(3),
        ],
    );
}

pub fn render_mapping(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let Some(mappings) = data.current.mappings.as_ref() else {
        render_unavailable(frame, app, area, "Index mappings");
        return;
    };
    let risks = mapping_risks(
        mappings,
        data.current.index_settings.as_ref(),
        &app.settings.thresholds,
    );
    if risks.is_empty() {
        render_all_clear(
            frame,
            app,
            area,
            "No indices at risk of mapping explosion.".to_string(),
        );
        return;
    }

    let rows: Vec<Row> = risks
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.index.clone()),
                Cell::from(r.field_count.to_string()),
                Cell::from(r.limit.to_string()),
                Cell::from(format_ratio(r.ratio)),
                Cell::from(r.diagnosis()).style(app.theme.status_style(r.severity)),
            ])
        })
        .collect();
    render_table(
        frame,
        app,
        area,
        format!("Mapping Explosion Risk ({} indices)", risks.len()),
        ["Index", "Fields", "Limit", "Usage", "Diagnosis"],
        rows,
        [
            Constraint::Fill(3),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Fill(2),
        ],
    );
}

pub fn render_drift(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_no_data(frame, app, area);
        return;
    };
    let Some(settings) = data.current.cluster_settings.as_ref() else {
        render_unavailable(frame, app, area, "Cluster settings");
        return;
    };
    let drift = configuration_drift(settings);
    if drift.is_empty() {
        render_all_clear(
            frame,
            app,
            area,
            "No drift in critical cluster settings.".to_string(),
        );
        return;
    }

    let lines: Vec<Line> = drift
        .iter()
        .map(|d| {
            Line::styled(
                format!("[{}] {}", d.severity.symbol(), d),
                app.theme.status_style(d.severity),
            )
        })
        .collect();
    render_lines(
        frame,
        app,
        area,
        &format!("Configuration Drift ({} findings)", drift.len()),
        lines,
    );
}
