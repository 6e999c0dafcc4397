//! Menu of every analysis.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

use super::common::view_block;
use crate::app::{App, View};

/// One-line explanation shown next to each entry.
fn describe(view: View) -> &'static str {
    match view {
        View::Menu => "",
        View::Dashboard => "cluster status, node health, top indices, suggestions",
        View::DeepDive => "thread pools and circuit breakers per node",
        View::Distribution => "shards and size grouped by pattern or index",
        View::Imbalance => "primaries unevenly spread over nodes",
        View::NodeLoad => "CPU and heap against the load of hosted shards",
        View::SlowTasks => "long-running search tasks",
        View::Templates => "templates without ILM, too many shards, catch-all patterns",
        View::Mapping => "indices close to the field limit",
        View::Dusty => "empty and tiny shards",
        View::Drift => "transient and non-default cluster settings",
        View::Causality => "memory pressure traced to GC, rejections and indices",
        View::Toxicity => "tenants behind the searches on hot nodes",
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = View::ANALYSES
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let live = if view.is_live() { "" } else { " (on demand)" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), app.theme.muted),
                Span::styled(view.label(), Style::default().fg(app.theme.highlight)),
                Span::styled(live, app.theme.muted),
                Span::raw(format!("  {}", describe(*view))),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(view_block(app, "Analyses"))
        .highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.menu_index));
    frame.render_stateful_widget(list, area, &mut state);
}
