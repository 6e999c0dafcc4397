//! Terminal rendering with ratatui.
//!
//! [`render`] draws the frame for the current [`View`]: a header bar, the
//! view itself and a status bar, plus the help overlay when it is open.

pub mod audit;
pub mod common;
pub mod dashboard;
pub mod menu;
pub mod nodes;
pub mod shards;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, top, area.width, 5.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let [header, content, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .areas(area);

    common::render_header(frame, app, header);

    match app.current_view {
        View::Menu => menu::render(frame, app, content),
        View::Dashboard => dashboard::render(frame, app, content),
        View::DeepDive => nodes::render_deep_dive(frame, app, content),
        View::NodeLoad => nodes::render_node_load(frame, app, content),
        View::Causality => nodes::render_causality(frame, app, content),
        View::Toxicity => nodes::render_toxicity(frame, app, content),
        View::Distribution => shards::render_distribution(frame, app, content),
        View::Imbalance => shards::render_imbalance(frame, app, content),
        View::Dusty => shards::render_dusty(frame, app, content),
        View::SlowTasks => audit::render_slow_tasks(frame, app, content),
        View::Templates => audit::render_templates(frame, app, content),
        View::Mapping => audit::render_mapping(frame, app, content),
        View::Drift => audit::render_drift(frame, app, content),
    }

    common::render_status_bar(frame, app, status);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
