//! Application state and navigation logic.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::analysis::{GroupBy, SortKey};
use crate::config::Settings;
use crate::data::ClusterData;
use crate::source::{ClusterSource, FetchPlan, SnapshotArchive};
use crate::ui::Theme;

/// The current screen of the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Numbered list of every analysis.
    Menu,
    Dashboard,
    DeepDive,
    Distribution,
    Imbalance,
    NodeLoad,
    SlowTasks,
    Templates,
    Mapping,
    Dusty,
    Drift,
    Causality,
    Toxicity,
}

impl View {
    /// Menu entries in display order.
    pub const ANALYSES: [View; 12] = [
        View::Dashboard,
        View::DeepDive,
        View::Distribution,
        View::Imbalance,
        View::NodeLoad,
        View::SlowTasks,
        View::Templates,
        View::Mapping,
        View::Dusty,
        View::Drift,
        View::Causality,
        View::Toxicity,
    ];

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Menu => "Menu",
            View::Dashboard => "Live Dashboard",
            View::DeepDive => "Node Deep Dive",
            View::Distribution => "Shard Distribution",
            View::Imbalance => "Shard Imbalance",
            View::NodeLoad => "Node Load Correlation",
            View::SlowTasks => "Slow Search Tasks",
            View::Templates => "Index Template Lint",
            View::Mapping => "Mapping Explosion Risk",
            View::Dusty => "Dusty Shards",
            View::Drift => "Configuration Drift",
            View::Causality => "Causality Chains",
            View::Toxicity => "Shard Toxicity",
        }
    }

    /// Sections to fetch for this view, `None` for the menu.
    pub fn fetch_plan(&self) -> Option<FetchPlan> {
        let shards_only = FetchPlan {
            shards: true,
            ..FetchPlan::nodes_only()
        };
        let plan = match self {
            View::Menu => return None,
            View::Dashboard | View::Imbalance | View::NodeLoad | View::Causality => {
                FetchPlan::overview()
            }
            View::DeepDive => FetchPlan::nodes_only(),
            View::Distribution | View::Dusty => shards_only,
            View::SlowTasks | View::Toxicity => FetchPlan::nodes_only().with_tasks(),
            View::Templates => FetchPlan {
                indices: true,
                ..FetchPlan::nodes_only()
            }
            .with_templates(),
            View::Mapping => FetchPlan::nodes_only().with_mappings(),
            View::Drift => FetchPlan::nodes_only().with_cluster_settings(),
        };
        Some(plan)
    }

    /// Live views refresh on every tick; the others only on entry and on `r`.
    pub fn is_live(&self) -> bool {
        !matches!(
            self,
            View::Menu | View::Templates | View::Mapping | View::Drift
        )
    }
}

/// Saved state for returning to a previous view.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view: View,
    pub menu_index: usize,
    pub scroll: usize,
}

/// How long the menu waits for the second digit of an entry number.
const DIGIT_TIMEOUT: Duration = Duration::from_millis(1500);

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    source: Box<dyn ClusterSource>,
    archive: Option<SnapshotArchive>,
    pub settings: Settings,
    /// Latest data, holding the current and the previous snapshot.
    pub data: Option<ClusterData>,
    pub load_error: Option<String>,
    pub last_refresh: Option<Instant>,

    // Navigation
    pub menu_index: usize,
    /// First digit of a two-digit menu number, with when it was typed.
    pub pending_digit: Option<(usize, Instant)>,
    pub scroll: usize,
    pub view_stack: Vec<ViewState>,

    // Shard distribution
    pub group_by: GroupBy,
    pub sort_key: SortKey,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(source: Box<dyn ClusterSource>, settings: Settings) -> Self {
        Self {
            running: true,
            current_view: View::Menu,
            show_help: false,
            source,
            archive: None,
            settings,
            data: None,
            load_error: None,
            last_refresh: None,
            menu_index: 0,
            pending_digit: None,
            scroll: 0,
            view_stack: Vec::new(),
            group_by: GroupBy::default(),
            sort_key: SortKey::default(),
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Archive complete snapshots as they arrive.
    pub fn with_archive(mut self, archive: Option<SnapshotArchive>) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < Duration::from_secs(3) => Some(msg),
            _ => None,
        }
    }

    /// Push current state to the stack and open `view`.
    pub fn push_view(&mut self, view: View) {
        self.view_stack.push(ViewState {
            view: self.current_view,
            menu_index: self.menu_index,
            scroll: self.scroll,
        });
        self.current_view = view;
        self.scroll = 0;
        self.reload_data();
    }

    /// Pop the view stack and restore previous state.
    pub fn pop_view(&mut self) -> bool {
        let Some(state) = self.view_stack.pop() else {
            return false;
        };
        self.current_view = state.view;
        self.menu_index = state.menu_index;
        self.scroll = state.scroll;
        true
    }

    /// Breadcrumb trail for the status bar.
    pub fn breadcrumb(&self) -> String {
        let mut parts: Vec<&str> = self.view_stack.iter().map(|s| s.view.label()).collect();
        parts.push(self.current_view.label());
        parts.join(" > ")
    }

    /// Poll the source with the plan of the current view.
    ///
    /// Returns true when new data arrived. The previous snapshot is kept so
    /// rates and deltas can be computed; anything older is dropped.
    pub fn reload_data(&mut self) -> bool {
        let Some(plan) = self.current_view.fetch_plan() else {
            return false;
        };

        let Some(snapshot) = self.source.poll(plan) else {
            if let Some(err) = self.source.error() {
                self.load_error = Some(err.to_string());
            }
            return false;
        };

        if plan.is_overview() {
            if let Some(archive) = self.archive.as_mut() {
                match archive.save_if_due(&snapshot) {
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to archive snapshot");
                        self.set_status_message(format!("Archive failed: {}", e));
                    }
                }
            }
        }

        let previous = self.data.take().map(|d| d.current);
        self.data = Some(ClusterData::from_snapshots(snapshot, previous));
        self.load_error = None;
        self.last_refresh = Some(Instant::now());
        true
    }

    /// Refresh tick: live views poll, static views keep their data.
    pub fn tick(&mut self) -> bool {
        self.current_view.is_live() && self.reload_data()
    }

    /// Explicit refresh (`r`), for every view.
    pub fn refresh(&mut self) {
        if self.reload_data() {
            self.set_status_message("Refreshed".to_string());
        } else if let Some(err) = &self.load_error {
            self.set_status_message(format!("Refresh failed: {}", err));
        }
    }

    /// Open the analysis selected in the menu.
    pub fn enter(&mut self) {
        if self.current_view != View::Menu {
            return;
        }
        self.pending_digit = None;
        if let Some(view) = View::ANALYSES.get(self.menu_index).copied() {
            self.push_view(view);
        }
    }

    /// Open the n-th (1-based) analysis from the menu.
    pub fn open_numbered(&mut self, n: usize) {
        if self.current_view == View::Menu && (1..=View::ANALYSES.len()).contains(&n) {
            self.menu_index = n - 1;
            self.enter();
        }
    }

    /// Digit typed in the menu.
    ///
    /// A digit that can start a two-digit entry (`1` for 10 to 12) only
    /// selects its entry and waits for a second digit; Enter opens the
    /// selection instead. Every other digit opens its entry directly.
    pub fn menu_digit(&mut self, digit: usize) {
        if self.current_view != View::Menu {
            return;
        }
        let count = View::ANALYSES.len();
        let n = match self.pending_digit.take() {
            Some((first, typed))
                if typed.elapsed() < DIGIT_TIMEOUT && first * 10 + digit <= count =>
            {
                first * 10 + digit
            }
            _ => digit,
        };

        if n >= 10 || n * 10 > count || n == 0 {
            self.open_numbered(n);
        } else {
            self.menu_index = n - 1;
            self.pending_digit = Some((n, Instant::now()));
        }
    }

    /// Navigate back: pop the view stack, falling back to the menu.
    pub fn go_back(&mut self) {
        if !self.pop_view() && self.current_view != View::Menu {
            self.current_view = View::Menu;
            self.scroll = 0;
        }
    }

    pub fn select_next_n(&mut self, n: usize) {
        if self.current_view == View::Menu {
            let max = View::ANALYSES.len() - 1;
            self.menu_index = (self.menu_index + n).min(max);
        } else {
            self.scroll = self.scroll.saturating_add(n);
        }
    }

    pub fn select_prev_n(&mut self, n: usize) {
        if self.current_view == View::Menu {
            self.menu_index = self.menu_index.saturating_sub(n);
        } else {
            self.scroll = self.scroll.saturating_sub(n);
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_first(&mut self) {
        if self.current_view == View::Menu {
            self.menu_index = 0;
        } else {
            self.scroll = 0;
        }
    }

    /// Toggle pattern/index grouping in the shard distribution.
    pub fn toggle_group_by(&mut self) {
        if self.current_view == View::Distribution {
            self.group_by = self.group_by.toggle();
            self.scroll = 0;
        }
    }

    /// Cycle the sort column of the shard distribution.
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Distribution {
            self.sort_key = self.sort_key.next();
            self.scroll = 0;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
