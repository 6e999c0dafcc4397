//! Data source abstraction for receiving cluster snapshots.
//!
//! A source is either a live cluster reached over HTTP or archived snapshot
//! files replayed from disk.

pub mod api;
mod archive;
mod collector;
mod file;
pub(crate) mod lenient;
mod live;
mod snapshot;

pub use archive::{archived_at, archived_files, SnapshotArchive};
pub use collector::collect;
pub use file::FileSource;
pub use live::LiveSource;
pub use snapshot::{ClusterSnapshot, FetchPlan};

use std::fmt::Debug;

/// Trait for receiving cluster data from various sources.
///
/// # Example
///
/// ```no_run
/// use es_doctor::{ClusterSource, FetchPlan, FileSource};
///
/// let mut source = FileSource::new("snapshots/");
/// if let Some(snapshot) = source.poll(FetchPlan::overview()) {
///     println!("{} nodes", snapshot.nodes_stats.nodes.len());
/// }
/// ```
pub trait ClusterSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// `plan` says which optional sections the current view needs. Returns
    /// `None` when no new data is available or the refresh failed; in the
    /// latter case [`error`](Self::error) carries the reason.
    fn poll(&mut self, plan: FetchPlan) -> Option<ClusterSnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the last poll failed.
    fn error(&self) -> Option<&str>;
}
