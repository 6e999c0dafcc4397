//! # es-doctor
//!
//! A diagnostic TUI and Markdown reporter for Elasticsearch clusters.
//!
//! es-doctor polls a cluster's monitoring APIs (or replays archived
//! snapshots), turns the raw payloads into node, index and shard rows and
//! runs a set of analyses over them: node pressure, shard distribution and
//! imbalance, slow and toxic search tasks, template and mapping risks, and
//! drift in cluster settings.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐ │
//! │  │  app    │───▶│   data   │───▶│ analysis │───▶│ ui/report│ │
//! │  │ (state) │    │  (rows)  │    │(findings)│    │ (output) │ │
//! │  └────┬────┘    └──────────┘    └──────────┘    └──────────┘ │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ┌─────────┐                                                 │
//! │  │ source  │◀── LiveSource (client) | FileSource (replay)    │
//! │  │ (input) │                                                 │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and refresh policy
//! - **[`source`]**: The [`ClusterSource`] trait, the live HTTP source, file
//!   replay and the snapshot archive
//! - **[`client`]**: Typed Elasticsearch HTTP client ([`EsClient`])
//! - **[`data`]**: [`ClusterData`] built from the current and previous snapshot
//! - **[`analysis`]**: One pure function per diagnostic
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`report`]**: The one-shot Markdown health report
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Interactive TUI against the cluster in ES_HOST
//! ES_HOST=https://localhost:9200 es-doctor
//!
//! # Markdown report to stdout
//! es-doctor --report > health.md
//!
//! # Replay archived snapshots
//! es-doctor --replay snapshots/
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use es_doctor::{App, FileSource, Settings};
//!
//! let source = Box::new(FileSource::new("snapshot.json"));
//! let app = App::new(source, Settings::default());
//! assert!(app.data.is_none());
//! ```
//!
//! ### Rendering a report from a snapshot
//!
//! ```no_run
//! use es_doctor::{render_markdown, ClusterData, ClusterSource, FetchPlan, FileSource, Settings};
//!
//! let mut source = FileSource::new("snapshot.json");
//! if let Some(snapshot) = source.poll(FetchPlan::overview()) {
//!     let data = ClusterData::from_snapshots(snapshot, None);
//!     println!("{}", render_markdown(&data, &Settings::default(), chrono::Utc::now()));
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod report;
pub mod source;
pub mod ui;

pub use app::{App, View};
pub use client::EsClient;
pub use config::{Settings, Thresholds};
pub use data::{ClusterData, HealthStatus};
pub use error::EsError;
pub use report::render_markdown;
pub use source::{
    ClusterSnapshot, ClusterSource, FetchPlan, FileSource, LiveSource, SnapshotArchive,
};
