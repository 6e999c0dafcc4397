//! Data models derived from raw cluster snapshots.
//!
//! This module turns the payloads of one or two [`ClusterSnapshot`]s into
//! flat rows that every analysis can work from.
//!
//! ## Submodules
//!
//! - [`cluster`]: Core data models ([`ClusterData`], [`NodeRow`], [`IndexRow`], [`ShardRow`])
//! - [`delta`]: Change of a metric between refreshes ([`MetricDelta`])
//! - [`format`]: Human-readable counts, sizes and rates
//! - [`pattern`]: Index name normalization (`logs-2024.01.31` to `logs-*`)
//! - [`rates`]: Per-second rates from cumulative counters
//!
//! ## Data Flow
//!
//! ```text
//! ClusterSnapshot (current) + ClusterSnapshot (previous)
//!        │
//!        ▼
//! ClusterData::from_snapshots()
//!        │
//!        ├──▶ NodeRow  (metrics now and before)
//!        ├──▶ IndexRow (open indices, write/search rates)
//!        └──▶ ShardRow
//! ```
//!
//! [`ClusterSnapshot`]: crate::source::ClusterSnapshot

pub mod cluster;
pub mod delta;
pub mod format;
pub mod pattern;
pub mod rates;

pub use cluster::{
    resolve_tier, ClusterData, HealthStatus, IndexRow, NodeMetrics, NodeRow, ShardRow,
};
pub use delta::{MetricDelta, Trend};
pub use pattern::index_pattern;
