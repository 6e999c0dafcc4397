//! Live dashboard: header, node health by tier, rankings and suggestions.

use chrono::{DateTime, Utc};

use super::suggestions::{suggestions, Suggestion};
use crate::config::Settings;
use crate::data::{ClusterData, HealthStatus, IndexRow, MetricDelta, NodeRow};

/// Number of indices in each ranking.
pub const RANKING_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardHeader {
    pub cluster_name: String,
    pub status: String,
    pub health: HealthStatus,
    pub heap_total_percent: f64,
    pub pending_tasks: usize,
    pub initializing_shards: u64,
    pub relocating_shards: u64,
    pub unassigned_shards: u64,
    pub updated_at: DateTime<Utc>,
}

/// One row of the node health table.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHealthRow {
    pub tier: String,
    pub name: String,
    pub cpu: MetricDelta,
    pub heap: MetricDelta,
    pub old_gen: MetricDelta,
    pub gc_count: MetricDelta,
    pub gc_time_ms: MetricDelta,
    pub rejections: MetricDelta,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedIndex {
    pub index: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeapRanking {
    pub index: String,
    pub total_mb: f64,
    pub segments_mb: f64,
    pub query_cache_mb: f64,
    pub fielddata_mb: f64,
}

impl From<&IndexRow> for HeapRanking {
    fn from(row: &IndexRow) -> Self {
        Self {
            index: row.name.clone(),
            total_mb: row.heap_mb(),
            segments_mb: row.segments_mb,
            query_cache_mb: row.query_cache_mb,
            fielddata_mb: row.fielddata_mb,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub header: DashboardHeader,
    pub nodes: Vec<NodeHealthRow>,
    pub top_writers: Vec<RankedIndex>,
    pub top_searchers: Vec<RankedIndex>,
    pub top_heap: Vec<HeapRanking>,
    pub suggestions: Vec<Suggestion>,
    /// False until two snapshots with index stats have been seen.
    pub has_rates: bool,
}

fn node_health(node: &NodeRow, settings: &Settings) -> NodeHealthRow {
    let spikes = &settings.spikes;
    let t = &settings.thresholds;
    let m = &node.metrics;
    let p = node.previous.as_ref();

    let status = if m.breakers_tripped > 0
        || m.heap_percent > t.heap_percent
        || m.old_gen_percent > t.heap_old_gen_percent
    {
        HealthStatus::Critical
    } else if m.cpu_percent > t.cpu_percent || m.rejected > t.rejections {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    NodeHealthRow {
        tier: node.tier.clone(),
        name: node.name.clone(),
        cpu: MetricDelta::new(m.cpu_percent, p.map(|p| p.cpu_percent), spikes.cpu),
        heap: MetricDelta::new(m.heap_percent, p.map(|p| p.heap_percent), spikes.heap),
        old_gen: MetricDelta::new(m.old_gen_percent, p.map(|p| p.old_gen_percent), spikes.old_gen),
        gc_count: MetricDelta::new(
            m.gc_old_count as f64,
            p.map(|p| p.gc_old_count as f64),
            spikes.gc_count,
        ),
        gc_time_ms: MetricDelta::new(
            m.gc_old_time_ms as f64,
            p.map(|p| p.gc_old_time_ms as f64),
            spikes.gc_time_ms,
        ),
        rejections: MetricDelta::new(
            m.rejected as f64,
            p.map(|p| p.rejected as f64),
            spikes.rejections,
        ),
        status,
    }
}

/// Assemble the dashboard from processed data.
pub fn dashboard(data: &ClusterData, settings: &Settings) -> Dashboard {
    let mut nodes: Vec<NodeHealthRow> = data
        .nodes
        .iter()
        .map(|n| node_health(n, settings))
        .collect();
    nodes.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.name.cmp(&b.name)));

    Dashboard {
        header: DashboardHeader {
            cluster_name: data.cluster_name.clone(),
            status: data.status.clone(),
            health: data.health,
            heap_total_percent: data.heap_total_percent,
            pending_tasks: data.pending_tasks,
            initializing_shards: data.initializing_shards,
            relocating_shards: data.relocating_shards,
            unassigned_shards: data.unassigned_shards,
            updated_at: data.fetched_at,
        },
        nodes,
        top_writers: data
            .top_writers(RANKING_SIZE)
            .into_iter()
            .map(|i| RankedIndex {
                index: i.name.clone(),
                value: i.write_rate,
            })
            .collect(),
        top_searchers: data
            .top_searchers(RANKING_SIZE)
            .into_iter()
            .map(|i| RankedIndex {
                index: i.name.clone(),
                value: i.search_rate,
            })
            .collect(),
        top_heap: data
            .top_heap_indices(RANKING_SIZE)
            .into_iter()
            .map(HeapRanking::from)
            .collect(),
        suggestions: suggestions(data, &settings.thresholds),
        has_rates: data.has_rates(),
    }
}
