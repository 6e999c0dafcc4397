//! Node CPU/heap correlated with the indexing and search load of its shards.

use crate::data::ClusterData;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLoad {
    pub node: String,
    pub cpu_percent: f64,
    pub heap_percent: f64,
    pub primaries: usize,
    pub total_shards: usize,
    /// Docs/s routed to primaries on this node.
    pub write_load: f64,
    /// Queries/s served by shard copies on this node.
    pub search_load: f64,
}

/// Per-node load, hottest CPU first.
///
/// An index's write rate is split evenly over its primaries and its search
/// rate over its started copies.
pub fn node_load(data: &ClusterData) -> Vec<NodeLoad> {
    let indices = data.index_map();
    let copies = data.started_copies();

    let mut rows: Vec<NodeLoad> = data
        .nodes
        .iter()
        .map(|node| {
            let mut row = NodeLoad {
                node: node.name.clone(),
                cpu_percent: node.metrics.cpu_percent,
                heap_percent: node.metrics.heap_percent,
                primaries: 0,
                total_shards: 0,
                write_load: 0.0,
                search_load: 0.0,
            };

            for shard in data
                .shards
                .iter()
                .filter(|s| s.node.as_deref() == Some(node.name.as_str()))
            {
                row.total_shards += 1;
                let index = indices.get(shard.index.as_str());

                if shard.primary {
                    row.primaries += 1;
                    if let Some(index) = index.filter(|i| i.primaries > 0) {
                        row.write_load += index.write_rate / index.primaries as f64;
                    }
                }
                if shard.is_started() {
                    let started = copies.get(shard.index.as_str()).copied().unwrap_or(0);
                    if let Some(index) = index.filter(|_| started > 0) {
                        row.search_load += index.search_rate / started as f64;
                    }
                }
            }
            row
        })
        .collect();

    rows.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| a.node.cmp(&b.node))
    });
    rows
}
