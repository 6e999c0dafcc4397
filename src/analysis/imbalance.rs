//! Primary shard imbalance across nodes, per index pattern.

use std::collections::BTreeMap;

use crate::data::{index_pattern, ClusterData};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShardCount {
    pub node: String,
    pub count: usize,
    /// Holds the maximum number of primaries of the pattern.
    pub hotspot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternImbalance {
    pub pattern: String,
    pub std_dev: f64,
    pub write_rate: f64,
    pub search_rate: f64,
    pub nodes: Vec<NodeShardCount>,
}

/// Sample standard deviation (n - 1). 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Patterns whose primaries are unevenly spread, most imbalanced first.
///
/// Only nodes that hold at least one primary of the pattern take part.
pub fn imbalance(data: &ClusterData) -> Vec<PatternImbalance> {
    let mut counts: BTreeMap<String, BTreeMap<&str, usize>> = BTreeMap::new();
    for shard in data.shards.iter().filter(|s| s.primary) {
        let Some(node) = shard.node.as_deref() else {
            continue;
        };
        *counts
            .entry(index_pattern(&shard.index))
            .or_default()
            .entry(node)
            .or_default() += 1;
    }

    let mut activity: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for index in &data.indices {
        let entry = activity.entry(index_pattern(&index.name)).or_default();
        entry.0 += index.write_rate;
        entry.1 += index.search_rate;
    }

    let mut out: Vec<PatternImbalance> = counts
        .into_iter()
        .filter(|(_, per_node)| per_node.len() > 1)
        .filter_map(|(pattern, per_node)| {
            let values: Vec<f64> = per_node.values().map(|c| *c as f64).collect();
            let std_dev = sample_std_dev(&values);
            if std_dev <= 0.0 {
                return None;
            }

            let max = per_node.values().copied().max().unwrap_or(0);
            let mut nodes: Vec<NodeShardCount> = per_node
                .into_iter()
                .map(|(node, count)| NodeShardCount {
                    node: node.to_string(),
                    count,
                    hotspot: count == max,
                })
                .collect();
            nodes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.node.cmp(&b.node)));

            let (write_rate, search_rate) = activity.get(&pattern).copied().unwrap_or_default();
            Some(PatternImbalance {
                pattern,
                std_dev,
                write_rate,
                search_rate,
                nodes,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.std_dev
            .total_cmp(&a.std_dev)
            .then_with(|| a.pattern.cmp(&b.pattern))
    });
    out
}
