//! Shard distribution grouped by index or index pattern.

use std::collections::{BTreeMap, HashSet};

use crate::data::{index_pattern, ShardRow};

/// Rows shown in the distribution view.
pub const TOP_GROUPS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Pattern,
    Index,
}

impl GroupBy {
    pub fn toggle(self) -> Self {
        match self {
            GroupBy::Pattern => GroupBy::Index,
            GroupBy::Index => GroupBy::Pattern,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Pattern => "Pattern",
            GroupBy::Index => "Index",
        }
    }
}

/// Column to sort groups by (always descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    TotalShards,
    TotalGb,
    Primaries,
    NodesInvolved,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::TotalShards => SortKey::TotalGb,
            SortKey::TotalGb => SortKey::Primaries,
            SortKey::Primaries => SortKey::NodesInvolved,
            SortKey::NodesInvolved => SortKey::TotalShards,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::TotalShards => "Total Shards",
            SortKey::TotalGb => "Size (GB)",
            SortKey::Primaries => "Primaries",
            SortKey::NodesInvolved => "Nodes",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShardGroup {
    pub key: String,
    pub total_shards: usize,
    pub primaries: usize,
    pub replicas: usize,
    pub total_gb: f64,
    pub nodes_involved: usize,
}

#[derive(Default)]
struct Accumulator<'a> {
    total: usize,
    primaries: usize,
    store_mb: f64,
    nodes: HashSet<&'a str>,
}

/// Summarize shards per group, sorted descending by `sort`.
pub fn distribution(shards: &[ShardRow], group_by: GroupBy, sort: SortKey) -> Vec<ShardGroup> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for shard in shards {
        let key = match group_by {
            GroupBy::Pattern => index_pattern(&shard.index),
            GroupBy::Index => shard.index.clone(),
        };
        let acc = groups.entry(key).or_default();
        acc.total += 1;
        if shard.primary {
            acc.primaries += 1;
        }
        acc.store_mb += shard.store_mb;
        if let Some(node) = shard.node.as_deref() {
            acc.nodes.insert(node);
        }
    }

    let mut rows: Vec<ShardGroup> = groups
        .into_iter()
        .map(|(key, acc)| ShardGroup {
            key,
            total_shards: acc.total,
            primaries: acc.primaries,
            replicas: acc.total - acc.primaries,
            total_gb: acc.store_mb / 1024.0,
            nodes_involved: acc.nodes.len(),
        })
        .collect();

    rows.sort_by(|a, b| {
        let ord = match sort {
            SortKey::TotalShards => b.total_shards.cmp(&a.total_shards),
            SortKey::TotalGb => b.total_gb.total_cmp(&a.total_gb),
            SortKey::Primaries => b.primaries.cmp(&a.primaries),
            SortKey::NodesInvolved => b.nodes_involved.cmp(&a.nodes_involved),
        };
        ord.then_with(|| a.key.cmp(&b.key))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cluster::fixtures::*;

    #[test]
    fn test_group_by_pattern() {
        let data = cluster_data();
        let rows = distribution(&data.shards, GroupBy::Pattern, SortKey::TotalShards);

        assert_eq!(rows.len(), 2);
        let logs = &rows[0];
        assert_eq!(logs.key, "logs-*");
        assert_eq!(logs.total_shards, 3);
        assert_eq!(logs.primaries, 2);
        assert_eq!(logs.replicas, 1);
        assert_eq!(logs.nodes_involved, 2);
        assert!((logs.total_gb - 450.0 / 1024.0).abs() < 1e-9);

        let orders = &rows[1];
        assert_eq!(orders.total_shards, 2);
        // The unassigned replica has no node
        assert_eq!(orders.nodes_involved, 1);
    }

    #[test]
    fn test_group_by_index_and_sort() {
        let data = cluster_data();
        let rows = distribution(&data.shards, GroupBy::Index, SortKey::Primaries);
        assert_eq!(rows[0].key, "logs-2024.05.01");
        assert_eq!(rows[0].primaries, 2);

        let by_nodes = distribution(&data.shards, GroupBy::Index, SortKey::NodesInvolved);
        assert_eq!(by_nodes[0].nodes_involved, 2);
    }

    #[test]
    fn test_sort_cycle() {
        let mut key = SortKey::default();
        for _ in 0..4 {
            key = key.next();
        }
        assert_eq!(key, SortKey::TotalShards);
        assert_eq!(GroupBy::Pattern.toggle(), GroupBy::Index);
    }
}
