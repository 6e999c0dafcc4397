//! Per-node thread pools and circuit breakers.

use crate::data::format::bytes_to_mb;
use crate::data::ClusterData;
use crate::source::api::ThreadPoolStats;

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPoolRow {
    pub name: String,
    pub active: u64,
    pub queue: u64,
    pub rejected: u64,
    pub completed: u64,
    pub previous: Option<ThreadPoolStats>,
}

impl ThreadPoolRow {
    /// `rejected / (completed + rejected)`, 0 when the pool never ran.
    pub fn rejection_ratio(&self) -> f64 {
        let total = self.completed + self.rejected;
        if total == 0 {
            0.0
        } else {
            self.rejected as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakerRow {
    pub name: String,
    pub limit_mb: f64,
    pub estimated_mb: f64,
    pub previous_estimated_mb: Option<f64>,
    pub tripped: u64,
    pub previous_tripped: Option<u64>,
}

impl BreakerRow {
    /// `estimated / limit`, 0 for unbounded breakers.
    pub fn usage_ratio(&self) -> f64 {
        if self.limit_mb > 0.0 {
            self.estimated_mb / self.limit_mb
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDeepDive {
    pub node_id: String,
    pub name: String,
    pub cpu_percent: f64,
    /// Pools with any activity, queueing or rejections.
    pub thread_pools: Vec<ThreadPoolRow>,
    pub breakers: Vec<BreakerRow>,
}

/// Break every node down, hottest CPU first.
pub fn deep_dive(data: &ClusterData) -> Vec<NodeDeepDive> {
    let mut nodes: Vec<NodeDeepDive> = data
        .nodes
        .iter()
        .filter_map(|node| {
            let stats = data.node_stats(&node.id)?;
            let prev = data.previous_node_stats(&node.id);

            let thread_pools = stats
                .thread_pool
                .iter()
                .filter(|(_, p)| p.active > 0 || p.queue > 0 || p.rejected > 0)
                .map(|(name, p)| ThreadPoolRow {
                    name: name.clone(),
                    active: p.active,
                    queue: p.queue,
                    rejected: p.rejected,
                    completed: p.completed,
                    previous: prev.and_then(|s| s.thread_pool.get(name)).cloned(),
                })
                .collect();

            let breakers = stats
                .breakers
                .iter()
                .map(|(name, b)| {
                    let prev_breaker = prev.and_then(|s| s.breakers.get(name));
                    BreakerRow {
                        name: name.clone(),
                        limit_mb: bytes_to_mb(b.limit_size_in_bytes),
                        estimated_mb: bytes_to_mb(b.estimated_size_in_bytes),
                        previous_estimated_mb: prev_breaker
                            .map(|p| bytes_to_mb(p.estimated_size_in_bytes)),
                        tripped: b.tripped,
                        previous_tripped: prev_breaker.map(|p| p.tripped),
                    }
                })
                .collect();

            Some(NodeDeepDive {
                node_id: node.id.clone(),
                name: node.name.clone(),
                cpu_percent: node.metrics.cpu_percent,
                thread_pools,
                breakers,
            })
        })
        .collect();

    nodes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cluster::fixtures::*;
    use crate::source::api::BreakerStats;

    #[test]
    fn test_sorted_by_cpu() {
        let nodes = deep_dive(&cluster_data());
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["es-hot-1", "es-warm-1"]);
    }

    #[test]
    fn test_pools_and_breakers() {
        let mut previous = snapshot(0, 0, 0);
        let mut current = snapshot(5, 0, 0);

        let hot = current.nodes_stats.nodes.get_mut("n1").unwrap();
        hot.thread_pool.insert(
            "write".to_string(),
            ThreadPoolStats {
                active: 4,
                queue: 10,
                rejected: 25,
                completed: 75,
                ..Default::default()
            },
        );
        hot.thread_pool.insert("idle".to_string(), ThreadPoolStats::default());
        hot.breakers.insert(
            "fielddata".to_string(),
            BreakerStats {
                limit_size_in_bytes: 400_000_000,
                estimated_size_in_bytes: 100_000_000,
                tripped: 1,
                ..Default::default()
            },
        );
        previous.nodes_stats.nodes.get_mut("n1").unwrap().breakers.insert(
            "fielddata".to_string(),
            BreakerStats {
                limit_size_in_bytes: 400_000_000,
                estimated_size_in_bytes: 50_000_000,
                ..Default::default()
            },
        );

        let data = ClusterData::from_snapshots(current, Some(previous));
        let nodes = deep_dive(&data);
        let hot = &nodes[0];

        assert_eq!(hot.thread_pools.len(), 1);
        let write = &hot.thread_pools[0];
        assert_eq!(write.name, "write");
        assert_eq!(write.rejection_ratio(), 0.25);
        assert!(write.previous.is_none());

        let fielddata = &hot.breakers[0];
        assert_eq!(fielddata.limit_mb, 400.0);
        assert_eq!(fielddata.estimated_mb, 100.0);
        assert_eq!(fielddata.previous_estimated_mb, Some(50.0));
        assert_eq!(fielddata.usage_ratio(), 0.25);
        assert_eq!(fielddata.tripped, 1);
    }

    #[test]
    fn test_unbounded_breaker() {
        let row = BreakerRow {
            name: "inflight_requests".to_string(),
            limit_mb: 0.0,
            estimated_mb: 3.0,
            previous_estimated_mb: None,
            tripped: 0,
            previous_tripped: None,
        };
        assert_eq!(row.usage_ratio(), 0.0);
    }
}
