//! Cluster data derived from one or two snapshots.
//!
//! [`ClusterData::from_snapshots`] joins the raw payloads into flat per-node,
//! per-index and per-shard rows. When a previous snapshot is given, counter
//! deltas and per-second rates are computed against it.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::format::bytes_to_mb;
use super::rates::{increase, per_second};
use crate::source::api::{NodeInfo, NodeStats};
use crate::source::ClusterSnapshot;

/// Health status of a node, index or the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }

    /// Map an Elasticsearch `green`/`yellow`/`red` status.
    pub fn from_es(status: &str) -> Self {
        match status {
            "green" => HealthStatus::Healthy,
            "yellow" => HealthStatus::Warning,
            _ => HealthStatus::Critical,
        }
    }
}

/// Point-in-time metrics of one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetrics {
    pub cpu_percent: f64,
    pub heap_percent: f64,
    pub old_gen_percent: f64,
    pub gc_old_count: u64,
    pub gc_old_time_ms: u64,
    pub breakers_tripped: u64,
    pub rejected: u64,
}

impl NodeMetrics {
    fn from_stats(stats: &NodeStats) -> Self {
        let old = &stats.jvm.mem.pools.old;
        let old_gen_percent = if old.max_in_bytes > 0 {
            old.used_in_bytes as f64 / old.max_in_bytes as f64 * 100.0
        } else {
            0.0
        };
        Self {
            cpu_percent: stats.os.cpu.percent,
            heap_percent: stats.jvm.mem.heap_used_percent,
            old_gen_percent,
            gc_old_count: stats.jvm.gc.collectors.old.collection_count,
            gc_old_time_ms: stats.jvm.gc.collectors.old.collection_time_in_millis,
            breakers_tripped: stats.breakers.values().map(|b| b.tripped).sum(),
            rejected: stats.thread_pool.values().map(|p| p.rejected).sum(),
        }
    }
}

/// One node, with its metrics from the previous snapshot when known.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub id: String,
    pub name: String,
    pub host: String,
    pub tier: String,
    pub roles: Vec<String>,
    pub metrics: NodeMetrics,
    pub previous: Option<NodeMetrics>,
}

impl NodeRow {
    /// Old GC collections since the previous snapshot.
    pub fn gc_count_delta(&self) -> u64 {
        increase(
            self.metrics.gc_old_count,
            self.previous.as_ref().map(|p| p.gc_old_count),
        )
    }

    /// Old GC time (ms) spent since the previous snapshot.
    pub fn gc_time_delta_ms(&self) -> u64 {
        increase(
            self.metrics.gc_old_time_ms,
            self.previous.as_ref().map(|p| p.gc_old_time_ms),
        )
    }
}

/// Resolve a node's tier from its attributes, falling back to `data_*` roles.
/// Node holding a shard copy.
///
/// `_cat/shards` reports a relocating copy as `src -> ip id target`; the copy
/// still lives on the source node until relocation completes.
fn shard_node(raw: &str) -> Option<String> {
    let node = raw.split("->").next().unwrap_or_default().trim();
    (!node.is_empty()).then(|| node.to_string())
}

pub fn resolve_tier(attributes: &BTreeMap<String, String>, roles: &[String]) -> String {
    if let Some((_, value)) = attributes.iter().find(|(key, _)| key.contains("tier")) {
        return value.clone();
    }
    roles
        .iter()
        .find_map(|role| role.strip_prefix("data_"))
        .map(str::to_string)
        .unwrap_or_else(|| "undefined".to_string())
}

/// An open index present in both `_cat/indices` and `_stats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexRow {
    pub name: String,
    pub health: String,
    pub status: String,
    pub uuid: String,
    pub primaries: u64,
    pub replicas: u64,
    pub docs_count: u64,
    pub store_mb: f64,
    pub index_total: u64,
    pub query_total: u64,
    pub segment_count: u64,
    pub segments_mb: f64,
    pub query_cache_mb: f64,
    pub fielddata_mb: f64,
    /// Documents indexed per second since the previous snapshot.
    pub write_rate: f64,
    /// Queries per second since the previous snapshot.
    pub search_rate: f64,
}

impl IndexRow {
    /// Heap held by segments, query cache and fielddata (MB).
    pub fn heap_mb(&self) -> f64 {
        self.segments_mb + self.query_cache_mb + self.fielddata_mb
    }
}

/// One shard copy from `_cat/shards`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardRow {
    pub index: String,
    pub shard: u64,
    pub primary: bool,
    pub state: String,
    pub docs: u64,
    pub store_mb: f64,
    pub node: Option<String>,
}

impl ShardRow {
    pub fn is_started(&self) -> bool {
        self.state == "STARTED"
    }
}

/// Processed cluster data ready for the analyses.
#[derive(Debug, Clone)]
pub struct ClusterData {
    pub cluster_name: String,
    /// Raw status string (`green`, `yellow`, `red`, or `N/A`).
    pub status: String,
    pub health: HealthStatus,
    /// Cluster-wide heap usage from `_cluster/stats`.
    pub heap_total_percent: f64,
    pub pending_tasks: usize,
    pub initializing_shards: u64,
    pub relocating_shards: u64,
    pub unassigned_shards: u64,
    pub nodes: Vec<NodeRow>,
    pub indices: Vec<IndexRow>,
    pub shards: Vec<ShardRow>,
    /// Seconds between the two snapshots, when there are two.
    pub elapsed_secs: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    pub current: ClusterSnapshot,
    pub previous: Option<ClusterSnapshot>,
}

impl ClusterData {
    /// Build from the latest snapshot and, optionally, the one before it.
    pub fn from_snapshots(current: ClusterSnapshot, previous: Option<ClusterSnapshot>) -> Self {
        let elapsed_secs = previous
            .as_ref()
            .map(|prev| current.seconds_since(prev))
            .filter(|secs| *secs > 0.0);

        let nodes = Self::node_rows(&current, previous.as_ref());
        let indices = Self::index_rows(&current, previous.as_ref(), elapsed_secs.unwrap_or(0.0));
        let shards = Self::shard_rows(&current);

        let health = current.health.clone().unwrap_or_default();
        let status = if health.status.is_empty() {
            "N/A".to_string()
        } else {
            health.status.clone()
        };

        let heap_total_percent = current
            .stats
            .as_ref()
            .map(|s| {
                let mem = &s.nodes.jvm.mem;
                if mem.heap_max_in_bytes > 0 {
                    mem.heap_used_in_bytes as f64 / mem.heap_max_in_bytes as f64 * 100.0
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0);

        Self {
            cluster_name: current.cluster_name().to_string(),
            health: HealthStatus::from_es(&status),
            status,
            heap_total_percent,
            pending_tasks: current.pending_tasks.as_ref().map_or(0, |p| p.tasks.len()),
            initializing_shards: health.initializing_shards,
            relocating_shards: health.relocating_shards,
            unassigned_shards: health.unassigned_shards,
            nodes,
            indices,
            shards,
            elapsed_secs,
            fetched_at: current.fetched_at,
            current,
            previous,
        }
    }

    fn node_rows(current: &ClusterSnapshot, previous: Option<&ClusterSnapshot>) -> Vec<NodeRow> {
        let empty_info = NodeInfo::default();
        let mut rows: Vec<NodeRow> = current
            .nodes_stats
            .nodes
            .iter()
            .map(|(id, stats)| {
                let info = current.nodes_info.nodes.get(id).unwrap_or(&empty_info);
                let roles = if info.roles.is_empty() {
                    stats.roles.clone()
                } else {
                    info.roles.clone()
                };
                let name = if stats.name.is_empty() {
                    info.name.clone()
                } else {
                    stats.name.clone()
                };
                NodeRow {
                    id: id.clone(),
                    name,
                    host: stats.host.clone(),
                    tier: resolve_tier(&info.attributes, &roles),
                    roles,
                    metrics: NodeMetrics::from_stats(stats),
                    previous: previous
                        .and_then(|p| p.nodes_stats.nodes.get(id))
                        .map(NodeMetrics::from_stats),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    fn index_rows(
        current: &ClusterSnapshot,
        previous: Option<&ClusterSnapshot>,
        elapsed_secs: f64,
    ) -> Vec<IndexRow> {
        let (Some(cat), Some(stats)) = (&current.cat_indices, &current.indices_stats) else {
            return Vec::new();
        };
        let previous_stats = previous.and_then(|p| p.indices_stats.as_ref());

        let mut rows: Vec<IndexRow> = cat
            .iter()
            .filter(|c| c.status == "open")
            .filter_map(|c| {
                let totals = &stats.indices.get(&c.index)?.total;
                let prev = previous_stats
                    .and_then(|p| p.indices.get(&c.index))
                    .map(|s| &s.total);

                Some(IndexRow {
                    name: c.index.clone(),
                    health: c.health.clone(),
                    status: c.status.clone(),
                    uuid: c.uuid.clone(),
                    primaries: c.pri,
                    replicas: c.rep,
                    docs_count: c.docs_count,
                    store_mb: c.store_size,
                    index_total: totals.indexing.index_total,
                    query_total: totals.search.query_total,
                    segment_count: totals.segments.count,
                    segments_mb: bytes_to_mb(totals.segments.memory_in_bytes),
                    query_cache_mb: bytes_to_mb(totals.query_cache.memory_size_in_bytes),
                    fielddata_mb: bytes_to_mb(totals.fielddata.memory_size_in_bytes),
                    write_rate: per_second(
                        totals.indexing.index_total,
                        prev.map(|p| p.indexing.index_total),
                        elapsed_secs,
                    ),
                    search_rate: per_second(
                        totals.search.query_total,
                        prev.map(|p| p.search.query_total),
                        elapsed_secs,
                    ),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    fn shard_rows(current: &ClusterSnapshot) -> Vec<ShardRow> {
        current
            .cat_shards
            .iter()
            .flatten()
            .map(|s| ShardRow {
                index: s.index.clone(),
                shard: s.shard,
                primary: s.prirep == "p",
                state: s.state.clone(),
                docs: s.docs,
                store_mb: s.store,
                node: s.node.as_deref().and_then(shard_node),
            })
            .collect()
    }

    /// Whether rates are meaningful (two snapshots with index stats).
    pub fn has_rates(&self) -> bool {
        self.elapsed_secs.is_some()
            && self
                .previous
                .as_ref()
                .is_some_and(|p| p.indices_stats.is_some())
    }

    pub fn node_by_name(&self, name: &str) -> Option<&NodeRow> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexRow> {
        self.indices.iter().find(|i| i.name == name)
    }

    /// Lookup table from index name to row.
    pub fn index_map(&self) -> HashMap<&str, &IndexRow> {
        self.indices.iter().map(|i| (i.name.as_str(), i)).collect()
    }

    /// Indices with the highest write rate.
    pub fn top_writers(&self, n: usize) -> Vec<&IndexRow> {
        self.top_by(n, |i| i.write_rate)
    }

    /// Indices with the highest search rate.
    pub fn top_searchers(&self, n: usize) -> Vec<&IndexRow> {
        self.top_by(n, |i| i.search_rate)
    }

    /// Indices holding the most heap.
    pub fn top_heap_indices(&self, n: usize) -> Vec<&IndexRow> {
        self.top_by(n, IndexRow::heap_mb)
    }

    fn top_by(&self, n: usize, key: impl Fn(&IndexRow) -> f64) -> Vec<&IndexRow> {
        let mut rows: Vec<&IndexRow> = self.indices.iter().collect();
        rows.sort_by(|a, b| key(b).total_cmp(&key(a)).then_with(|| a.name.cmp(&b.name)));
        rows.truncate(n);
        rows
    }

    /// Started shard copies of each index, keyed by index name.
    pub fn started_copies(&self) -> HashMap<&str, u64> {
        let mut copies: HashMap<&str, u64> = HashMap::new();
        for shard in self.shards.iter().filter(|s| s.is_started()) {
            *copies.entry(shard.index.as_str()).or_default() += 1;
        }
        copies
    }

    /// Raw node stats of the current snapshot.
    pub fn node_stats(&self, id: &str) -> Option<&NodeStats> {
        self.current.nodes_stats.nodes.get(id)
    }

    /// Raw node stats of the previous snapshot.
    pub fn previous_node_stats(&self, id: &str) -> Option<&NodeStats> {
        self.previous.as_ref()?.nodes_stats.nodes.get(id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic snapshots shared by the analysis tests.

    use chrono::TimeZone;

    use super::*;
    use crate::source::api::*;

    pub fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_714_564_800 + secs, 0).unwrap()
    }

    pub fn node_stats(name: &str, cpu: f64, heap: f64, old_used: u64, old_max: u64) -> NodeStats {
        NodeStats {
            name: name.to_string(),
            host: format!("10.0.0.{}", name.len()),
            os: OsStats {
                cpu: CpuStats { percent: cpu },
            },
            jvm: JvmStats {
                mem: JvmMem {
                    heap_used_percent: heap,
                    pools: JvmPools {
                        old: MemoryPool {
                            used_in_bytes: old_used,
                            max_in_bytes: old_max,
                        },
                        ..JvmPools::default()
                    },
                    ..JvmMem::default()
                },
                ..JvmStats::default()
            },
            ..NodeStats::default()
        }
    }

    pub fn node_info(name: &str, roles: &[&str], tier_attr: Option<&str>) -> NodeInfo {
        NodeInfo {
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            attributes: tier_attr
                .map(|t| BTreeMap::from([("data_tier".to_string(), t.to_string())]))
                .unwrap_or_default(),
            ..NodeInfo::default()
        }
    }

    pub fn cat_index(name: &str, pri: u64, docs: u64, store_mb: f64) -> CatIndex {
        CatIndex {
            health: "green".to_string(),
            status: "open".to_string(),
            index: name.to_string(),
            uuid: format!("uuid-{}", name),
            pri,
            rep: 1,
            docs_count: docs,
            store_size: store_mb,
        }
    }

    pub fn index_stats(index_total: u64, query_total: u64, segments_bytes: u64) -> IndexStats {
        IndexStats {
            total: IndexTotals {
                indexing: IndexingStats { index_total },
                search: SearchStats { query_total },
                segments: SegmentStats {
                    count: 10,
                    memory_in_bytes: segments_bytes,
                },
                ..IndexTotals::default()
            },
        }
    }

    pub fn shard(
        index: &str,
        n: u64,
        primary: bool,
        node: Option<&str>,
        docs: u64,
        store: f64,
    ) -> CatShard {
        CatShard {
            index: index.to_string(),
            shard: n,
            prirep: if primary { "p" } else { "r" }.to_string(),
            state: if node.is_some() { "STARTED" } else { "UNASSIGNED" }.to_string(),
            docs,
            store,
            ip: node.map(|_| "10.0.0.1".to_string()),
            node: node.map(str::to_string),
        }
    }

    /// Two nodes, two indices, five shards.
    pub fn snapshot(secs: i64, logs_indexed: u64, orders_queries: u64) -> ClusterSnapshot {
        let mut s = ClusterSnapshot::new(at(secs), NodesStats::default(), NodesInfo::default());
        s.nodes_stats.nodes.insert("n1".into(), node_stats("es-hot-1", 95.0, 80.0, 800, 1000));
        s.nodes_stats.nodes.insert("n2".into(), node_stats("es-warm-1", 20.0, 40.0, 100, 1000));
        s.nodes_info
            .nodes
            .insert("n1".into(), node_info("es-hot-1", &["data_hot", "ingest"], None));
        s.nodes_info
            .nodes
            .insert("n2".into(), node_info("es-warm-1", &["data_warm"], Some("warm")));

        s.health = Some(ClusterHealth {
            cluster_name: "prod".to_string(),
            status: "yellow".to_string(),
            unassigned_shards: 1,
            ..ClusterHealth::default()
        });
        s.stats = Some(ClusterStats {
            cluster_name: "prod".to_string(),
            nodes: ClusterStatsNodes {
                jvm: ClusterStatsJvm {
                    mem: ClusterStatsJvmMem {
                        heap_used_in_bytes: 600,
                        heap_max_in_bytes: 1000,
                    },
                },
            },
        });
        s.pending_tasks = Some(PendingTasks::default());
        s.cat_indices = Some(vec![
            cat_index("logs-2024.05.01", 2, 10_000, 300.0),
            cat_index("orders", 1, 500, 20.0),
        ]);
        s.indices_stats = Some(IndicesStats {
            indices: BTreeMap::from([
                ("logs-2024.05.01".to_string(), index_stats(logs_indexed, 10, 50_000_000)),
                ("orders".to_string(), index_stats(500, orders_queries, 5_000_000)),
            ]),
        });
        s.cat_shards = Some(vec![
            shard("logs-2024.05.01", 0, true, Some("es-hot-1"), 5_000, 150.0),
            shard("logs-2024.05.01", 1, true, Some("es-hot-1"), 5_000, 150.0),
            shard("logs-2024.05.01", 0, false, Some("es-warm-1"), 5_000, 150.0),
            shard("orders", 0, true, Some("es-warm-1"), 500, 20.0),
            shard("orders", 0, false, None, 0, 0.0),
        ]);
        s
    }

    /// Data from two snapshots 5 s apart: logs indexed 1000 docs, orders ran 50 queries.
    pub fn cluster_data() -> ClusterData {
        ClusterData::from_snapshots(snapshot(5, 2_000, 150), Some(snapshot(0, 1_000, 100)))
    }
}
