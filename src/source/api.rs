//! Typed mirrors of the Elasticsearch API responses es-doctor reads.
//!
//! Only the fields the diagnostics use are modelled. Every struct is
//! `#[serde(default)]` so a node or index missing a section (older versions,
//! filtered responses) degrades to zeros instead of failing the refresh.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// `GET /`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootInfo {
    pub name: String,
    pub cluster_name: String,
    pub version: VersionInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    pub number: String,
}

/// `GET _cluster/health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub number_of_nodes: u64,
    pub number_of_data_nodes: u64,
    pub active_primary_shards: u64,
    pub active_shards: u64,
    pub relocating_shards: u64,
    pub initializing_shards: u64,
    pub unassigned_shards: u64,
}

/// `GET _cluster/stats` (heap totals only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStats {
    pub cluster_name: String,
    pub nodes: ClusterStatsNodes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStatsNodes {
    pub jvm: ClusterStatsJvm,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStatsJvm {
    pub mem: ClusterStatsJvmMem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStatsJvmMem {
    #[serde(deserialize_with = "lenient::u64")]
    pub heap_used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub heap_max_in_bytes: u64,
}

/// `GET _cluster/pending_tasks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingTasks {
    pub tasks: Vec<PendingTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingTask {
    pub insert_order: u64,
    pub priority: String,
    pub source: String,
    pub time_in_queue_millis: u64,
}

/// `GET _nodes/stats/jvm,os,thread_pool,breaker`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesStats {
    pub nodes: BTreeMap<String, NodeStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStats {
    pub name: String,
    pub host: String,
    pub roles: Vec<String>,
    pub os: OsStats,
    pub jvm: JvmStats,
    pub thread_pool: BTreeMap<String, ThreadPoolStats>,
    #[serde(alias = "breaker")]
    pub breakers: BTreeMap<String, BreakerStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsStats {
    pub cpu: CpuStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuStats {
    #[serde(deserialize_with = "lenient::f64")]
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JvmStats {
    pub mem: JvmMem,
    pub gc: GcStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JvmMem {
    #[serde(deserialize_with = "lenient::f64")]
    pub heap_used_percent: f64,
    #[serde(deserialize_with = "lenient::u64")]
    pub heap_used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub heap_max_in_bytes: u64,
    pub pools: JvmPools,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JvmPools {
    pub young: MemoryPool,
    pub old: MemoryPool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryPool {
    #[serde(deserialize_with = "lenient::u64")]
    pub used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub max_in_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcStats {
    pub collectors: GcCollectors,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcCollectors {
    pub young: GcCollector,
    pub old: GcCollector,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcCollector {
    pub collection_count: u64,
    pub collection_time_in_millis: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPoolStats {
    pub threads: u64,
    pub queue: u64,
    pub active: u64,
    pub rejected: u64,
    pub largest: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerStats {
    #[serde(deserialize_with = "lenient::u64")]
    pub limit_size_in_bytes: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub estimated_size_in_bytes: u64,
    #[serde(deserialize_with = "lenient::f64")]
    pub overhead: f64,
    pub tripped: u64,
}

/// `GET _nodes/_all/info/name,roles,attributes`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesInfo {
    pub nodes: BTreeMap<String, NodeInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub name: String,
    pub host: String,
    pub roles: Vec<String>,
    pub attributes: BTreeMap<String, String>,
}

/// `GET _stats/indexing,search,segments,query_cache,fielddata`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicesStats {
    pub indices: BTreeMap<String, IndexStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexStats {
    pub total: IndexTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexTotals {
    pub indexing: IndexingStats,
    pub search: SearchStats,
    pub segments: SegmentStats,
    pub query_cache: CacheStats,
    pub fielddata: CacheStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingStats {
    pub index_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchStats {
    pub query_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentStats {
    pub count: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub memory_in_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheStats {
    #[serde(deserialize_with = "lenient::u64")]
    pub memory_size_in_bytes: u64,
}

/// One row of `GET _cat/indices?format=json&bytes=mb`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatIndex {
    pub health: String,
    pub status: String,
    pub index: String,
    pub uuid: String,
    #[serde(deserialize_with = "lenient::u64")]
    pub pri: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub rep: u64,
    #[serde(rename = "docs.count", deserialize_with = "lenient::u64")]
    pub docs_count: u64,
    /// Store size in MB (requested with `bytes=mb`).
    #[serde(rename = "store.size", deserialize_with = "lenient::f64")]
    pub store_size: f64,
}

/// One row of `GET _cat/shards?format=json&bytes=mb`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatShard {
    pub index: String,
    #[serde(deserialize_with = "lenient::u64")]
    pub shard: u64,
    /// `p` for primaries, `r` for replicas.
    pub prirep: String,
    pub state: String,
    #[serde(deserialize_with = "lenient::u64")]
    pub docs: u64,
    /// Store size in MB.
    #[serde(deserialize_with = "lenient::f64")]
    pub store: f64,
    pub ip: Option<String>,
    pub node: Option<String>,
}

/// `GET _tasks?actions=*search*&detailed=true`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskList {
    pub nodes: BTreeMap<String, TaskNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskNode {
    pub name: String,
    pub tasks: BTreeMap<String, TaskInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskInfo {
    pub node: String,
    pub id: u64,
    pub action: String,
    pub description: String,
    pub start_time_in_millis: u64,
    pub running_time_in_nanos: u64,
    pub cancellable: bool,
    pub parent_task_id: Option<String>,
}

/// `GET _index_template`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexTemplates {
    pub index_templates: Vec<NamedIndexTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedIndexTemplate {
    pub name: String,
    pub index_template: IndexTemplate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexTemplate {
    #[serde(deserialize_with = "lenient::string_or_vec")]
    pub index_patterns: Vec<String>,
    pub template: TemplateBody,
    pub composed_of: Vec<String>,
    pub priority: Option<i64>,
    /// Some clients put settings at the top level; checked as a fallback.
    pub settings: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateBody {
    pub settings: Value,
    pub mappings: Value,
}

/// `GET _mapping`: index name to its mapping.
pub type IndexMappings = BTreeMap<String, IndexMapping>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexMapping {
    pub mappings: Value,
}

/// `GET _all/_settings/index.mapping.total_fields.limit?include_defaults&flat_settings`
pub type IndexSettingsMap = BTreeMap<String, IndexSettingsEntry>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettingsEntry {
    pub settings: BTreeMap<String, Value>,
    pub defaults: BTreeMap<String, Value>,
}

/// `GET _cluster/settings?include_defaults=true&flat_settings=true`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    pub persistent: BTreeMap<String, Value>,
    pub transient: BTreeMap<String, Value>,
    pub defaults: BTreeMap<String, Value>,
}
