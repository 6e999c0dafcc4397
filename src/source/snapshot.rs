//! A point-in-time capture of the cluster.
//!
//! A [`ClusterSnapshot`] bundles the raw API payloads fetched during one
//! refresh tick. Sections not requested by the [`FetchPlan`] (or whose request
//! failed) are `None`. Snapshots serialize to JSON so they can be archived and
//! replayed later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::api::{
    CatIndex, CatShard, ClusterHealth, ClusterSettings, ClusterStats, IndexMappings,
    IndexSettingsMap, IndexTemplates, IndicesStats, NodesInfo, NodesStats, PendingTasks, RootInfo,
    TaskList,
};

/// Which optional sections to fetch on a refresh.
///
/// Node stats and node info are always fetched; everything else is opt-in so
/// that cheap views (the node deep dive) stay cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchPlan {
    /// Cluster health, cluster stats and pending tasks.
    pub cluster: bool,
    /// Index stats and `_cat/indices`.
    pub indices: bool,
    /// `_cat/shards`.
    pub shards: bool,
    /// Running search tasks.
    pub tasks: bool,
    /// Composable index templates.
    pub templates: bool,
    /// Index mappings and field limits.
    pub mappings: bool,
    /// Cluster settings including defaults.
    pub cluster_settings: bool,
}

impl FetchPlan {
    /// Node stats and info only.
    pub fn nodes_only() -> Self {
        Self::default()
    }

    /// Everything the dashboard needs: cluster, indices and shards.
    pub fn overview() -> Self {
        Self {
            cluster: true,
            indices: true,
            shards: true,
            ..Self::default()
        }
    }

    pub fn with_tasks(mut self) -> Self {
        self.tasks = true;
        self
    }

    pub fn with_templates(mut self) -> Self {
        self.templates = true;
        self
    }

    pub fn with_mappings(mut self) -> Self {
        self.mappings = true;
        self
    }

    pub fn with_cluster_settings(mut self) -> Self {
        self.cluster_settings = true;
        self
    }

    /// Whether the resulting snapshot is complete enough to archive.
    pub fn is_overview(&self) -> bool {
        self.cluster && self.indices && self.shards
    }
}

/// Raw payloads captured in one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSnapshot {
    pub fetched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<RootInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<ClusterHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ClusterStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_tasks: Option<PendingTasks>,
    pub nodes_stats: NodesStats,
    pub nodes_info: NodesInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices_stats: Option<IndicesStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_indices: Option<Vec<CatIndex>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_shards: Option<Vec<CatShard>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<IndexTemplates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings: Option<IndexMappings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_settings: Option<IndexSettingsMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_settings: Option<ClusterSettings>,
}

impl ClusterSnapshot {
    /// Start a snapshot from the always-fetched node payloads.
    pub fn new(fetched_at: DateTime<Utc>, nodes_stats: NodesStats, nodes_info: NodesInfo) -> Self {
        Self {
            fetched_at,
            nodes_stats,
            nodes_info,
            ..Self::default()
        }
    }

    /// Best known cluster name.
    pub fn cluster_name(&self) -> &str {
        let candidates = [
            self.health.as_ref().map(|h| h.cluster_name.as_str()),
            self.stats.as_ref().map(|s| s.cluster_name.as_str()),
            self.info.as_ref().map(|i| i.cluster_name.as_str()),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or("N/A")
    }

    /// Seconds elapsed between `earlier` and this snapshot.
    pub fn seconds_since(&self, earlier: &ClusterSnapshot) -> f64 {
        (self.fetched_at - earlier.fetched_at).num_milliseconds() as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_overview_plan() {
        let plan = FetchPlan::overview();
        assert!(plan.is_overview());
        assert!(!plan.tasks);
        assert!(!FetchPlan::nodes_only().is_overview());
        assert!(FetchPlan::overview().with_tasks().tasks);
    }

    #[test]
    fn test_cluster_name_fallbacks() {
        let mut snapshot = ClusterSnapshot::default();
        assert_eq!(snapshot.cluster_name(), "N/A");

        snapshot.info = Some(RootInfo {
            cluster_name: "from-root".to_string(),
            ..RootInfo::default()
        });
        assert_eq!(snapshot.cluster_name(), "from-root");

        snapshot.health = Some(ClusterHealth {
            cluster_name: "from-health".to_string(),
            ..ClusterHealth::default()
        });
        assert_eq!(snapshot.cluster_name(), "from-health");
    }

    #[test]
    fn test_seconds_since() {
        let earlier = ClusterSnapshot {
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            ..ClusterSnapshot::default()
        };
        let later = ClusterSnapshot {
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 5).unwrap(),
            ..ClusterSnapshot::default()
        };
        assert_eq!(later.seconds_since(&earlier), 5.0);
    }

    #[test]
    fn test_snapshot_roundtrip_skips_missing_sections() {
        let snapshot = ClusterSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("cat_shards"));
        let back: ClusterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
