//! Configuration drift between transient, persistent and default cluster settings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

use crate::data::HealthStatus;
use crate::source::api::ClusterSettings;
use crate::source::lenient::setting_as_str;

/// Settings whose deviation from the default is always worth reporting.
pub const CRITICAL_KEYS: &[&str] = &[
    "cluster.routing.allocation.enable",
    "cluster.routing.rebalance.enable",
    "cluster.routing.allocation.disk.threshold_enabled",
    "cluster.routing.allocation.disk.watermark.low",
    "cluster.routing.allocation.disk.watermark.high",
    "cluster.routing.allocation.disk.watermark.flood_stage",
    "cluster.routing.allocation.cluster_concurrent_rebalance",
    "cluster.routing.allocation.node_concurrent_recoveries",
    "cluster.routing.allocation.awareness.attributes",
    "cluster.blocks.read_only",
    "cluster.blocks.read_only_allow_delete",
    "cluster.max_shards_per_node",
    "indices.breaker.total.limit",
    "indices.recovery.max_bytes_per_sec",
    "action.destructive_requires_name",
    "search.max_buckets",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    /// Set transiently: lost on a full cluster restart.
    Transient,
    /// Transient value hides a different persistent value.
    ShadowsPersistent,
    /// Effective value differs from the default.
    NonDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub key: String,
    pub kind: DriftKind,
    pub severity: HealthStatus,
    pub value: String,
    /// Persistent value for shadowed settings, default for the others.
    pub baseline: Option<String>,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let baseline = self.baseline.as_deref().unwrap_or("unset");
        match self.kind {
            DriftKind::Transient => write!(
                f,
                "'{}' = '{}' is transient and will be lost on a full restart",
                self.key, self.value
            ),
            DriftKind::ShadowsPersistent => write!(
                f,
                "'{}' = '{}' (transient) overrides persistent '{}'",
                self.key, self.value, baseline
            ),
            DriftKind::NonDefault => write!(
                f,
                "'{}' = '{}' differs from default '{}'",
                self.key, self.value, baseline
            ),
        }
    }
}

/// A value that disables allocation or blocks writes.
fn is_dangerous(key: &str, value: &str) -> bool {
    match key {
        "cluster.routing.allocation.enable" => value != "all",
        "cluster.routing.rebalance.enable" => value == "none",
        "cluster.blocks.read_only" | "cluster.blocks.read_only_allow_delete" => value == "true",
        _ => false,
    }
}

fn value_of(map: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(setting_as_str)
}

/// Detect drift, most severe first.
pub fn configuration_drift(settings: &ClusterSettings) -> Vec<Drift> {
    let mut out = Vec::new();

    for (key, value) in &settings.transient {
        let Some(value) = setting_as_str(value) else {
            continue;
        };
        let persistent = value_of(&settings.persistent, key);
        let shadows = persistent.as_ref().is_some_and(|p| *p != value);

        let (kind, baseline) = if shadows {
            (DriftKind::ShadowsPersistent, persistent)
        } else {
            (DriftKind::Transient, value_of(&settings.defaults, key))
        };
        let severity = if shadows || is_dangerous(key, &value) {
            HealthStatus::Critical
        } else {
            HealthStatus::Warning
        };
        out.push(Drift {
            key: key.clone(),
            kind,
            severity,
            value,
            baseline,
        });
    }

    let transient_keys: BTreeSet<&str> = settings.transient.keys().map(String::as_str).collect();
    for key in CRITICAL_KEYS.iter().filter(|k| !transient_keys.contains(*k)) {
        let Some(value) = value_of(&settings.persistent, key) else {
            continue;
        };
        let default = value_of(&settings.defaults, key);
        if default.as_deref() == Some(value.as_str()) {
            continue;
        }
        out.push(Drift {
            key: key.to_string(),
            kind: DriftKind::NonDefault,
            severity: if is_dangerous(key, &value) {
                HealthStatus::Critical
            } else {
                HealthStatus::Warning
            },
            value,
            baseline: default,
        });
    }

    out.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.key.cmp(&b.key)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(json: &str) -> ClusterSettings {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_clean_cluster() {
        let s = settings(
            r#"{"persistent": {"cluster.routing.allocation.enable": "all"},
                "transient": {},
                "defaults": {"cluster.routing.allocation.enable": "all"}}"#,
        );
        assert!(configuration_drift(&s).is_empty());
    }

    #[test]
    fn test_transient_setting_is_warning() {
        let s = settings(
            r#"{"transient": {"indices.recovery.max_bytes_per_sec": "200mb"},
                "defaults": {"indices.recovery.max_bytes_per_sec": "40mb"}}"#,
        );
        let drift = configuration_drift(&s);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].kind, DriftKind::Transient);
        assert_eq!(drift[0].severity, HealthStatus::Warning);
        assert_eq!(drift[0].baseline.as_deref(), Some("40mb"));
    }

    #[test]
    fn test_transient_shadowing_persistent_is_critical() {
        let s = settings(
            r#"{"persistent": {"search.max_buckets": "10000"},
                "transient": {"search.max_buckets": "65535"}}"#,
        );
        let drift = configuration_drift(&s);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].kind, DriftKind::ShadowsPersistent);
        assert_eq!(drift[0].severity, HealthStatus::Critical);
        assert!(drift[0].to_string().contains("overrides persistent '10000'"));
    }

    #[test]
    fn test_allocation_disabled_is_critical() {
        let s = settings(
            r#"{"persistent": {
                    "cluster.routing.allocation.enable": "primaries",
                    "cluster.max_shards_per_node": "3000"
                },
                "defaults": {
                    "cluster.routing.allocation.enable": "all",
                    "cluster.max_shards_per_node": "1000"
                }}"#,
        );
        let drift = configuration_drift(&s);
        let summary: Vec<(&str, HealthStatus)> =
            drift.iter().map(|d| (d.key.as_str(), d.severity)).collect();
        assert_eq!(
            summary,
            vec![
                ("cluster.routing.allocation.enable", HealthStatus::Critical),
                ("cluster.max_shards_per_node", HealthStatus::Warning),
            ]
        );
    }

    #[test]
    fn test_transient_read_only_block() {
        let s = settings(r#"{"transient": {"cluster.blocks.read_only": true}}"#);
        let drift = configuration_drift(&s);
        assert_eq!(drift[0].severity, HealthStatus::Critical);
        assert_eq!(drift[0].value, "true");
    }
}
