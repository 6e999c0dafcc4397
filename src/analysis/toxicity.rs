//! Shard toxicity: which tenants drive the search load on hot nodes.

use std::sync::OnceLock;

use regex::Regex;

use super::slow_tasks::running_minutes;
use crate::data::{index_pattern, ClusterData};
use crate::source::api::TaskList;

fn tenant_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Key with an optional subfield (`tenant_id.keyword`), then a bare
        // value, a `{"value": ..}` / `{"query": ..}` wrapper or a terms list.
        Regex::new(concat!(
            r#"(?i)\b(?:tenant_id|customer_id|org_id|tenant)(?:\.[A-Za-z_]+)*"?\s*[:=]\s*"#,
            r#"(?:\{\s*"(?:value|query)"\s*:\s*)?(?:\[\s*)?"?([A-Za-z0-9_.\-]+)"#,
        ))
        .expect("static regex")
    })
}

fn indices_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"indices\[([^,\]]+)").expect("static regex"))
}

/// Best-effort tenant of a search task.
///
/// Looks for a tenant-like term in the query, then falls back to the first
/// target index with its date or rollover suffix collapsed.
pub fn extract_tenant(description: &str) -> String {
    if let Some(tenant) = tenant_pattern()
        .captures(description)
        .and_then(|c| c.get(1))
    {
        return tenant.as_str().to_string();
    }
    indices_pattern()
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|index| !index.is_empty())
        .map(index_pattern)
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToxicTask {
    pub node: String,
    pub cpu_percent: f64,
    pub tenant: String,
    pub running_secs: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToxicityReport {
    pub hot_nodes: Vec<String>,
    pub tasks: Vec<ToxicTask>,
    /// Why `tasks` is empty, when it is.
    pub message: Option<String>,
}

/// Attribute the search tasks running on hot nodes to tenants.
pub fn shard_toxicity(
    data: &ClusterData,
    tasks: Option<&TaskList>,
    cpu_threshold: f64,
) -> ToxicityReport {
    let hot: Vec<_> = data
        .nodes
        .iter()
        .filter(|n| n.metrics.cpu_percent > cpu_threshold)
        .collect();
    let hot_nodes: Vec<String> = hot.iter().map(|n| n.name.clone()).collect();

    if hot.is_empty() {
        return ToxicityReport {
            hot_nodes,
            tasks: Vec::new(),
            message: Some(format!("No nodes above {:.0}% CPU.", cpu_threshold)),
        };
    }
    let Some(task_list) = tasks else {
        return ToxicityReport {
            hot_nodes,
            tasks: Vec::new(),
            message: Some("Task list unavailable.".to_string()),
        };
    };

    let mut found: Vec<ToxicTask> = hot
        .iter()
        .flat_map(|node| {
            task_list
                .nodes
                .iter()
                .filter(move |(id, tn)| *id == &node.id || tn.name == node.name)
                .flat_map(|(_, tn)| tn.tasks.values())
                .map(move |task| ToxicTask {
                    node: node.name.clone(),
                    cpu_percent: node.metrics.cpu_percent,
                    tenant: extract_tenant(&task.description),
                    running_secs: running_minutes(task.running_time_in_nanos) * 60.0,
                    description: task.description.clone(),
                })
        })
        .collect();
    found.sort_by(|a, b| b.running_secs.total_cmp(&a.running_secs));

    let message = found
        .is_empty()
        .then(|| "No search tasks running on hot nodes.".to_string());
    ToxicityReport {
        hot_nodes,
        tasks: found,
        message,
    }
}
