//! Actionable suggestions derived from node and cluster health.

use std::fmt;

use crate::config::Thresholds;
use crate::data::{ClusterData, HealthStatus};

/// What a suggestion is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    OldGenPressure,
    HighCpu,
    ExcessiveGc,
    Rejections,
    BreakerTripped,
    UnassignedShards,
}

impl SuggestionKind {
    pub fn icon(&self) -> &'static str {
        match self {
            SuggestionKind::OldGenPressure => "🚨",
            SuggestionKind::HighCpu => "🔥",
            SuggestionKind::ExcessiveGc => "🗑️",
            SuggestionKind::Rejections => "🚦",
            SuggestionKind::BreakerTripped => "🛑",
            SuggestionKind::UnassignedShards => "💔",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub severity: HealthStatus,
    /// Node the suggestion refers to; `None` for cluster-wide issues.
    pub node: Option<String>,
    pub message: String,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.icon(), self.message)
    }
}

/// Evaluate every node (and the cluster) against the thresholds.
pub fn suggestions(data: &ClusterData, thresholds: &Thresholds) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let top_heap = data.top_heap_indices(1).into_iter().next();
    let top_writer = data
        .top_writers(1)
        .into_iter()
        .next()
        .filter(|w| w.write_rate > 0.0);

    for node in &data.nodes {
        let m = &node.metrics;
        let mut push = |kind, severity, message: String| {
            out.push(Suggestion {
                kind,
                severity,
                node: Some(node.name.clone()),
                message,
            })
        };

        if m.old_gen_percent > thresholds.heap_old_gen_percent {
            let mut message = format!(
                "High old-gen heap on '{}' ({:.0}%): risk of long GC pauses.",
                node.name, m.old_gen_percent
            );
            if let Some(index) = top_heap {
                message.push_str(&format!(
                    " Index '{}' holds the most heap ({:.1} MB).",
                    index.name,
                    index.heap_mb()
                ));
            }
            push(SuggestionKind::OldGenPressure, HealthStatus::Warning, message);
        }

        if m.cpu_percent > thresholds.cpu_percent {
            push(
                SuggestionKind::HighCpu,
                HealthStatus::Warning,
                format!(
                    "High CPU on '{}' ({:.0}%): check expensive queries or ingest spikes.",
                    node.name, m.cpu_percent
                ),
            );
        }

        let gc_time = node.gc_time_delta_ms();
        if gc_time > thresholds.gc_time_ms {
            push(
                SuggestionKind::ExcessiveGc,
                HealthStatus::Warning,
                format!(
                    "Excessive GC on '{}': {} ms of old-gen collection since the last refresh.",
                    node.name, gc_time
                ),
            );
        }

        if m.rejected > thresholds.rejections {
            let mut message = format!(
                "Rejections on '{}' ({} total): the node cannot keep up with the load.",
                node.name, m.rejected
            );
            if let Some(writer) = top_writer {
                message.push_str(&format!(
                    " The write rate of '{}' ({:.1} docs/s) may be the cause.",
                    writer.name, writer.write_rate
                ));
            }
            push(SuggestionKind::Rejections, HealthStatus::Warning, message);
        }

        if m.breakers_tripped > 0 {
            push(
                SuggestionKind::BreakerTripped,
                HealthStatus::Critical,
                format!(
                    "Circuit breaker tripped on '{}' ({} times). Critical.",
                    node.name, m.breakers_tripped
                ),
            );
        }
    }

    if data.unassigned_shards > 0 {
        out.push(Suggestion {
            kind: SuggestionKind::UnassignedShards,
            severity: if data.health == HealthStatus::Critical {
                HealthStatus::Critical
            } else {
                HealthStatus::Warning
            },
            node: None,
            message: format!(
                "{} unassigned shards: use `_cluster/allocation/explain`.",
                data.unassigned_shards
            ),
        });
    }

    out
}
