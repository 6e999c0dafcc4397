//! Causality chains for nodes under memory pressure.
//!
//! For every node whose old generation is above the threshold the chain reads
//! memory pressure, then garbage collection, then back-pressure (rejections and
//! tripped breakers), then the heavy indices that live on the node.

use std::fmt;

use crate::config::Thresholds;
use crate::data::ClusterData;

/// Heavy indices considered for the last link.
const TOP_HEAP_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum CausalStep {
    MemoryPressure {
        old_gen_percent: f64,
        heap_percent: f64,
    },
    GarbageCollection {
        collections: u64,
        time_ms: u64,
        /// False when there is no previous snapshot to diff against.
        measured: bool,
    },
    BackPressure {
        rejected: u64,
        breakers_tripped: u64,
    },
    ShardLoad {
        /// Index name and heap held (MB).
        indices: Vec<(String, f64)>,
    },
}

impl fmt::Display for CausalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CausalStep::MemoryPressure {
                old_gen_percent,
                heap_percent,
            } => write!(
                f,
                "Memory pressure: old gen at {:.1}% (heap {:.0}%)",
                old_gen_percent, heap_percent
            ),
            CausalStep::GarbageCollection { measured: false, .. } => {
                write!(f, "GC: no previous sample yet")
            }
            CausalStep::GarbageCollection {
                collections,
                time_ms,
                ..
            } => write!(
                f,
                "GC: {} old collections, {} ms paused since last refresh",
                collections, time_ms
            ),
            CausalStep::BackPressure {
                rejected: 0,
                breakers_tripped: 0,
            } => write!(f, "Back-pressure: no rejections or tripped breakers"),
            CausalStep::BackPressure {
                rejected,
                breakers_tripped,
            } => write!(
                f,
                "Back-pressure: {} rejected operations, {} breaker trips",
                rejected, breakers_tripped
            ),
            CausalStep::ShardLoad { indices } if indices.is_empty() => {
                write!(f, "Shard load: no top heap index has shards here")
            }
            CausalStep::ShardLoad { indices } => {
                let list: Vec<String> = indices
                    .iter()
                    .map(|(name, mb)| format!("{} ({:.1} MB)", name, mb))
                    .collect();
                write!(f, "Shard load: {}", list.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CausalityChain {
    pub node: String,
    pub steps: Vec<CausalStep>,
}

impl CausalityChain {
    /// Steps rendered as ordered lines.
    pub fn lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let arrow = if i == 0 { "" } else { "→ " };
                format!("{}{}", arrow, step)
            })
            .collect()
    }
}

pub fn causality_chains(data: &ClusterData, thresholds: &Thresholds) -> Vec<CausalityChain> {
    let top_heap = data.top_heap_indices(TOP_HEAP_CANDIDATES);

    data.nodes
        .iter()
        .filter(|n| n.metrics.old_gen_percent > thresholds.heap_old_gen_percent)
        .map(|node| {
            let on_node: Vec<(String, f64)> = top_heap
                .iter()
                .filter(|index| {
                    data.shards.iter().any(|s| {
                        s.index == index.name && s.node.as_deref() == Some(node.name.as_str())
                    })
                })
                .map(|index| (index.name.clone(), index.heap_mb()))
                .collect();

            CausalityChain {
                node: node.name.clone(),
                steps: vec![
                    CausalStep::MemoryPressure {
                        old_gen_percent: node.metrics.old_gen_percent,
                        heap_percent: node.metrics.heap_percent,
                    },
                    CausalStep::GarbageCollection {
                        collections: node.gc_count_delta(),
                        time_ms: node.gc_time_delta_ms(),
                        measured: node.previous.is_some(),
                    },
                    CausalStep::BackPressure {
                        rejected: node.metrics.rejected,
                        breakers_tripped: node.metrics.breakers_tripped,
                    },
                    CausalStep::ShardLoad { indices: on_node },
                ],
            }
        })
        .collect()
}
