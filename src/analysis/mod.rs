//! Diagnostics computed from [`ClusterData`](crate::data::ClusterData).
//!
//! Every analysis is a pure, single-pass function over already-fetched data.
//! Views and the Markdown report only render what these functions return.

pub mod causality;
pub mod dashboard;
pub mod deep_dive;
pub mod distribution;
pub mod drift;
pub mod dusty;
pub mod imbalance;
pub mod mapping;
pub mod node_load;
pub mod slow_tasks;
pub mod suggestions;
pub mod templates;
pub mod toxicity;

pub use causality::{causality_chains, CausalStep, CausalityChain};
pub use dashboard::{dashboard, Dashboard, DashboardHeader, HeapRanking, NodeHealthRow, RankedIndex};
pub use deep_dive::{deep_dive, BreakerRow, NodeDeepDive, ThreadPoolRow};
pub use distribution::{distribution, GroupBy, ShardGroup, SortKey};
pub use drift::{configuration_drift, Drift, DriftKind};
pub use dusty::{dusty_shards, DustyReport};
pub use imbalance::{imbalance, NodeShardCount, PatternImbalance};
pub use mapping::{mapping_risks, MappingRisk};
pub use node_load::{node_load, NodeLoad};
pub use slow_tasks::{slow_tasks, SlowTask};
pub use suggestions::{suggestions, Suggestion, SuggestionKind};
pub use templates::{lint_templates, TemplateFinding, TemplateReport};
pub use toxicity::{extract_tenant, shard_toxicity, ToxicTask, ToxicityReport};
