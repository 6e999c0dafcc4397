//! Index template linting.
//!
//! Each composable template is matched against the open indices (glob match on
//! its index patterns) and checked for common mistakes.

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use tracing::warn;

use crate::data::format::format_mb;
use crate::data::IndexRow;
use crate::source::api::{IndexTemplate, IndexTemplates};
use crate::source::lenient::{lookup, setting_as_str, setting_as_u64};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateFinding {
    NoLifecyclePolicy,
    HighShardCount(u64),
    GenericWildcard(String),
}

impl fmt::Display for TemplateFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateFinding::NoLifecyclePolicy => write!(f, "No ILM policy"),
            TemplateFinding::HighShardCount(n) => write!(f, "High shard count ({})", n),
            TemplateFinding::GenericWildcard(p) => write!(f, "Generic wildcard ('{}')", p),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateReport {
    pub name: String,
    pub patterns: Vec<String>,
    pub matching_indices: Vec<String>,
    pub total_docs: u64,
    pub total_size_mb: f64,
    pub findings: Vec<TemplateFinding>,
}

impl TemplateReport {
    pub fn index_count(&self) -> usize {
        self.matching_indices.len()
    }

    /// `"x.xx GB"` above 1024 MB, else `"x.x MB"`.
    pub fn size_display(&self) -> String {
        format_mb(self.total_size_mb)
    }

    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings joined for display, `OK` when there are none.
    pub fn diagnosis(&self) -> String {
        if self.findings.is_empty() {
            "OK".to_string()
        } else {
            self.findings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Settings of a template: `template.settings`, falling back to top-level `settings`.
fn setting<'a>(template: &'a IndexTemplate, key: &str) -> Option<&'a Value> {
    let short = key.strip_prefix("index.").unwrap_or(key);
    [&template.template.settings, &template.settings]
        .into_iter()
        .find_map(|settings| lookup(settings, key).or_else(|| lookup(settings, short)))
}

fn has_lifecycle_policy(template: &IndexTemplate) -> bool {
    let named = setting(template, "index.lifecycle.name")
        .and_then(setting_as_str)
        .is_some_and(|name| !name.is_empty());
    named || setting(template, "index.ilm").is_some()
}

fn glob_set(name: &str, patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(template = name, pattern, error = %e, "invalid index pattern"),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Lint one template against the open indices.
pub fn lint_template(
    name: &str,
    template: &IndexTemplate,
    indices: &[IndexRow],
    shard_threshold: u64,
) -> TemplateReport {
    let globs = glob_set(name, &template.index_patterns);
    let matching: Vec<&IndexRow> = indices.iter().filter(|i| globs.is_match(&i.name)).collect();

    let mut findings = Vec::new();
    if !has_lifecycle_policy(template) {
        findings.push(TemplateFinding::NoLifecyclePolicy);
    }
    if let Some(shards) = setting(template, "index.number_of_shards").and_then(setting_as_u64) {
        if shards > shard_threshold {
            findings.push(TemplateFinding::HighShardCount(shards));
        }
    }
    for pattern in &template.index_patterns {
        if pattern == "*" || pattern == "*-*" {
            findings.push(TemplateFinding::GenericWildcard(pattern.clone()));
        }
    }

    TemplateReport {
        name: name.to_string(),
        patterns: template.index_patterns.clone(),
        matching_indices: matching.iter().map(|i| i.name.clone()).collect(),
        total_docs: matching.iter().map(|i| i.docs_count).sum(),
        total_size_mb: matching.iter().map(|i| i.store_mb).sum(),
        findings,
    }
}

/// Lint every template, in the order the cluster returned them.
pub fn lint_templates(
    templates: &IndexTemplates,
    indices: &[IndexRow],
    shard_threshold: u64,
) -> Vec<TemplateReport> {
    templates
        .index_templates
        .iter()
        .map(|t| lint_template(&t.name, &t.index_template, indices, shard_threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cluster::fixtures::*;

    fn templates() -> IndexTemplates {
        serde_json::from_str(
            r#"{"index_templates": [
                {"name": "logs", "index_template": {
                    "index_patterns": ["logs-*"],
                    "template": {"settings": {"index": {"number_of_shards": "8"}}}
                }},
                {"name": "orders", "index_template": {
                    "index_patterns": ["orders*"],
                    "template": {"settings": {
                        "index.lifecycle.name": "orders-policy",
                        "number_of_shards": 1
                    }}
                }},
                {"name": "catch-all", "index_template": {
                    "index_patterns": "*",
                    "settings": {"index": {"lifecycle": {"name": "default"}}}
                }}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_policy_and_high_shards() {
        let data = cluster_data();
        let reports = lint_templates(&templates(), &data.indices, 5);

        let logs = &reports[0];
        assert_eq!(
            logs.findings,
            vec![
                TemplateFinding::NoLifecyclePolicy,
                TemplateFinding::HighShardCount(8)
            ]
        );
        assert_eq!(logs.matching_indices, vec!["logs-2024.05.01"]);
        assert_eq!(logs.total_docs, 10_000);
        assert_eq!(logs.size_display(), "300.0 MB");
    }

    #[test]
    fn test_clean_template() {
        let data = cluster_data();
        let reports = lint_templates(&templates(), &data.indices, 5);
        let orders = &reports[1];
        assert!(orders.is_ok());
        assert_eq!(orders.diagnosis(), "OK");
        assert_eq!(orders.index_count(), 1);
    }

    #[test]
    fn test_generic_wildcard_and_top_level_settings() {
        let data = cluster_data();
        let reports = lint_templates(&templates(), &data.indices, 5);
        let catch_all = &reports[2];
        assert_eq!(
            catch_all.findings,
            vec![TemplateFinding::GenericWildcard("*".to_string())]
        );
        assert_eq!(catch_all.index_count(), 2);
        assert_eq!(catch_all.diagnosis(), "Generic wildcard ('*')");
    }

    #[test]
    fn test_legacy_ilm_key_counts_as_policy() {
        let template: IndexTemplate = serde_json::from_str(
            r#"{"index_patterns": ["metrics-*"],
                "template": {"settings": {"index": {"ilm": {"enabled": true}}}}}"#,
        )
        .unwrap();
        let report = lint_template("metrics", &template, &[], 5);
        assert!(report.is_ok());
        assert_eq!(report.size_display(), "0.0 MB");
    }
}
