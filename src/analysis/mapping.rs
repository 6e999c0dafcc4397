//! Mapping explosion risk: mapped field count against the field limit.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::Thresholds;
use crate::data::HealthStatus;
use crate::source::api::{IndexMappings, IndexSettingsMap};
use crate::source::lenient::{lookup, setting_as_u64};

/// Elasticsearch's default `index.mapping.total_fields.limit`.
pub const DEFAULT_FIELD_LIMIT: u64 = 1000;

const FIELD_LIMIT_KEY: &str = "index.mapping.total_fields.limit";

#[derive(Debug, Clone, PartialEq)]
pub struct MappingRisk {
    pub index: String,
    pub field_count: u64,
    pub limit: u64,
    pub ratio: f64,
    pub severity: HealthStatus,
}

impl MappingRisk {
    pub fn diagnosis(&self) -> String {
        match self.severity {
            HealthStatus::Critical => format!(
                "RISK: {:.0}% of the {} field limit",
                self.ratio * 100.0,
                self.limit
            ),
            _ => format!("Warning: {:.0}% of the {} field limit", self.ratio * 100.0, self.limit),
        }
    }
}

fn count_properties(properties: &Map<String, Value>) -> u64 {
    properties
        .values()
        .map(|field| {
            let nested = field
                .get("properties")
                .and_then(Value::as_object)
                .map(count_properties)
                .unwrap_or(0);
            let multi = field
                .get("fields")
                .and_then(Value::as_object)
                .map(|f| f.len() as u64)
                .unwrap_or(0);
            1 + nested + multi
        })
        .sum()
}

/// Count mapped fields: every property (objects included) plus multi-fields.
///
/// Accepts both typeless mappings and the pre-7.x `{"<type>": {...}}` form.
pub fn count_fields(mappings: &Value) -> u64 {
    if let Some(properties) = mappings.get("properties").and_then(Value::as_object) {
        return count_properties(properties);
    }
    mappings
        .as_object()
        .map(|types| {
            types
                .values()
                .filter_map(|t| t.get("properties").and_then(Value::as_object))
                .map(count_properties)
                .sum()
        })
        .unwrap_or(0)
}

fn field_limit(index: &str, settings: Option<&IndexSettingsMap>) -> u64 {
    let Some(entry) = settings.and_then(|s| s.get(index)) else {
        return DEFAULT_FIELD_LIMIT;
    };
    [&entry.settings, &entry.defaults]
        .into_iter()
        .find_map(|map| setting_in(map, FIELD_LIMIT_KEY))
        .and_then(setting_as_u64)
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_FIELD_LIMIT)
}

fn setting_in<'a>(map: &'a BTreeMap<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        key.match_indices('.')
            .find_map(|(i, _)| map.get(&key[..i]).and_then(|v| lookup(v, &key[i + 1..])))
    })
}

/// Indices at or above the warning ratio, largest field count first.
pub fn mapping_risks(
    mappings: &IndexMappings,
    settings: Option<&IndexSettingsMap>,
    thresholds: &Thresholds,
) -> Vec<MappingRisk> {
    let mut out: Vec<MappingRisk> = mappings
        .iter()
        .filter(|(index, _)| !index.starts_with('.'))
        .filter_map(|(index, mapping)| {
            let field_count = count_fields(&mapping.mappings);
            let limit = field_limit(index, settings);
            let ratio = field_count as f64 / limit as f64;
            let severity = if ratio >= thresholds.mapping_risk_ratio {
                HealthStatus::Critical
            } else if ratio >= thresholds.mapping_warn_ratio {
                HealthStatus::Warning
            } else {
                return None;
            };
            Some(MappingRisk {
                index: index.clone(),
                field_count,
                limit,
                ratio,
                severity,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.field_count
            .cmp(&a.field_count)
            .then_with(|| a.index.cmp(&b.index))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::api::{IndexMapping, IndexSettingsEntry};
    use serde_json::json;

    fn flat_mapping(n: usize) -> Value {
        let properties: Map<String, Value> = (0..n)
            .map(|i| (format!("f{}", i), json!({"type": "keyword"})))
            .collect();
        json!({ "properties": properties })
    }

    #[test]
    fn test_count_fields_nested_and_multi_fields() {
        let mapping = json!({
            "properties": {
                "message": {"type": "text", "fields": {"raw": {"type": "keyword"}}},
                "user": {"properties": {
                    "id": {"type": "keyword"},
                    "geo": {"properties": {"lat": {"type": "float"}, "lon": {"type": "float"}}}
                }}
            }
        });
        // message, message.raw, user, user.id, user.geo, lat, lon
        assert_eq!(count_fields(&mapping), 7);
    }

    #[test]
    fn test_count_fields_typed_mapping() {
        let mapping = json!({
            "_doc": {"properties": {"a": {"type": "long"}, "b": {"type": "long"}}}
        });
        assert_eq!(count_fields(&mapping), 2);
        assert_eq!(count_fields(&Value::Null), 0);
    }

    #[test]
    fn test_risk_levels() {
        let mappings: IndexMappings = BTreeMap::from([
            ("big".to_string(), IndexMapping { mappings: flat_mapping(950) }),
            ("medium".to_string(), IndexMapping { mappings: flat_mapping(80) }),
            ("small".to_string(), IndexMapping { mappings: flat_mapping(10) }),
            (".hidden".to_string(), IndexMapping { mappings: flat_mapping(999) }),
        ]);
        let settings: IndexSettingsMap = BTreeMap::from([(
            "medium".to_string(),
            IndexSettingsEntry {
                settings: BTreeMap::from([(FIELD_LIMIT_KEY.to_string(), json!("100"))]),
                ..IndexSettingsEntry::default()
            },
        )]);

        let risks = mapping_risks(&mappings, Some(&settings), &Thresholds::default());
        let summary: Vec<(&str, u64, HealthStatus)> = risks
            .iter()
            .map(|r| (r.index.as_str(), r.limit, r.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("big", 1000, HealthStatus::Critical),
                ("medium", 100, HealthStatus::Warning),
            ]
        );
        assert!(risks[0].diagnosis().starts_with("RISK"));
    }

    #[test]
    fn test_limit_from_defaults() {
        let settings: IndexSettingsMap = BTreeMap::from([(
            "logs".to_string(),
            IndexSettingsEntry {
                defaults: BTreeMap::from([(
                    "index".to_string(),
                    json!({"mapping": {"total_fields": {"limit": "2000"}}}),
                )]),
                ..IndexSettingsEntry::default()
            },
        )]);
        assert_eq!(field_limit("logs", Some(&settings)), 2000);
        assert_eq!(field_limit("other", Some(&settings)), DEFAULT_FIELD_LIMIT);
        assert_eq!(field_limit("logs", None), DEFAULT_FIELD_LIMIT);
    }
}
