//! Tolerant deserializers for Elasticsearch payloads.
//!
//! The `_cat` APIs return numbers as strings (`"docs.count": "1234"`) and
//! `null` for unassigned shards, while a few stats report `-1` for "unbounded".
//! These helpers map all of those to plain numbers instead of failing the
//! whole response.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Any number or numeric string; negatives, `null` and garbage become 0.
pub fn u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).filter(|v| *v > 0.0).map(|v| v as u64).unwrap_or(0))
}

/// Any number or numeric string; `null` and garbage become 0.0.
pub fn f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// A single string or a list of strings.
pub fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

/// Interpret a settings value (`"3"`, `3`, `["3"]`) as an unsigned integer.
pub fn setting_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Array(items) => items.first().and_then(setting_as_u64),
        other => value_to_f64(other).filter(|v| *v >= 0.0).map(|v| v as u64),
    }
}

/// Interpret a settings value as a string.
pub fn setting_as_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(setting_as_str).collect();
            Some(parts.join(","))
        }
        _ => None,
    }
}

/// Look up a dotted setting key in a settings object.
///
/// Elasticsearch accepts both nested (`{"index": {"lifecycle": {"name": ..}}}`)
/// and flat (`{"index.lifecycle.name": ..}`) forms, and any mix of the two.
pub fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    if let Some(found) = object.get(key) {
        return Some(found);
    }
    key.match_indices('.').find_map(|(i, _)| {
        object
            .get(&key[..i])
            .and_then(|inner| lookup(inner, &key[i + 1..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::u64")]
        count: u64,
        #[serde(default, deserialize_with = "super::f64")]
        size: f64,
        #[serde(default, deserialize_with = "super::string_or_vec")]
        patterns: Vec<String>,
    }

    #[test]
    fn test_cat_style_strings() {
        let row: Row =
            serde_json::from_str(r#"{"count": "1234", "size": "12.5", "patterns": "a-*,b-*"}"#)
                .unwrap();
        assert_eq!(row.count, 1234);
        assert_eq!(row.size, 12.5);
        assert_eq!(row.patterns, vec!["a-*", "b-*"]);
    }

    #[test]
    fn test_null_and_negative() {
        let row: Row = serde_json::from_str(r#"{"count": -1, "size": null}"#).unwrap();
        assert_eq!(row.count, 0);
        assert_eq!(row.size, 0.0);
        assert!(row.patterns.is_empty());
    }

    #[test]
    fn test_settings_values() {
        assert_eq!(setting_as_u64(&serde_json::json!("3")), Some(3));
        assert_eq!(setting_as_u64(&serde_json::json!(["7"])), Some(7));
        assert_eq!(setting_as_u64(&serde_json::json!("many")), None);
        assert_eq!(setting_as_str(&serde_json::json!(["a", "b"])).as_deref(), Some("a,b"));
    }

    #[test]
    fn test_lookup_nested_flat_and_mixed() {
        let nested = serde_json::json!({"index": {"lifecycle": {"name": "hot-warm"}}});
        let flat = serde_json::json!({"index.lifecycle.name": "hot-warm"});
        let mixed = serde_json::json!({"index": {"lifecycle.name": "hot-warm"}});

        for settings in [&nested, &flat, &mixed] {
            assert_eq!(
                lookup(settings, "index.lifecycle.name"),
                Some(&serde_json::json!("hot-warm"))
            );
        }
        assert!(lookup(&nested, "index.number_of_shards").is_none());
        assert!(lookup(&serde_json::Value::Null, "index").is_none());
    }
}
