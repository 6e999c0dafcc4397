//! Index name normalization.

use std::sync::OnceLock;

use regex::Regex;

fn date_or_rollover() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:[-._]?\d{4}[-.]\d{2}[-.]\d{2}|-\d{6})\b").expect("static regex")
    })
}

fn repeated_wildcards() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:-\*)+").expect("static regex"))
}

/// Collapse date stamps and rollover counters into a wildcard.
///
/// ```
/// use es_doctor::data::index_pattern;
///
/// assert_eq!(index_pattern("logs-2024.01.31"), "logs-*");
/// assert_eq!(index_pattern("logs-000012"), "logs-*");
/// assert_eq!(index_pattern("orders"), "orders");
/// ```
pub fn index_pattern(index: &str) -> String {
    let replaced = date_or_rollover().replace_all(index, "-*");
    let collapsed = repeated_wildcards().replace_all(&replaced, "-*");
    match collapsed.strip_prefix("-*") {
        Some(rest) => format!("*{}", rest),
        None => collapsed.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates() {
        assert_eq!(index_pattern("logs-2024.01.31"), "logs-*");
        assert_eq!(index_pattern("metrics-2024-01-31"), "metrics-*");
        assert_eq!(index_pattern("audit_2024.01.31"), "audit-*");
    }

    #[test]
    fn test_rollover_suffix() {
        assert_eq!(index_pattern("logs-000012"), "logs-*");
        assert_eq!(index_pattern(".ds-logs-app-2024.05.01-000003"), ".ds-logs-app-*");
    }

    #[test]
    fn test_leaves_other_numbers() {
        assert_eq!(index_pattern("orders"), "orders");
        assert_eq!(index_pattern("shop-v2"), "shop-v2");
        assert_eq!(index_pattern("logs-1234567"), "logs-1234567");
    }

    #[test]
    fn test_bare_date() {
        assert_eq!(index_pattern("2024.01.31"), "*");
    }
}
