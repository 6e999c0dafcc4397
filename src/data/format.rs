//! Human-readable formatting of counts, sizes and rates.

/// Format a large count with k/M suffix.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a size given in MB, switching to GB above 1024 MB.
pub fn format_mb(mb: f64) -> String {
    if mb > 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else {
        format!("{:.1} MB", mb)
    }
}

/// Bytes to MB (decimal, as reported by the memory breakdowns).
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1_000_000.0
}

/// Bytes to MB (binary, as used by `_cat` with `bytes=mb`).
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Format a per-second rate.
pub fn format_rate(rate: f64) -> String {
    if rate >= 1000.0 {
        format!("{:.1}k/s", rate / 1000.0)
    } else {
        format!("{:.1}/s", rate)
    }
}

/// Format a ratio in [0, 1] as a percentage.
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Truncate a string to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 1 {
        "…".chars().take(max).collect()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_500), "1.5k");
        assert_eq!(format_count(2_300_000), "2.3M");
    }

    #[test]
    fn test_format_mb() {
        assert_eq!(format_mb(512.0), "512.0 MB");
        assert_eq!(format_mb(1024.0), "1024.0 MB");
        assert_eq!(format_mb(2048.0), "2.00 GB");
    }

    #[test]
    fn test_byte_conversions() {
        assert_eq!(bytes_to_mb(2_500_000), 2.5);
        assert_eq!(bytes_to_mib(3 * 1024 * 1024), 3.0);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(12.34), "12.3/s");
        assert_eq!(format_rate(2500.0), "2.5k/s");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-index-name", 8), "a-very-…");
    }
}
