//! Per-second rates from cumulative counters.

/// Rate of a monotonically increasing counter between two samples.
///
/// A missing previous sample, a non-positive interval or a counter that went
/// backwards (node restart, index recreated) all yield 0.
pub fn per_second(current: u64, previous: Option<u64>, elapsed_secs: f64) -> f64 {
    match previous {
        Some(prev) if elapsed_secs > 0.0 => current.saturating_sub(prev) as f64 / elapsed_secs,
        _ => 0.0,
    }
}

/// Counter growth between two samples, 0 when unknown or reset.
pub fn increase(current: u64, previous: Option<u64>) -> u64 {
    previous.map(|prev| current.saturating_sub(prev)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_per_second() {
        assert_eq!(per_second(1500, Some(1000), 5.0), 100.0);
    }

    #[test]
    fn test_counter_reset_clamps_to_zero() {
        assert_eq!(per_second(10, Some(1000), 5.0), 0.0);
        assert_eq!(increase(10, Some(1000)), 0);
    }

    #[test]
    fn test_missing_previous() {
        assert_eq!(per_second(1500, None, 5.0), 0.0);
        assert_eq!(increase(1500, None), 0);
    }

    #[test]
    fn test_zero_elapsed() {
        assert_eq!(per_second(1500, Some(1000), 0.0), 0.0);
        assert_eq!(per_second(1500, Some(1000), -2.0), 0.0);
    }
}
