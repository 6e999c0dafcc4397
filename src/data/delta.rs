//! Change of a metric between two refreshes.

/// Direction of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }
}

/// A metric value together with its previous reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDelta {
    pub current: f64,
    pub previous: Option<f64>,
    pub trend: Trend,
    /// The change exceeded the spike threshold.
    pub spike: bool,
}

impl MetricDelta {
    pub fn new(current: f64, previous: Option<f64>, spike_threshold: f64) -> Self {
        let (trend, spike) = match previous {
            Some(prev) => {
                let diff = current - prev;
                let trend = if diff > 0.0 {
                    Trend::Up
                } else if diff < 0.0 {
                    Trend::Down
                } else {
                    Trend::Flat
                };
                (trend, diff.abs() > spike_threshold)
            }
            None => (Trend::Flat, false),
        };
        Self {
            current,
            previous,
            trend,
            spike,
        }
    }

    /// Signed change, 0 without a previous reading.
    pub fn change(&self) -> f64 {
        self.previous.map(|prev| self.current - prev).unwrap_or(0.0)
    }

    /// `"72.0 ↑"` style rendering with the given precision.
    pub fn display(&self, precision: usize) -> String {
        format!("{:.*} {}", precision, self.current, self.trend.arrow())
    }
}
