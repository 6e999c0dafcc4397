//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{HealthStatus, MetricDelta, Trend};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for titles and the selected menu entry.
    pub highlight: Color,
    pub warning: Color,
    pub critical: Color,
    pub healthy: Color,
    pub border: Color,
    /// Secondary text (hints, "no data" notes).
    pub muted: Style,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the selected menu entry.
    pub selected: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            muted: Style::default().fg(Color::DarkGray),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Rgb(176, 120, 0),
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            muted: Style::default().fg(Color::Gray),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a health status
    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Style for a `green`/`yellow`/`red` cluster or index status.
    pub fn es_status_style(&self, status: &str) -> Style {
        self.status_style(HealthStatus::from_es(status))
    }

    /// Spikes are bold red, rises yellow; everything else unstyled.
    pub fn delta_style(&self, delta: &MetricDelta) -> Style {
        if delta.spike {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        } else if delta.trend == Trend::Up {
            Style::default().fg(self.warning)
        } else {
            Style::default()
        }
    }

    /// Style for a value against a warning/critical threshold pair.
    pub fn threshold_style(&self, value: f64, warning: f64, critical: f64) -> Style {
        if value > critical {
            self.status_style(HealthStatus::Critical)
        } else if value > warning {
            self.status_style(HealthStatus::Warning)
        } else {
            Style::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_style() {
        let theme = Theme::dark();
        let spike = MetricDelta::new(90.0, Some(50.0), 20.0);
        let rise = MetricDelta::new(55.0, Some(50.0), 20.0);
        let flat = MetricDelta::new(50.0, None, 20.0);

        assert_eq!(delta_fg(&theme, &spike), Some(Color::Red));
        assert_eq!(delta_fg(&theme, &rise), Some(Color::Yellow));
        assert_eq!(delta_fg(&theme, &flat), None);
    }

    fn delta_fg(theme: &Theme, delta: &MetricDelta) -> Option<Color> {
        theme.delta_style(delta).fg
    }

    #[test]
    fn test_es_status_style() {
        let theme = Theme::light();
        assert_eq!(theme.es_status_style("green").fg, Some(Color::Green));
        assert_eq!(theme.es_status_style("red").fg, Some(Color::Red));
        assert_eq!(theme.threshold_style(10.0, 75.0, 90.0), Style::default());
    }
}
