// tiledash-panels/src/common/colors.rs
use ratatui::style::Color;

/// Threshold constants for usage-based coloring
pub const LOW_THRESHOLD: f64 = 60.0;
pub const HIGH_THRESHOLD: f64 = 80.0;

/// Get color based on usage percentage
///
/// # Returns
/// Color based on thresholds:
/// - Green: < 60%
/// - Yellow: 60% - 80%
/// - Red: >= 80%
pub fn usage_color(percentage: f64) -> Color {
    if percentage < LOW_THRESHOLD {
        Color::Green
    } else if percentage < HIGH_THRESHOLD {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Colour for a log level name as written in the log file
pub fn level_color(level: &str) -> Color {
    match level.to_lowercase().as_str() {
        "debug" | "trace" => Color::Blue,
        "info" => Color::Green,
        "warn" | "warning" => Color::Rgb(255, 165, 0),
        "error" => Color::Red,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_color() {
        assert_eq!(usage_color(0.0), Color::Green);
        assert_eq!(usage_color(59.9), Color::Green);
        assert_eq!(usage_color(60.0), Color::Yellow);
        assert_eq!(usage_color(79.9), Color::Yellow);
        assert_eq!(usage_color(80.0), Color::Red);
        assert_eq!(usage_color(100.0), Color::Red);
    }

    #[test]
    fn test_level_color() {
        assert_eq!(level_color("INFO"), Color::Green);
        assert_eq!(level_color("warning"), level_color("WARN"));
        assert_eq!(level_color("ERROR"), Color::Red);
        assert_eq!(level_color("chatter"), Color::White);
    }
}
