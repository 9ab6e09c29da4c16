// tiledash-core/src/colors.rs
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Colour as written in the config file: a name ("red", "darkgray"),
/// a hex triplet ("#ff8800"), a 256-colour index, or "default".
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ColorName(pub String);

impl ColorName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resolve to a terminal colour. Unknown names fall back to the
    /// terminal's default colour.
    pub fn to_color(&self) -> Color {
        parse_color(&self.0).unwrap_or(Color::Reset)
    }
}

impl From<&str> for ColorName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Parse a colour name, returning `None` for anything unrecognized
pub fn parse_color(name: &str) -> Option<Color> {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "" | "default" | "reset" => Some(Color::Reset),
        // Names ratatui doesn't know but sample configs use
        "orange" => Some(Color::Rgb(255, 165, 0)),
        "darkslateblue" => Some(Color::Rgb(72, 61, 139)),
        "purple" => Some(Color::Rgb(128, 0, 128)),
        "navy" => Some(Color::Rgb(0, 0, 128)),
        _ => Color::from_str(&name).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("DarkGray"), Some(Color::DarkGray));
        assert_eq!(parse_color("orange"), Some(Color::Rgb(255, 165, 0)));
        assert_eq!(parse_color("default"), Some(Color::Reset));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(parse_color("#ff8800"), Some(Color::Rgb(255, 136, 0)));
    }

    #[test]
    fn test_unknown_color_falls_back() {
        assert_eq!(parse_color("not-a-colour"), None);
        assert_eq!(ColorName::new("not-a-colour").to_color(), Color::Reset);
    }
}
