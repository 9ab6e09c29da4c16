// tiledash-core/src/position.rs
use serde::{Deserialize, Serialize};

/// Position of a panel as written in the config file, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PositionConfig {
    pub top: u16,
    pub left: u16,
    pub width: u16,
    pub height: u16,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            width: 1,
            height: 1,
        }
    }
}

/// Immutable grid-cell rectangle occupied by a panel.
///
/// Width and height are always at least one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    top: u16,
    left: u16,
    width: u16,
    height: u16,
}

impl Position {
    pub fn new(top: u16, left: u16, width: u16, height: u16) -> Self {
        Self {
            top,
            left,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    pub fn left(&self) -> u16 {
        self.left
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// First column index past the right edge
    pub fn right(&self) -> u16 {
        self.left.saturating_add(self.width)
    }

    /// First row index past the bottom edge
    pub fn bottom(&self) -> u16 {
        self.top.saturating_add(self.height)
    }
}

impl From<PositionConfig> for Position {
    fn from(cfg: PositionConfig) -> Self {
        Self::new(cfg.top, cfg.left, cfg.width, cfg.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_position_is_clamped() {
        let pos = Position::new(2, 3, 0, 0);
        assert_eq!(pos.width(), 1);
        assert_eq!(pos.height(), 1);
        assert_eq!(pos.right(), 4);
        assert_eq!(pos.bottom(), 3);
    }

    #[test]
    fn test_from_config() {
        let pos: Position = PositionConfig {
            top: 1,
            left: 2,
            width: 3,
            height: 4,
        }
        .into();
        assert_eq!(pos, Position::new(1, 2, 3, 4));
    }
}
