use super::entity::Position;
use serde::{Deserialize, Serialize};

/// The rectangle every entity is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl WorldBounds {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(0.0, self.width),
            y: position.y.clamp(0.0, self.height),
        }
    }

    #[must_use]
    pub fn contains(&self, position: &Position) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_keeps_points_inside() {
        let bounds = WorldBounds::new(100.0, 50.0);
        let p = bounds.clamp(Position { x: -3.0, y: 75.0 });
        assert_eq!(p, Position { x: 0.0, y: 50.0 });
        assert!(bounds.contains(&p));
    }
}
