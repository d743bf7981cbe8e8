//! Positions and axis-aligned areas in world coordinates.

use serde::{Deserialize, Serialize};

/// Sub-tile resolution of world positions; positions are multiples of 1/256.
pub const POSITION_RESOLUTION: f64 = 256.0;

/// Point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Quantises the position to the host's fixed-point grid.
    pub fn key(&self) -> PositionKey {
        PositionKey {
            x: (self.x * POSITION_RESOLUTION).round() as i64,
            y: (self.y * POSITION_RESOLUTION).round() as i64,
        }
    }
}

/// Hashable fixed-point form of a [`Position`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    pub x: i64,
    pub y: i64,
}

/// Axis-aligned rectangle with inclusive bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left_top: Position,
    pub right_bottom: Position,
}

impl BoundingBox {
    /// Creates a box from its two corners.
    pub const fn new(left_top: Position, right_bottom: Position) -> Self {
        Self {
            left_top,
            right_bottom,
        }
    }

    /// Square of half-width `radius` centred on `center`.
    pub fn square(center: Position, radius: f64) -> Self {
        Self {
            left_top: Position::new(center.x - radius, center.y - radius),
            right_bottom: Position::new(center.x + radius, center.y + radius),
        }
    }

    /// Returns the box shrunk by `epsilon` on every side.
    pub fn shrink(&self, epsilon: f64) -> Self {
        Self {
            left_top: Position::new(self.left_top.x + epsilon, self.left_top.y + epsilon),
            right_bottom: Position::new(
                self.right_bottom.x - epsilon,
                self.right_bottom.y - epsilon,
            ),
        }
    }

    /// Point-in-rectangle test, bounds included.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.left_top.x
            && pos.x <= self.right_bottom.x
            && pos.y >= self.left_top.y
            && pos.y <= self.right_bottom.y
    }

    /// True when the two boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left_top.x <= other.right_bottom.x
            && other.left_top.x <= self.right_bottom.x
            && self.left_top.y <= other.right_bottom.y
            && other.left_top.y <= self.right_bottom.y
    }
}
