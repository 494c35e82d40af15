//! Canvas geometry shared by entities, layout and projection.
//!
//! # Invariants
//! - Coordinates are canvas-space units; the canvas transform is applied by
//!   the rendering layer, never stored on entities.
//! - `position` is the top-left corner of a node's bounding box.

use serde::{Deserialize, Serialize};

/// Point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

impl NodeSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center of a box of this size anchored at `top_left`.
    pub fn center_from(&self, top_left: Position) -> Position {
        Position::new(
            top_left.x + self.width / 2.0,
            top_left.y + self.height / 2.0,
        )
    }
}
