//! Deterministic auto-layout for newly created nodes.
//!
//! # Responsibility
//! - Pick a canvas position for an entity created without an explicit one.
//!
//! # Invariants
//! - Pure: output depends only on `(parent, sibling_index, kind)`.
//! - Root courses use a 3-column grid; children use rings of 8 slots
//!   around the parent anchor, each further ring 50 units wider.

use crate::model::entity::EntityKind;
use crate::model::geometry::Position;
use std::f64::consts::PI;

const GRID_COLUMNS: usize = 3;
const GRID_ORIGIN: f64 = 50.0;
const GRID_SPACING_X: f64 = 300.0;
const GRID_SPACING_Y: f64 = 200.0;

const RING_SLOTS: usize = 8;
const RING_STEP: f64 = 50.0;

/// Computes the position of a new node.
///
/// `parent` is `None` for root courses. `sibling_index` is the number of
/// siblings that already exist under the same parent.
pub fn place_child(parent: Option<Position>, sibling_index: usize, kind: EntityKind) -> Position {
    match parent {
        None => grid_position(sibling_index),
        Some(anchor) => ring_position(anchor, sibling_index, kind),
    }
}

/// Radius of the first ring for children of `kind`.
pub fn base_radius(kind: EntityKind) -> f64 {
    match kind {
        EntityKind::Course | EntityKind::Module => 220.0,
        EntityKind::Sticky => 180.0,
        EntityKind::Task => 140.0,
    }
}

/// Ring radius used for the `sibling_index`-th child of `kind`.
pub fn ring_radius(sibling_index: usize, kind: EntityKind) -> f64 {
    let ring = sibling_index / RING_SLOTS;
    base_radius(kind) + ring as f64 * RING_STEP
}

fn grid_position(index: usize) -> Position {
    let column = index % GRID_COLUMNS;
    let row = index / GRID_COLUMNS;
    Position::new(
        GRID_ORIGIN + column as f64 * GRID_SPACING_X,
        GRID_ORIGIN + row as f64 * GRID_SPACING_Y,
    )
}

fn ring_position(anchor: Position, index: usize, kind: EntityKind) -> Position {
    let radius = ring_radius(index, kind);
    let slot = index % RING_SLOTS;
    let angle = slot as f64 * (2.0 * PI / RING_SLOTS as f64);
    Position::new(
        anchor.x + radius * angle.cos(),
        anchor.y + radius * angle.sin(),
    )
}
