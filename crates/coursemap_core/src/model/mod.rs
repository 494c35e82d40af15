//! Domain model for the course mind map.
//!
//! # Responsibility
//! - Define the Course → Module → Sticky → Task records and their geometry.
//! - Define creation drafts and typed partial updates.
//!
//! # Invariants
//! - Every entity is identified by an `EntityId` unique across the forest.
//! - Deletion is a hard delete of the whole owned subtree.

pub mod draft;
pub mod entity;
pub mod geometry;
