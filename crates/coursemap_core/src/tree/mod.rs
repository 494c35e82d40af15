//! Content tree ownership and mutation.
//!
//! # Responsibility
//! - Hold the canonical forest of courses.
//! - Apply every structural and field mutation in one place.
//!
//! # Invariants
//! - Mutations on unresolved paths are no-ops, never errors.
//! - `updated_at` freshness propagates from a touched entity to its course.

pub mod forest;
pub mod path;
