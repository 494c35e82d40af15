//! Persisted store state and its blob envelope.
//!
//! # Invariants
//! - The blob is `{"state": {...}, "version": N}` with camelCase fields.
//! - Blobs with a `version` newer than [`STATE_VERSION`] are rejected.
//! - Missing canvas fields fall back to the default view.

use crate::model::geometry::Position;
use crate::tree::forest::Forest;
use serde::{Deserialize, Serialize};

/// Version written into every saved blob.
pub const STATE_VERSION: u32 = 0;

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    #[serde(default)]
    pub courses: Forest,
    #[serde(default)]
    pub canvas_offset: Position,
    #[serde(default = "default_canvas_scale")]
    pub canvas_scale: f64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            courses: Forest::new(),
            canvas_offset: Position::ORIGIN,
            canvas_scale: default_canvas_scale(),
        }
    }
}

fn default_canvas_scale() -> f64 {
    1.0
}

/// Outer wrapper of the stored blob.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StateEnvelope<T> {
    pub state: T,
    #[serde(default)]
    pub version: u32,
}
