//! Core state for the CourseMap mind map.
//! This crate owns the Course → Module → Sticky → Task tree, lays out new
//! nodes, and projects the tree into nodes and connections for the canvas.

pub mod config;
pub mod db;
pub mod ids;
pub mod layout;
pub mod logging;
pub mod model;
pub mod projection;
pub mod service;
pub mod storage;
pub mod tree;

pub use config::{StoreOptions, DEFAULT_STORAGE_KEY};
pub use ids::{new_id, Clock, EntityId, SystemClock, Timestamp};
pub use layout::place_child;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{
    CourseDraft, CoursePatch, ModuleDraft, ModulePatch, StickyDraft, StickyPatch, TaskDraft,
    TaskPatch,
};
pub use model::entity::{Course, Difficulty, EntityKind, EntityRef, Module, Sticky, Task};
pub use model::geometry::{NodeSize, Position};
pub use projection::{derive_edges, flatten_visible_nodes, Connection, MindMapNode};
pub use service::course_store::CourseStore;
pub use service::state::{StoreState, STATE_VERSION};
pub use service::summary::{CourseSummary, TaskProgress};
pub use service::StoreError;
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use tree::forest::{Forest, DEFAULT_COURSE_POSITION};
pub use tree::path::NodePath;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
