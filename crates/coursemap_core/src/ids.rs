//! Identifier and timestamp utilities.
//!
//! # Responsibility
//! - Generate opaque entity ids.
//! - Capture wall-clock time for `created_at`/`updated_at`.
//!
//! # Invariants
//! - Ids are unique among all ids generated by one running process.
//! - Ids are never parsed back; callers treat them as opaque strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Opaque identifier of one course, module, sticky or task.
///
/// Kept as a type alias so persisted blobs from older builds with
/// non-uuid ids still load.
pub type EntityId = String;

/// Wall-clock instant stored on entities. Serialized as RFC 3339.
pub type Timestamp = DateTime<Utc>;

/// Generates a fresh entity id.
///
/// Uses UUIDv7: a millisecond timestamp prefix plus random bits, with a
/// per-process counter keeping ids generated within the same millisecond
/// distinct.
pub fn new_id() -> EntityId {
    Uuid::now_v7().to_string()
}

/// Source of "now" for entity timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Convenience wrapper over [`SystemClock`].
pub fn now() -> Timestamp {
    SystemClock.now()
}
