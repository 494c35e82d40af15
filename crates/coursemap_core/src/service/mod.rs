//! Store-level use cases over the content tree.
//!
//! # Responsibility
//! - Compose the tree engine, projection and persistence into one store.
//! - Provide summary read models for list/detail views.
//!
//! # Invariants
//! - Mutation APIs report no-ops through their return value, never errors.
//! - Only loading can surface `StoreError`.

use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course_store;
pub mod state;
pub mod summary;

/// Errors from loading or explicitly saving store state.
#[derive(Debug)]
pub enum StoreError {
    /// Key-value backend failure.
    Storage(StorageError),
    /// Blob could not be encoded or decoded as a state document.
    MalformedState(serde_json::Error),
    /// Blob was written by a newer state format.
    UnsupportedStateVersion { found: u32, supported: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::MalformedState(err) => write!(f, "malformed store state: {err}"),
            Self::UnsupportedStateVersion { found, supported } => write!(
                f,
                "store state version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::MalformedState(err) => Some(err),
            Self::UnsupportedStateVersion { .. } => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
