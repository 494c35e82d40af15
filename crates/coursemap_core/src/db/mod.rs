//! State file backing the SQLite key-value store.
//!
//! # Responsibility
//! - Open the state file (or an in-memory stand-in) with the `kv_store`
//!   table in place.
//! - Track the `kv_store` schema through `PRAGMA user_version`.
//!
//! # Invariants
//! - A connection returned by [`open_db`] is at [`migrations::latest_version`].
//! - A state file written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or migrate the state file.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement or could not open the file.
    Sqlite(rusqlite::Error),
    /// The `kv_store` schema is newer than this build understands.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "state file error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "kv_store schema v{found} is newer than this build (reads up to v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
