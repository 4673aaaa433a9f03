//! Roster database bootstrap.
//!
//! # Responsibility
//! - Open roster databases with foreign keys and a busy timeout.
//! - Bring the `members`/`teams` schema to the version this build expects.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A connection is handed out only after migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure below the repository layer.
#[derive(Debug)]
pub enum DbError {
    /// Any SQLite failure: I/O, locking, constraint, decode.
    Storage(rusqlite::Error),
    /// The file carries a roster schema from a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "roster storage failure: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "roster schema v{found} was written by a newer build; this build reads up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value)
    }
}
