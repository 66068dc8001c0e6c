//! Volatile SQLite store bootstrap.
//!
//! # Responsibility
//! - Open the in-memory connection that holds all collaboration state.
//! - Apply schema migrations before any repository touches the store.
//!
//! # Invariants
//! - State lives only in memory; dropping the connection drops everything.
//! - Schema version is tracked via `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::open_db_in_memory;

pub type DbResult<T> = Result<T, DbError>;

/// Store bootstrap and statement failures.
#[derive(Debug)]
pub enum DbError {
    /// Statement failure outside of a migration step.
    Sqlite(rusqlite::Error),
    /// A migration script failed; the whole migration batch is rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The connection reports a schema this build does not know.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "collaboration store query failed: {err}"),
            Self::Migration { version, source } => {
                write!(f, "collaboration schema migration v{version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "collaboration schema v{db_version} is ahead of this build (knows up to v{latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
