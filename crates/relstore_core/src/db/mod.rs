//! SQLite connection bootstrap entry points.
//!
//! # Responsibility
//! - Open and configure the single shared connection used by the data layer.
//! - Surface driver failures unmodified behind one transport error type.
//!
//! # Invariants
//! - Returned connections have all configured pragmas applied.
//! - Callers never open connections behind the data layer's back.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod config;
mod open;

pub use config::{DbConfig, JournalMode};
pub use open::{open_db, open_db_in_memory, open_with_config};

pub type DbResult<T> = Result<T, DbError>;

/// Transport-level database error. Driver failures are carried as-is and
/// never translated or suppressed by the layers above.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
