//! Repository layer: generic per-table persistence.
//!
//! # Responsibility
//! - Expose CRUD and query contracts bound to one table each.
//! - Keep SQL assembly and schema validation inside the persistence boundary.
//!
//! # Invariants
//! - Every column referenced in a write or a condition is validated against
//!   the introspected schema before any SQL is constructed.
//! - "No such row" is a semantic result (`None` / no-op), never an error.

use crate::db::DbError;
use crate::schema::SchemaError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod ordering;
pub mod table_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Empty or malformed input to a batch operation.
    InvalidArgument(String),
    /// A referenced column is not present in the introspected schema.
    InvalidColumn(String),
    /// The operation requires a column this table does not declare.
    MissingColumn(&'static str),
    /// Schema introspection failed.
    Schema(SchemaError),
    /// A persisted value cannot be read back as the expected type.
    InvalidData(String),
    /// Driver-level failure, propagated unmodified.
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvalidColumn(column) => {
                write!(f, "indicated column does not exist: `{column}`")
            }
            Self::MissingColumn(column) => write!(f, "`{column}` column does not exist"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted row data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidArgument(_)
            | Self::InvalidColumn(_)
            | Self::MissingColumn(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
