//! Runtime table schema introspection.
//!
//! # Responsibility
//! - Resolve a table's column names, in declared order, from the live
//!   connection.
//! - Gate every table identifier before it is interpolated into SQL.
//!
//! # Invariants
//! - Introspection runs once per repository construction; the result is
//!   cached for the repository lifetime with no invalidation path. Schema
//!   changes require recreating the repository.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors from table schema introspection.
#[derive(Debug)]
pub enum SchemaError {
    /// Table name is not a plain SQL identifier.
    InvalidTableName(String),
    /// Table does not exist on this connection.
    TableNotFound(String),
    /// Underlying driver failure.
    Db(DbError),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTableName(name) => write!(f, "invalid table name: `{name}`"),
            Self::TableNotFound(name) => write!(f, "table does not exist: `{name}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidTableName(_) | Self::TableNotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns whether `name` is safe to interpolate as a table identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Returns the table's column names in declared order.
///
/// The identifier is validated before the pragma is built, so no statement
/// containing an unvetted table name is ever sent.
pub fn table_columns(conn: &Connection, table: &str) -> SchemaResult<Vec<String>> {
    if !is_valid_identifier(table) {
        return Err(SchemaError::InvalidTableName(table.to_string()));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }

    if columns.is_empty() {
        return Err(SchemaError::TableNotFound(table.to_string()));
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_identifier, table_columns, SchemaError};
    use crate::db::open_db_in_memory;

    #[test]
    fn identifier_check_accepts_plain_names() {
        assert!(is_valid_identifier("items"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("items_v2"));
    }

    #[test]
    fn identifier_check_rejects_injection_shapes() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("items;"));
        assert!(!is_valid_identifier("items drop"));
        assert!(!is_valid_identifier("2items"));
        assert!(!is_valid_identifier("items--"));
    }

    #[test]
    fn columns_come_back_in_declared_order() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, title TEXT, sort INTEGER);")
            .unwrap();

        let columns = table_columns(&conn, "items").unwrap();
        assert_eq!(columns, vec!["id", "title", "sort"]);
    }

    #[test]
    fn missing_table_is_reported() {
        let conn = open_db_in_memory().unwrap();
        let err = table_columns(&conn, "absent").unwrap_err();
        assert!(matches!(err, SchemaError::TableNotFound(name) if name == "absent"));
    }

    #[test]
    fn invalid_table_name_is_rejected_before_any_query() {
        let conn = open_db_in_memory().unwrap();
        let err = table_columns(&conn, "items; DROP TABLE items").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidTableName(_)));
    }
}
