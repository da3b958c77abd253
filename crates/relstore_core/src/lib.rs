//! Generic single-table data access over one shared SQLite connection.
//! This crate is the single source of truth for schema validation, condition
//! translation and sort-order invariants.

pub mod db;
pub mod logging;
pub mod manager;
pub mod query;
pub mod repo;
pub mod schema;

pub use db::{open_db, open_db_in_memory, open_with_config, DbConfig, DbError, DbResult, JournalMode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use manager::{DbManager, ManagerError, ManagerResult};
pub use query::condition::{translate, Condition, ConditionValue, Params};
pub use repo::ordering::Direction;
pub use repo::table_repo::{TableRepository, TableRow};
pub use repo::{RepoError, RepoResult};
pub use schema::{table_columns, SchemaError, SchemaResult};

/// Scalar value bound into generated statements, re-exported so callers do
/// not need a direct driver dependency.
pub use rusqlite::types::Value;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
