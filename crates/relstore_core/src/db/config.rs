//! Connection configuration.
//!
//! # Responsibility
//! - Enumerate every connection option in one explicit struct.
//!
//! # Invariants
//! - No option is read from global state; everything flows through
//!   [`DbConfig`] into the bootstrap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Journal mode applied at connection bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// SQLite default rollback journal.
    Delete,
    /// Write-ahead logging. Meaningful for file-backed databases only.
    Wal,
    /// In-memory journal.
    Memory,
}

impl JournalMode {
    /// Returns the pragma value for this mode.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Wal => "WAL",
            Self::Memory => "MEMORY",
        }
    }
}

/// Complete connection configuration for the data layer.
///
/// `path = None` opens an in-memory database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Database file path; `None` selects an in-memory database.
    pub path: Option<PathBuf>,
    /// Busy handler timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Whether `PRAGMA foreign_keys` is switched on.
    pub foreign_keys: bool,
    /// Journal mode applied at bootstrap.
    pub journal_mode: JournalMode,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
            journal_mode: JournalMode::Delete,
        }
    }
}

impl DbConfig {
    /// Returns a file-backed configuration with default options.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Returns an in-memory configuration with default options.
    pub fn in_memory() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::{DbConfig, JournalMode};

    #[test]
    fn default_config_is_in_memory_with_foreign_keys() {
        let config = DbConfig::default();
        assert!(config.path.is_none());
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert_eq!(config.journal_mode, JournalMode::Delete);
    }

    #[test]
    fn for_path_sets_only_the_path() {
        let config = DbConfig::for_path("/tmp/relstore-test.db");
        assert!(config.path.is_some());
        assert_eq!(config.busy_timeout_ms, DbConfig::default().busy_timeout_ms);
    }

    #[test]
    fn journal_mode_pragma_values() {
        assert_eq!(JournalMode::Delete.as_sql(), "DELETE");
        assert_eq!(JournalMode::Wal.as_sql(), "WAL");
        assert_eq!(JournalMode::Memory.as_sql(), "MEMORY");
    }
}
