//! Connection bootstrap utilities.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections from a [`DbConfig`].
//! - Apply connection pragmas before handing the connection out.
//!
//! # Invariants
//! - Returned connections have every configured pragma applied.
//! - The connection is acquired once at startup and released exactly once at
//!   teardown, however many repositories are created on top of it.

use super::config::{DbConfig, JournalMode};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a database from the given configuration and applies all pragmas.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_with_config(config: &DbConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = if config.path.is_some() { "file" } else { "memory" };
    info!("event=db_open module=db status=start mode={mode}");

    let open_result = match config.path.as_deref() {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    };

    let conn = match open_result {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn, config) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a file-backed database with default options.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with_config(&DbConfig::for_path(path.as_ref()))
}

/// Opens an in-memory database with default options.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with_config(&DbConfig::in_memory())
}

fn bootstrap_connection(conn: &Connection, config: &DbConfig) -> DbResult<()> {
    if config.foreign_keys {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    }
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    if config.journal_mode != JournalMode::Delete {
        conn.pragma_update(None, "journal_mode", config.journal_mode.as_sql())?;
    }
    Ok(())
}
