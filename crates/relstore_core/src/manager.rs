//! Connection ownership and repository resolution.
//!
//! # Responsibility
//! - Own the single shared connection for the process.
//! - Resolve logical entity names to memoized table repositories.
//! - Delegate the transaction boundary to the underlying connection.
//!
//! # Invariants
//! - One repository instance exists per registered name for the manager's
//!   lifetime; repeated lookups return the same handle.
//! - Repositories hold shared handles only; the connection closes after the
//!   manager and every handed-out repository are dropped.
//! - Registrations happen at startup, before the first lookup of a name.

use crate::db::{self, DbConfig, DbError};
use crate::repo::table_repo::TableRepository;
use crate::repo::RepoError;
use log::info;
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors from repository resolution and transaction delegation.
#[derive(Debug)]
pub enum ManagerError {
    /// The name was never registered with this manager.
    UnknownRepository(String),
    /// Repository construction failed.
    Repo(RepoError),
    /// Driver-level failure, propagated unmodified.
    Db(DbError),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRepository(name) => write!(f, "unknown repository: `{name}`"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UnknownRepository(_) => None,
        }
    }
}

impl From<RepoError> for ManagerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for ManagerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ManagerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owner of the shared connection and the repository registry.
pub struct DbManager {
    conn: Rc<Connection>,
    registry: HashMap<String, String>,
    repositories: HashMap<String, Rc<TableRepository>>,
}

impl DbManager {
    /// Takes ownership of an opened connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Rc::new(conn),
            registry: HashMap::new(),
            repositories: HashMap::new(),
        }
    }

    /// Opens a connection from configuration and wraps it in a manager.
    pub fn from_config(config: &DbConfig) -> ManagerResult<Self> {
        Ok(Self::new(db::open_with_config(config)?))
    }

    /// Maps a logical entity name to a table.
    ///
    /// Later registrations of the same name replace the mapping for
    /// not-yet-created repositories only.
    pub fn register(&mut self, name: impl Into<String>, table: impl Into<String>) {
        self.registry.insert(name.into(), table.into());
    }

    /// Resolves a registered name to its repository, creating and caching
    /// it on first use.
    ///
    /// # Errors
    /// - [`ManagerError::UnknownRepository`] for unregistered names.
    /// - [`ManagerError::Repo`] when schema introspection fails.
    pub fn get(&mut self, name: &str) -> ManagerResult<Rc<TableRepository>> {
        if let Some(repository) = self.repositories.get(name) {
            return Ok(Rc::clone(repository));
        }

        let table = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownRepository(name.to_string()))?;
        let repository = Rc::new(TableRepository::try_new(Rc::clone(&self.conn), table.as_str())?);
        info!("event=repo_create module=manager status=ok name={name} table={table}");

        self.repositories
            .insert(name.to_string(), Rc::clone(&repository));
        Ok(repository)
    }

    /// Rowid of the most recent successful insert on this connection.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Opens a transaction on the shared connection.
    pub fn begin(&self) -> ManagerResult<()> {
        self.conn.execute_batch("BEGIN")?;
        info!("event=tx_begin module=manager status=ok");
        Ok(())
    }

    /// Commits the open transaction.
    pub fn commit(&self) -> ManagerResult<()> {
        self.conn.execute_batch("COMMIT")?;
        info!("event=tx_commit module=manager status=ok");
        Ok(())
    }

    /// Rolls back the open transaction.
    pub fn rollback(&self) -> ManagerResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        info!("event=tx_rollback module=manager status=ok");
        Ok(())
    }

    /// Whether a transaction is currently open on the shared connection.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}
