//! SQLite store for protections, players and access groups
//!
//! One connection is opened at startup and owned by [`LockDb`]; every
//! repository function borrows it through [`LockDb::with_conn`] or
//! [`LockDb::with_conn_mut`]. Access is serialized by a mutex, so callers on
//! several threads queue rather than interleave statements.
//!
//! ## Tables
//!
//! - `player` - Known players (uuid, display name, notify flag)
//! - `protected` - Locked cells keyed by canonical location
//! - `access_group` - Named member sets per owner

pub mod schema;
pub mod players;
pub mod protections;
pub mod access_groups;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::StorageError;

/// Handle to the lock database
pub struct LockDb {
    conn: Mutex<Connection>,
}

impl LockDb {
    /// Open or create the database file at `db_path`
    pub fn open(db_path: &Path, enable_wal: bool) -> Result<Self, StorageError> {
        info!("Opening SQLite database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        if enable_wal {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        }

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Open the database described by `config`, creating its directory
    pub fn open_with_config(config: &Config) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.storage_dir)?;
        Self::open(&config.database_path(), config.enable_wal)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.with_conn(schema::init_schema)
    }

    /// Run `f` with shared access to the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run `f` with exclusive access, for transactions
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    /// Row counts across all tables
    pub fn stats(&self) -> Result<DbStats, StorageError> {
        self.with_conn(|conn| {
            let count = |sql: &str| -> Result<u64, StorageError> {
                let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
                Ok(n as u64)
            };

            Ok(DbStats {
                player_count: count("SELECT COUNT(*) FROM player")?,
                protection_count: count("SELECT COUNT(*) FROM protected")?,
                group_count: count(
                    "SELECT COUNT(*) FROM (SELECT DISTINCT owner, name FROM access_group)",
                )?,
                membership_count: count("SELECT COUNT(*) FROM access_group")?,
            })
        })
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    ///
    /// Dropping the handle also closes it, silently.
    pub fn close(self) -> Result<(), StorageError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| StorageError::Internal(format!("Lock poisoned: {}", e)))?;
        conn.close().map_err(|(_, e)| StorageError::Database(e))?;
        info!("Closed SQLite database");
        Ok(())
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub player_count: u64,
    pub protection_count: u64,
    pub group_count: u64,
    pub membership_count: u64,
}

// Re-exports
pub use players::PlayerRow;
pub use protections::ProtectionRow;
