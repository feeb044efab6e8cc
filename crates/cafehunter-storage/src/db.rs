//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use cafehunter_core::error::CafeHunterError;

use crate::migrations;

/// Thread-safe SQLite database wrapper.
///
/// The connection is wrapped in a Mutex since rusqlite Connection is not Sync.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode and synchronous=NORMAL, then runs all pending
    /// migrations.
    pub fn new(path: &Path) -> Result<Self, CafeHunterError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| CafeHunterError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16384;",
        )
        .map_err(|e| CafeHunterError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, CafeHunterError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            CafeHunterError::Storage(format!("Failed to open in-memory db: {}", e))
        })?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, CafeHunterError>
    where
        F: FnOnce(&Connection) -> Result<T, CafeHunterError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CafeHunterError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
