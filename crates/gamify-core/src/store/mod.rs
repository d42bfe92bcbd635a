//! GamifyStore: SQLite-backed profile, ledger and catalog storage.
//!
//! Every multi-step mutation goes through [`GamifyStore::in_txn`], which
//! takes the write lock up front (`BEGIN IMMEDIATE`) so concurrent writers
//! to the same profile are serialized by SQLite rather than racing on
//! read-modify-write.

pub(crate) mod ledger;
pub(crate) mod rows;
pub(crate) mod schema;

pub use schema::{GAMIFY_SCHEMA, SCHEMA_VERSION};

use crate::errors::GamifyError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct GamifyStore {
    conn: Arc<Mutex<Connection>>,
}

impl GamifyStore {
    /// Open a file-backed store.
    pub fn open(path: &Path) -> Result<Self, GamifyError> {
        let conn = Connection::open(path)?;
        Self::init_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store (for testing).
    pub fn memory() -> Result<Self, GamifyError> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create store from existing connection (for multi-connection tests).
    pub fn from_connection(conn: Connection) -> Result<Self, GamifyError> {
        Self::init_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_connection(conn: &Connection) -> Result<(), GamifyError> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        // WAL mode for file-backed DBs (no-op for in-memory)
        let _ = conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()));
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        schema::migrate(conn)?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<Option<i64>, GamifyError> {
        schema::schema_version(&self.lock())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Run `f` inside `BEGIN IMMEDIATE`; commit on `Ok`, roll back on `Err`.
    pub(crate) fn in_txn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, GamifyError>,
    ) -> Result<T, GamifyError> {
        let conn = self.lock();

        conn.execute("BEGIN IMMEDIATE", [])?;
        let result = f(&conn);

        match &result {
            Ok(_) => {
                if let Err(e) = conn.execute("COMMIT", []) {
                    let _ = conn.execute("ROLLBACK", []);
                    return Err(e.into());
                }
            }
            Err(_) => {
                let _ = conn.execute("ROLLBACK", []);
            }
        }

        result
    }
}
