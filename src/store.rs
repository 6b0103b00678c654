//! SQLite store handle shared by all services.
//!
//! Wraps a single `rusqlite` connection behind a mutex and runs every
//! statement on the tokio blocking pool. The handle is `Clone` and is passed
//! by reference into the services and the reaper task; there is no global
//! connection state.
//!
//! Two modes mirror how the daemon is run:
//!
//! - [`Database::memory`] - non-persistent, used by tests and `--in-memory`
//! - [`Database::file`] - persistent WAL-mode database (default)

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Schema migration, applied on every open. All statements are idempotent.
///
/// `kv_entries` keeps at most one live row per (tenant, key); `set` relies on
/// the UNIQUE constraint for its upsert. `queue_messages` ids are rowids and
/// therefore assigned in insertion order.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tenants (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    token      TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS kv_entries (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    key       TEXT NOT NULL,
    value     TEXT NOT NULL,
    ttl       INTEGER NOT NULL DEFAULT -1,
    UNIQUE (tenant_id, key)
);

CREATE TABLE IF NOT EXISTS queue_messages (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id  INTEGER NOT NULL REFERENCES tenants(id),
    namespace  TEXT NOT NULL,
    message    TEXT NOT NULL,
    visible_at INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_queue_claim
    ON queue_messages (tenant_id, namespace, visible_at);
";

/// Current time as milliseconds since the Unix epoch.
///
/// All expiry and visibility arithmetic in the services uses this clock.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Shared SQLite handle.
///
/// # Thread Safety
///
/// `Database` is `Clone` and can be shared across tasks. Statements are
/// serialized through the internal mutex, which also makes the multi-step
/// transactions in the queue service atomic with respect to each other.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens a non-persistent in-memory database.
    ///
    /// All data is lost when the last handle is dropped. Used by tests and
    /// the `--in-memory` flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or migrated.
    pub fn memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    /// Opens (or creates) a persistent database file in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .context("Failed to create database directory")?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
            .context("Failed to configure database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to run schema migration")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs a closure against the connection on the blocking pool.
    ///
    /// The closure holds the connection lock for its whole duration, so a
    /// multi-statement transaction inside it executes in isolation.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error if the blocking task is
    /// cancelled.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .context("Store task join error")?
    }
}
