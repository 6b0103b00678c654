//! Per-tenant key-value cache with absolute expiry.
//!
//! Each entry carries a `ttl` column holding either [`TTL_NONE`] (never
//! expires) or an absolute expiry instant in milliseconds since the epoch.
//! Reads filter expired entries lazily; the periodic
//! [reaper](crate::reaper) only reclaims storage. Correctness never depends
//! on the reaper having run.
//!
//! `set` is a single upsert statement: at most one live row exists per
//! (tenant, key), and overwriting replaces value and ttl in place. Lost
//! updates between concurrent writers resolve as last-writer-wins.

use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use crate::store::{Database, now_millis};


/// Sentinel ttl for entries that never expire.
pub const TTL_NONE: i64 = -1;

/// A live cache entry as returned by [`KvStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    /// [`TTL_NONE`] or the absolute expiry instant in epoch milliseconds.
    pub ttl: i64,
}

/// Tenant-scoped key-value cache over the shared database.
#[derive(Clone)]
pub struct KvStore {
    db: Database,
}

impl KvStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates or replaces the entry for (tenant, key).
    ///
    /// Overwriting is not an error; the existing row's value and ttl are
    /// replaced in place rather than a second row being created.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn set(&self, tenant_id: i64, key: &str, value: &str, ttl: i64) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv_entries (tenant_id, key, value, ttl)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (tenant_id, key)
                     DO UPDATE SET value = excluded.value, ttl = excluded.ttl",
                    params![tenant_id, key, value, ttl],
                )
                .context("Failed to upsert key")?;
                Ok(())
            })
            .await
    }

    /// Looks up a live entry for (tenant, key).
    ///
    /// Returns `Ok(None)` if the key is absent or its expiry instant has
    /// passed, whether or not the reaper has physically removed the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn get(&self, tenant_id: i64, key: &str) -> Result<Option<KvEntry>> {
        let key = key.to_string();
        let now = now_millis();
        self.db
            .call(move |conn| {
                conn.query_row(
                    "SELECT key, value, ttl FROM kv_entries
                     WHERE tenant_id = ?1 AND key = ?2 AND (ttl = -1 OR ttl >= ?3)",
                    params![tenant_id, key, now],
                    |row| {
                        Ok(KvEntry {
                            key: row.get(0)?,
                            value: row.get(1)?,
                            ttl: row.get(2)?,
                        })
                    },
                )
                .optional()
                .context("Failed to read key")
            })
            .await
    }

    /// Physically deletes every expired row, across all tenants.
    ///
    /// Entries with [`TTL_NONE`] are untouched. Returns the number of rows
    /// removed. Pure storage reclamation: `get` filters expired entries
    /// whether or not this has run.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn reap(&self) -> Result<usize> {
        let now = now_millis();
        self.db
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM kv_entries WHERE ttl != -1 AND ttl < ?1",
                    params![now],
                )
                .context("Failed to reap expired keys")
            })
            .await
    }
}
