//! Periodic reclamation of expired KV entries.
//!
//! The reaper is a storage optimization, not a correctness mechanism:
//! expired entries are already invisible to reads. Each tick deletes rows
//! whose expiry instant has passed; a failed sweep is logged and retried at
//! the next tick.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::services::kv::KvStore;

/// Spawns the background sweep task.
///
/// The first sweep runs one full interval after startup, not immediately.
pub fn spawn(kv: KvStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires its first tick immediately; swallow it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match kv.reap().await {
                Ok(0) => debug!("no expired keys to reap"),
                Ok(deleted) => info!(deleted, "reaped expired keys"),
                Err(err) => warn!(error = ?err, "key reap failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::kv::TTL_NONE;
    use crate::services::tenants::TenantDirectory;
    use crate::store::{Database, now_millis};

    #[tokio::test]
    async fn sweeps_expired_rows_on_schedule() {
        let db = Database::memory().unwrap();
        let tenants = TenantDirectory::new(db.clone());
        let token = tenants.create().await.unwrap();
        let tenant = tenants.resolve(&token).await.unwrap().unwrap();

        let kv = KvStore::new(db.clone());
        kv.set(tenant.id, "expired", "v", now_millis() - 1).await.unwrap();
        kv.set(tenant.id, "forever", "v", TTL_NONE).await.unwrap();

        let handle = spawn(kv, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let count: i64 = db
            .call(|conn| {
                conn.query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get(0))
                    .map_err(Into::into)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
