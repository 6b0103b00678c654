//! Per-tenant, namespace-partitioned message queue with visibility timeouts.
//!
//! Delivery follows the competing-consumer model: `receive` claims the
//! oldest eligible message by advancing its `visible_at` instant, hiding it
//! from other receivers for the requested window. A claimed message that is
//! never deleted becomes eligible again once the window elapses, so delivery
//! is at-least-once with no retry cap and no dead-letter state; the caller
//! acknowledges by deleting.
//!
//! A message is eligible when `visible_at` is the `0` sentinel (never
//! claimed) or at or before the current instant. The claim runs as a single
//! immediate transaction: select the lowest-id eligible row, advance its
//! `visible_at`, commit. Two concurrent receives can never claim the same
//! message. If the update fails the transaction rolls back and the message's
//! visibility is unchanged.

use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use crate::store::{Database, now_millis};

#[cfg(test)]
mod tests;

/// A claimed message as returned by [`QueueService::receive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Monotonically increasing id, assigned in insertion order.
    pub id: i64,
    pub namespace: String,
    pub message: String,
}

/// Tenant-scoped message queue over the shared database.
#[derive(Clone)]
pub struct QueueService {
    db: Database,
}

impl QueueService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Enqueues a message, immediately claimable. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn send(&self, tenant_id: i64, namespace: &str, message: &str) -> Result<i64> {
        let namespace = namespace.to_string();
        let message = message.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO queue_messages (tenant_id, namespace, message, visible_at)
                     VALUES (?1, ?2, ?3, 0)",
                    params![tenant_id, namespace, message],
                )
                .context("Failed to enqueue message")?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    /// Claims the oldest eligible message in (tenant, namespace).
    ///
    /// Atomically advances the claimed message's `visible_at` to
    /// now + `visibility_timeout` (milliseconds) in the same transaction as
    /// the selection. Ties on eligibility are broken strictly by insertion
    /// order, so a redelivered old message wins over a newer one.
    ///
    /// Returns `Ok(None)` if no message is eligible.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; the store is left
    /// unchanged in that case.
    pub async fn receive(
        &self,
        tenant_id: i64,
        namespace: &str,
        visibility_timeout: i64,
    ) -> Result<Option<Message>> {
        let namespace = namespace.to_string();
        self.db
            .call(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .context("Failed to begin receive transaction")?;

                let now = now_millis();
                let claimed = tx
                    .query_row(
                        "SELECT id, message FROM queue_messages
                         WHERE tenant_id = ?1 AND namespace = ?2
                           AND (visible_at = 0 OR visible_at <= ?3)
                         ORDER BY id LIMIT 1",
                        params![tenant_id, namespace, now],
                        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
                    )
                    .optional()
                    .context("Failed to select eligible message")?;

                let Some((id, message)) = claimed else {
                    return Ok(None);
                };

                tx.execute(
                    "UPDATE queue_messages SET visible_at = ?1 WHERE id = ?2",
                    params![now + visibility_timeout, id],
                )
                .context("Failed to claim message")?;
                tx.commit().context("Failed to commit claim")?;

                Ok(Some(Message {
                    id,
                    namespace,
                    message,
                }))
            })
            .await
    }

    /// Permanently removes the message identified by (tenant, namespace, id).
    ///
    /// Returns `Ok(false)` when no such message exists for that tenant and
    /// namespace. Tenant scoping is part of the delete predicate, so a
    /// mismatched tenant is indistinguishable from a missing id.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(&self, tenant_id: i64, namespace: &str, id: i64) -> Result<bool> {
        let namespace = namespace.to_string();
        self.db
            .call(move |conn| {
                let deleted = conn
                    .execute(
                        "DELETE FROM queue_messages
                         WHERE tenant_id = ?1 AND namespace = ?2 AND id = ?3",
                        params![tenant_id, namespace, id],
                    )
                    .context("Failed to delete message")?;
                Ok(deleted > 0)
            })
            .await
    }
}
