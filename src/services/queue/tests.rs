//! Tests for the queue service.

use super::*;
use crate::services::tenants::TenantDirectory;
use crate::store::{Database, now_millis};
use std::time::Duration;

async fn fixture() -> (Database, QueueService, i64) {
    let db = Database::memory().unwrap();
    let tenants = TenantDirectory::new(db.clone());
    let token = tenants.create().await.unwrap();
    let tenant = tenants.resolve(&token).await.unwrap().unwrap();
    (db.clone(), QueueService::new(db), tenant.id)
}

async fn visible_at(db: &Database, id: i64) -> i64 {
    db.call(move |conn| {
        conn.query_row(
            "SELECT visible_at FROM queue_messages WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn send_then_receive() {
    let (db, queue, tenant) = fixture().await;

    let id = queue.send(tenant, "a", "b").await.unwrap();
    assert_eq!(id, 1);
    assert_eq!(visible_at(&db, id).await, 0);

    let before = now_millis();
    let msg = queue.receive(tenant, "a", 20_000).await.unwrap().unwrap();
    assert_eq!(msg.id, 1);
    assert_eq!(msg.namespace, "a");
    assert_eq!(msg.message, "b");

    // The claim hides the message for roughly the requested window; allow
    // two seconds of leeway for the call itself.
    let hidden_until = visible_at(&db, id).await;
    assert!(hidden_until >= before + 18_000, "visible_at = {hidden_until}");
    assert!(hidden_until <= now_millis() + 20_000);
}

#[tokio::test]
async fn receive_from_empty_namespace() {
    let (_db, queue, tenant) = fixture().await;
    assert!(queue.receive(tenant, "a", 20_000).await.unwrap().is_none());
}

#[tokio::test]
async fn receive_returns_oldest_first() {
    let (db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();
    queue.send(tenant, "a", "c").await.unwrap();

    let msg = queue.receive(tenant, "a", 20_000).await.unwrap().unwrap();
    assert_eq!(msg.id, 1);
    assert_eq!(msg.message, "b");

    // Only the claimed row's visibility advanced.
    assert!(visible_at(&db, 1).await > 0);
    assert_eq!(visible_at(&db, 2).await, 0);
}

#[tokio::test]
async fn claimed_message_is_invisible() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();
    queue.receive(tenant, "a", 20_000).await.unwrap().unwrap();

    assert!(queue.receive(tenant, "a", 20_000).await.unwrap().is_none());
}

#[tokio::test]
async fn claimed_message_is_redelivered_after_timeout() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();
    queue.send(tenant, "a", "c").await.unwrap();

    let first = queue.receive(tenant, "a", 50).await.unwrap().unwrap();
    assert_eq!(first.message, "b");

    tokio::time::sleep(Duration::from_millis(100)).await;

    // "b" is the oldest eligible message again, ahead of "c".
    let again = queue.receive(tenant, "a", 20_000).await.unwrap().unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.message, "b");
}

#[tokio::test]
async fn deleted_message_is_not_redelivered() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();
    queue.send(tenant, "a", "c").await.unwrap();

    let first = queue.receive(tenant, "a", 50).await.unwrap().unwrap();
    assert!(queue.delete(tenant, "a", first.id).await.unwrap());

    tokio::time::sleep(Duration::from_millis(100)).await;

    let next = queue.receive(tenant, "a", 20_000).await.unwrap().unwrap();
    assert_eq!(next.message, "c");
}

#[tokio::test]
async fn receive_after_delete_finds_nothing() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();
    let msg = queue.receive(tenant, "a", 20_000).await.unwrap().unwrap();
    assert!(queue.delete(tenant, "a", msg.id).await.unwrap());

    assert!(queue.receive(tenant, "a", 20_000).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_message() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();

    assert!(!queue.delete(tenant, "a", 2).await.unwrap());
    assert!(!queue.delete(tenant, "other", 1).await.unwrap());
}

#[tokio::test]
async fn delete_is_tenant_scoped() {
    let (db, queue, tenant_a) = fixture().await;
    let tenants = TenantDirectory::new(db.clone());
    let token_b = tenants.create().await.unwrap();
    let tenant_b = tenants.resolve(&token_b).await.unwrap().unwrap();

    let id = queue.send(tenant_a, "a", "b").await.unwrap();

    assert!(!queue.delete(tenant_b.id, "a", id).await.unwrap());
    // The row is untouched and still claimable by its owner.
    let msg = queue.receive(tenant_a, "a", 20_000).await.unwrap().unwrap();
    assert_eq!(msg.id, id);
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "jobs", "b").await.unwrap();

    assert!(queue.receive(tenant, "mail", 20_000).await.unwrap().is_none());
    assert!(queue.receive(tenant, "jobs", 20_000).await.unwrap().is_some());
}

#[tokio::test]
async fn tenants_are_isolated() {
    let (db, queue, tenant_a) = fixture().await;
    let tenants = TenantDirectory::new(db.clone());
    let token_b = tenants.create().await.unwrap();
    let tenant_b = tenants.resolve(&token_b).await.unwrap().unwrap();

    queue.send(tenant_a, "a", "b").await.unwrap();

    assert!(
        queue
            .receive(tenant_b.id, "a", 20_000)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn concurrent_receives_claim_distinct_messages() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "only").await.unwrap();

    let (first, second) = tokio::join!(
        queue.receive(tenant, "a", 20_000),
        queue.receive(tenant, "a", 20_000),
    );
    let claims = [first.unwrap(), second.unwrap()];

    // Exactly one receiver gets the single eligible message.
    assert_eq!(claims.iter().filter(|c| c.is_some()).count(), 1);
}

#[tokio::test]
async fn zero_timeout_leaves_message_eligible() {
    let (_db, queue, tenant) = fixture().await;

    queue.send(tenant, "a", "b").await.unwrap();
    queue.receive(tenant, "a", 0).await.unwrap().unwrap();

    // A zero-length window expires immediately.
    let again = queue.receive(tenant, "a", 20_000).await.unwrap();
    assert!(again.is_some());
}
