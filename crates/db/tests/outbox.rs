//! Integration tests for the notification outbox queue.

mod common;

use assist_db::models::notification_outbox::NewOutboxEntry;
use assist_db::repositories::NotificationOutboxRepo;
use common::insert_user;
use sqlx::PgPool;

const LEASE_SECS: i64 = 300;

fn entry(recipient: i64) -> NewOutboxEntry {
    NewOutboxEntry {
        recipient_user_id: recipient,
        notification_type: "intervention_scheduled".into(),
        title: "New intervention scheduled".into(),
        message: "An intervention has been scheduled".into(),
        payload: serde_json::json!({ "intervention_id": 1 }),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claim_and_deliver(pool: PgPool) {
    let user = insert_user(&pool, "Client", "client").await;
    let id = NotificationOutboxRepo::enqueue(&pool, &entry(user)).await.unwrap();

    let claimed = NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].attempts, 1);

    NotificationOutboxRepo::mark_delivered(&pool, id).await.unwrap();
    let row = NotificationOutboxRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status, "delivered");
    assert!(row.delivered_at.is_some());

    assert!(NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failure_backoff_then_dead(pool: PgPool) {
    let user = insert_user(&pool, "Client", "client").await;
    let id = NotificationOutboxRepo::enqueue(&pool, &entry(user)).await.unwrap();

    NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap();
    NotificationOutboxRepo::record_failure(&pool, id, "timeout", 60, 2)
        .await
        .unwrap();

    let row = NotificationOutboxRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status, "pending");
    assert_eq!(row.last_error.as_deref(), Some("timeout"));
    // Not due again until the backoff elapses.
    assert!(NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap().is_empty());

    sqlx::query("UPDATE notification_outbox SET next_attempt_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();
    NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap();
    NotificationOutboxRepo::record_failure(&pool, id, "timeout", 60, 2)
        .await
        .unwrap();

    let row = NotificationOutboxRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status, "failed");
    assert_eq!(row.attempts, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claimed_entry_is_not_claimed_twice(pool: PgPool) {
    let user = insert_user(&pool, "Client", "client").await;
    let id = NotificationOutboxRepo::enqueue(&pool, &entry(user)).await.unwrap();

    let first = NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, id);

    // Still in flight: a second dispatcher must not see it.
    let second = NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap();
    assert!(second.is_empty());

    // An expired lease makes the entry claimable again.
    sqlx::query("UPDATE notification_outbox SET next_attempt_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();
    let reclaimed = NotificationOutboxRepo::claim_due(&pool, 10, LEASE_SECS).await.unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].attempts, 2);
}
