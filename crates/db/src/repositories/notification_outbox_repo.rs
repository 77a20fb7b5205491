//! Repository for the `notification_outbox` table.

use assist_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification_outbox::{NewOutboxEntry, OutboxEntry};

/// Column list for `notification_outbox` queries.
const COLUMNS: &str = "id, recipient_user_id, notification_type, title, message, payload, \
    status, attempts, last_error, next_attempt_at, delivered_at, created_at, updated_at";

/// Provides the durable notification queue.
pub struct NotificationOutboxRepo;

impl NotificationOutboxRepo {
    /// Enqueue a notification, returning the generated ID.
    pub async fn enqueue(pool: &PgPool, entry: &NewOutboxEntry) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notification_outbox \
                (recipient_user_id, notification_type, title, message, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(entry.recipient_user_id)
        .bind(&entry.notification_type)
        .bind(&entry.title)
        .bind(&entry.message)
        .bind(&entry.payload)
        .fetch_one(pool)
        .await
    }

    /// Claim pending entries that are due, oldest first.
    ///
    /// Each claimed row is leased: `next_attempt_at` moves `lease_secs` into
    /// the future, so later claims skip it until [`mark_delivered`] or
    /// [`record_failure`] resolves it, or until the lease runs out after a
    /// crash.
    ///
    /// [`mark_delivered`]: Self::mark_delivered
    /// [`record_failure`]: Self::record_failure
    pub async fn claim_due(
        pool: &PgPool,
        limit: i64,
        lease_secs: i64,
    ) -> Result<Vec<OutboxEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_outbox SET \
                attempts = attempts + 1, \
                next_attempt_at = NOW() + make_interval(secs => $2) \
             WHERE id IN ( \
                SELECT id FROM notification_outbox \
                WHERE status = 'pending' AND next_attempt_at <= NOW() \
                ORDER BY next_attempt_at ASC, id ASC \
                LIMIT $1 \
                FOR UPDATE SKIP LOCKED) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(limit)
            .bind(lease_secs as f64)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_delivered(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_outbox \
             SET status = 'delivered', delivered_at = NOW(), last_error = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed attempt. The entry is retried after `retry_in_secs`,
    /// or marked `failed` once `attempts` reaches `max_attempts`.
    pub async fn record_failure(
        pool: &PgPool,
        id: DbId,
        error: &str,
        retry_in_secs: i64,
        max_attempts: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_outbox SET \
                last_error = $2, \
                status = CASE WHEN attempts >= $4 THEN 'failed' ELSE 'pending' END, \
                next_attempt_at = NOW() + make_interval(secs => $3) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(retry_in_secs as f64)
        .bind(max_attempts)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OutboxEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_outbox WHERE id = $1");
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All entries addressed to a user, newest first.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient_user_id: DbId,
    ) -> Result<Vec<OutboxEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_outbox \
             WHERE recipient_user_id = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(recipient_user_id)
            .fetch_all(pool)
            .await
    }
}
