//! Queued notifications awaiting delivery.

use assist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_FAILED: &str = "failed";

/// A row from the `notification_outbox` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutboxEntry {
    pub id: DbId,
    pub recipient_user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for enqueuing a notification.
#[derive(Debug, Clone)]
pub struct NewOutboxEntry {
    pub recipient_user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
}
