//! Delivery channels for queued notifications.
//!
//! The [`OutboxDispatcher`](crate::OutboxDispatcher) hands every due outbox
//! row to a [`NotificationDispatcher`]. Which channel actually reaches the
//! user (email, push, messaging) is decided behind that trait.

pub mod log;
pub mod webhook;

use assist_core::types::DbId;
use assist_db::models::notification_outbox::OutboxEntry;
use serde::Serialize;

use self::webhook::WebhookError;

/// The notification as handed to a delivery channel.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundNotification {
    pub outbox_id: DbId,
    pub recipient_user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
}

impl From<&OutboxEntry> for OutboundNotification {
    fn from(entry: &OutboxEntry) -> Self {
        Self {
            outbox_id: entry.id,
            recipient_user_id: entry.recipient_user_id,
            notification_type: entry.notification_type.clone(),
            title: entry.title.clone(),
            message: entry.message.clone(),
            payload: entry.payload.clone(),
        }
    }
}

/// Error returned by a delivery channel.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// The channel refused the notification.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// A channel able to deliver a notification to a user.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    async fn send_to_user(&self, notification: &OutboundNotification)
        -> Result<(), DeliveryError>;
}
