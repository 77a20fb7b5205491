//! Enqueue side of the notification outbox.

use std::sync::Arc;

use assist_core::notifications::NotificationText;
use assist_core::types::DbId;
use assist_db::models::notification_outbox::NewOutboxEntry;
use assist_db::repositories::NotificationOutboxRepo;
use assist_db::DbPool;

use crate::bus::{event_types, EventBus, PlatformEvent};

/// Writes notifications to the outbox after a mutation has been persisted.
///
/// Enqueue failures are logged and swallowed: a notification problem never
/// fails the operation that triggered it.
#[derive(Clone)]
pub struct Notifier {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl Notifier {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Queue a notification for `recipient_user_id`.
    ///
    /// Returns the outbox id, or `None` if the row could not be written.
    pub async fn notify(
        &self,
        recipient_user_id: DbId,
        notification_type: &str,
        text: NotificationText,
        payload: serde_json::Value,
    ) -> Option<DbId> {
        let entry = NewOutboxEntry {
            recipient_user_id,
            notification_type: notification_type.to_string(),
            title: text.title,
            message: text.message,
            payload,
        };

        match NotificationOutboxRepo::enqueue(&self.pool, &entry).await {
            Ok(id) => {
                tracing::debug!(
                    outbox_id = id,
                    recipient_user_id,
                    notification_type,
                    "Notification enqueued"
                );
                self.bus.publish(
                    PlatformEvent::new(event_types::NOTIFICATION_ENQUEUED)
                        .with_source("notification_outbox", id),
                );
                Some(id)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    recipient_user_id,
                    notification_type,
                    "Failed to enqueue notification"
                );
                None
            }
        }
    }
}
