//! Delivery channel that only writes the notification to the log.
//!
//! Used when no external endpoint is configured.

use super::{DeliveryError, NotificationDispatcher, OutboundNotification};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait::async_trait]
impl NotificationDispatcher for LogDispatcher {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send_to_user(
        &self,
        notification: &OutboundNotification,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            outbox_id = notification.outbox_id,
            recipient_user_id = notification.recipient_user_id,
            notification_type = %notification.notification_type,
            title = %notification.title,
            "Notification delivered to log"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_succeeds() {
        let n = OutboundNotification {
            outbox_id: 1,
            recipient_user_id: 2,
            notification_type: "intervention_cancelled".into(),
            title: "Intervention cancelled".into(),
            message: "The scheduled intervention has been cancelled".into(),
            payload: serde_json::json!({}),
        };
        assert!(LogDispatcher.send_to_user(&n).await.is_ok());
        assert_eq!(LogDispatcher.name(), "log");
    }
}
