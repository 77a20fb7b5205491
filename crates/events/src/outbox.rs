//! Notification outbox dispatcher.
//!
//! [`OutboxDispatcher`] runs as a background task. It drains due rows from
//! `notification_outbox` on a fixed interval and immediately whenever a
//! `notification.enqueued` event is published on the bus. Failed deliveries
//! are rescheduled with exponential backoff until `max_attempts` is reached.

use std::sync::Arc;
use std::time::Duration;

use assist_db::repositories::NotificationOutboxRepo;
use assist_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::{event_types, PlatformEvent};
use crate::delivery::{NotificationDispatcher, OutboundNotification};

/// Rows claimed per batch.
const DEFAULT_BATCH_SIZE: i64 = 50;

/// Attempts before an entry is marked `failed`.
const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// How long a claimed entry stays invisible to other claims.
const DEFAULT_LEASE_SECS: i64 = 300;

/// First retry delay; doubles per attempt.
const BASE_RETRY_SECS: i64 = 30;

/// Upper bound on a single retry delay.
const MAX_RETRY_SECS: i64 = 3600;

/// Backoff for the retry following attempt number `attempts` (1-based).
pub fn retry_delay_secs(attempts: i32) -> i64 {
    let exp = attempts.saturating_sub(1).clamp(0, 16) as u32;
    BASE_RETRY_SECS
        .saturating_mul(2_i64.saturating_pow(exp))
        .min(MAX_RETRY_SECS)
}

/// Counts from one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// Background service delivering queued notifications.
pub struct OutboxDispatcher {
    pool: DbPool,
    dispatcher: Arc<dyn NotificationDispatcher>,
    poll_interval: Duration,
    batch_size: i64,
    max_attempts: i32,
}

impl OutboxDispatcher {
    pub fn new(
        pool: DbPool,
        dispatcher: Arc<dyn NotificationDispatcher>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            poll_interval,
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Run the dispatcher loop until `cancel` fires.
    pub async fn run(
        &self,
        mut events: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(self.poll_interval);
        tracing::info!(channel = self.dispatcher.name(), "Outbox dispatcher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Outbox dispatcher cancelled");
                    break;
                }
                _ = interval.tick() => self.drain().await,
                received = events.recv() => match received {
                    Ok(event) if event.event_type == event_types::NOTIFICATION_ENQUEUED => {
                        self.drain().await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Outbox dispatcher lagged behind the event bus");
                        self.drain().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, outbox dispatcher shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn drain(&self) {
        if let Err(e) = self.process_batch().await {
            tracing::error!(error = %e, "Failed to process notification outbox");
        }
    }

    /// Claim one batch of due entries and deliver each.
    pub async fn process_batch(&self) -> Result<BatchOutcome, sqlx::Error> {
        let entries =
            NotificationOutboxRepo::claim_due(&self.pool, self.batch_size, DEFAULT_LEASE_SECS)
                .await?;
        let mut outcome = BatchOutcome::default();

        for entry in &entries {
            let notification = OutboundNotification::from(entry);
            match self.dispatcher.send_to_user(&notification).await {
                Ok(()) => {
                    NotificationOutboxRepo::mark_delivered(&self.pool, entry.id).await?;
                    outcome.delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        outbox_id = entry.id,
                        attempts = entry.attempts,
                        channel = self.dispatcher.name(),
                        error = %e,
                        "Notification delivery failed"
                    );
                    NotificationOutboxRepo::record_failure(
                        &self.pool,
                        entry.id,
                        &e.to_string(),
                        retry_delay_secs(entry.attempts),
                        self.max_attempts,
                    )
                    .await?;
                    outcome.failed += 1;
                }
            }
        }

        if !entries.is_empty() {
            tracing::info!(
                delivered = outcome.delivered,
                failed = outcome.failed,
                "Processed notification outbox batch"
            );
        }
        Ok(outcome)
    }
}
