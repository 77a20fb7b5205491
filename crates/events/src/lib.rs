//! Event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope published after every
//!   intervention mutation.
//! - [`Notifier`]: enqueues notifications in the durable outbox and wakes
//!   the dispatcher.
//! - [`OutboxDispatcher`]: background service delivering queued
//!   notifications through a [`NotificationDispatcher`].
//! - [`delivery`]: delivery channels (webhook, log).

pub mod bus;
pub mod delivery;
pub mod notifier;
pub mod outbox;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::log::LogDispatcher;
pub use delivery::webhook::WebhookDelivery;
pub use delivery::{DeliveryError, NotificationDispatcher, OutboundNotification};
pub use notifier::Notifier;
pub use outbox::OutboxDispatcher;
