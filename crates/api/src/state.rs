use std::sync::Arc;

use assist_events::{EventBus, Notifier};
use assist_gcal::CalendarSyncService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a pool handle or behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: assist_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Domain events published after every intervention mutation.
    pub event_bus: Arc<EventBus>,
    /// Writes notifications to the outbox.
    pub notifier: Arc<Notifier>,
    /// Google Calendar connect / sync / disconnect.
    pub calendar_sync: Arc<CalendarSyncService>,
}
