//! OAuth association between a professional and an external calendar.

use assist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `calendar_connections` table.
///
/// Tokens are never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarConnection {
    pub id: DbId,
    pub professional_id: DbId,
    pub provider: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<String>,
    pub account_email: Option<String>,
    pub calendar_id: String,
    pub last_sync_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CalendarConnection {
    /// Whether the access token is expired, or expires within `margin_secs`.
    pub fn is_expired(&self, now: Timestamp, margin_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|exp| exp <= now + chrono::Duration::seconds(margin_secs))
    }
}

/// Token material written on connect or refresh.
#[derive(Debug, Clone)]
pub struct UpsertCalendarConnection {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<String>,
    pub account_email: Option<String>,
}
