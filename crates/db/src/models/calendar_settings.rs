//! Per-professional calendar preferences.

use assist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `calendar_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarSettings {
    pub id: DbId,
    pub professional_id: DbId,
    pub default_view: String,
    pub week_starts_on: i16,
    pub time_slot_duration: i32,
    pub min_time: String,
    pub max_time: String,
    pub show_weekends: bool,
    pub default_intervention_duration: i32,
    pub default_buffer_time: i32,
    pub max_concurrent_interventions: i32,
    pub auto_confirm_interventions: bool,
    pub send_reminders: bool,
    pub reminder_timing: serde_json::Value,
    pub time_zone: String,
    pub color_scheme: serde_json::Value,
    pub google_calendar_connected: bool,
    pub google_sync_enabled: bool,
    pub last_google_sync: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating settings. Only provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCalendarSettings {
    pub default_view: Option<String>,
    pub week_starts_on: Option<i16>,
    pub time_slot_duration: Option<i32>,
    pub min_time: Option<String>,
    pub max_time: Option<String>,
    pub show_weekends: Option<bool>,
    pub default_intervention_duration: Option<i32>,
    pub default_buffer_time: Option<i32>,
    pub max_concurrent_interventions: Option<i32>,
    pub auto_confirm_interventions: Option<bool>,
    pub send_reminders: Option<bool>,
    pub reminder_timing: Option<serde_json::Value>,
    pub time_zone: Option<String>,
    pub color_scheme: Option<serde_json::Value>,
    pub google_sync_enabled: Option<bool>,
}
