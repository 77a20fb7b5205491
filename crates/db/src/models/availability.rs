//! Weekly availability windows and date exceptions.

use assist_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `availability_windows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailabilityWindow {
    pub id: DbId,
    pub professional_id: DbId,
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `availability_exceptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailabilityException {
    pub id: DbId,
    pub professional_id: DbId,
    pub date: NaiveDate,
    pub is_working_day: bool,
    pub reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for declaring a range of days unavailable.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUnavailability {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}
