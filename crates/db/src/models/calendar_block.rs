//! Ad-hoc calendar blocks.

use assist_core::conflict::{Occupies, TimeRange};
use assist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_GOOGLE: &str = "google";

/// A row from the `calendar_blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarBlock {
    pub id: DbId,
    pub professional_id: DbId,
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub reason: Option<String>,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
    pub source: String,
    pub external_event_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Occupies for CalendarBlock {
    fn occupied_range(&self) -> TimeRange {
        TimeRange {
            start: self.start_date_time,
            end: self.end_date_time,
        }
    }
}

/// DTO for creating a block.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCalendarBlock {
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub reason: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}
