//! Intervention entity models and DTOs.

use assist_core::conflict::{effective_end, Occupies, TimeRange};
use assist_core::error::CoreError;
use assist_core::scheduling::InterventionStatus;
use assist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `interventions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Intervention {
    pub id: DbId,
    pub request_id: DbId,
    pub professional_id: DbId,
    pub proposed_date: Timestamp,
    pub confirmed_date: Option<Timestamp>,
    pub estimated_duration: i32,
    pub actual_duration: Option<i32>,
    pub status: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub client_confirmed: bool,
    pub client_decline_reason: Option<String>,
    pub created_by: Option<DbId>,
    pub parent_intervention_id: Option<DbId>,
    pub external_event_id: Option<String>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Intervention {
    pub fn status(&self) -> Result<InterventionStatus, CoreError> {
        self.status.parse()
    }

    /// Computed end: `confirmed_date`, else start plus estimated duration.
    pub fn end(&self) -> Timestamp {
        effective_end(
            self.proposed_date,
            self.confirmed_date,
            Some(self.estimated_duration),
        )
    }
}

impl Occupies for Intervention {
    fn occupied_range(&self) -> TimeRange {
        TimeRange {
            start: self.proposed_date,
            end: self.end(),
        }
    }

    fn blocks_slot(&self) -> bool {
        self.status().map(|s| !s.is_terminal()).unwrap_or(false)
    }
}

/// An intervention joined with its request, client and category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InterventionDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub intervention: Intervention,
    pub request_title: String,
    pub request_address: Option<String>,
    pub request_city: Option<String>,
    pub request_priority: String,
    pub client_id: DbId,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
}

impl Occupies for InterventionDetail {
    fn occupied_range(&self) -> TimeRange {
        self.intervention.occupied_range()
    }

    fn blocks_slot(&self) -> bool {
        self.intervention.blocks_slot()
    }
}

/// DTO for inserting an intervention.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntervention {
    pub request_id: DbId,
    pub professional_id: DbId,
    pub proposed_date: Timestamp,
    pub confirmed_date: Option<Timestamp>,
    pub estimated_duration: Option<i32>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub parent_intervention_id: Option<DbId>,
}

/// DTO for a partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIntervention {
    pub proposed_date: Option<Timestamp>,
    pub confirmed_date: Option<Timestamp>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub client_confirmed: Option<bool>,
    pub client_decline_reason: Option<String>,
}

/// Filters for the calendar listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterventionFilter {
    pub status: Option<String>,
    pub category_id: Option<DbId>,
    pub search: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}
