//! Scheduling service layer.
//!
//! Handlers stay thin; the rules for creating, moving, cancelling and
//! repeating interventions, and for detecting conflicts, live here.
//!
//! - [`conflicts`] -- overlap detection against interventions and, on
//!   request, blocks and days off.
//! - [`lifecycle`] -- create / update / reschedule / cancel / client response.
//! - [`recurrence`] -- series expansion from an existing intervention.

pub mod conflicts;
pub mod lifecycle;
pub mod recurrence;

use assist_core::error::CoreError;
use assist_core::types::DbId;
use assist_db::models::intervention::Intervention;
use assist_db::repositories::InterventionRepo;
use assist_db::DbPool;

use crate::error::AppResult;

/// Load an intervention and check it belongs to `professional_id`.
pub(crate) async fn load_owned(
    pool: &DbPool,
    id: DbId,
    professional_id: DbId,
) -> AppResult<Intervention> {
    let intervention = InterventionRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Intervention",
            id,
        })?;

    if intervention.professional_id != professional_id {
        return Err(CoreError::Forbidden(
            "You are not authorized to manage this intervention".into(),
        )
        .into());
    }
    Ok(intervention)
}
