//! Route definitions for the `/calendar` resource.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::{availability, interventions, settings};
use crate::state::AppState;

/// Routes mounted at `/calendar`.
///
/// ```text
/// GET    /interventions                    -> list (?status&category&search&from&to)
/// POST   /interventions                    -> create
/// PUT    /interventions/{id}               -> update
/// DELETE /interventions/{id}               -> delete (cancels)
/// PATCH  /interventions/{id}/reschedule    -> reschedule
/// POST   /interventions/{id}/cancel        -> cancel
/// POST   /interventions/{id}/recurrence    -> create_recurrence
/// POST   /interventions/{id}/accept        -> accept
/// POST   /interventions/{id}/reject        -> reject
/// POST   /check-conflicts                  -> check_conflicts
/// GET    /availability                     -> get_availability
/// PUT    /availability                     -> update_availability
/// GET    /unavailability                   -> list_unavailability (?from&to)
/// POST   /unavailability                   -> add_unavailability
/// DELETE /unavailability/{id}              -> remove_unavailability
/// GET    /blocks                           -> list_blocks (?from&to)
/// POST   /blocks                           -> create_block
/// GET    /settings                         -> get_settings
/// PUT    /settings                         -> update_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/interventions",
            get(interventions::list).post(interventions::create),
        )
        .route(
            "/interventions/{id}",
            put(interventions::update).delete(interventions::delete),
        )
        .route(
            "/interventions/{id}/reschedule",
            patch(interventions::reschedule),
        )
        .route("/interventions/{id}/cancel", post(interventions::cancel))
        .route(
            "/interventions/{id}/recurrence",
            post(interventions::create_recurrence),
        )
        .route("/interventions/{id}/accept", post(interventions::accept))
        .route("/interventions/{id}/reject", post(interventions::reject))
        .route("/check-conflicts", post(interventions::check_conflicts))
        .route(
            "/availability",
            get(availability::get_availability).put(availability::update_availability),
        )
        .route(
            "/unavailability",
            get(availability::list_unavailability).post(availability::add_unavailability),
        )
        .route(
            "/unavailability/{id}",
            delete(availability::remove_unavailability),
        )
        .route(
            "/blocks",
            get(availability::list_blocks).post(availability::create_block),
        )
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
}
