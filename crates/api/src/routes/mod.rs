pub mod calendar;
pub mod google;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /calendar/interventions                          list, create
/// /calendar/interventions/{id}                     update (PUT), cancel (DELETE)
/// /calendar/interventions/{id}/reschedule          reschedule (PATCH)
/// /calendar/interventions/{id}/cancel              cancel (POST)
/// /calendar/interventions/{id}/recurrence          create series (POST)
/// /calendar/interventions/{id}/accept              client accepts (POST)
/// /calendar/interventions/{id}/reject              client rejects (POST)
/// /calendar/check-conflicts                        conflict report (POST)
///
/// /calendar/availability                           weekly windows (GET, PUT)
/// /calendar/unavailability                         days off (GET, POST)
/// /calendar/unavailability/{id}                    remove a day off (DELETE)
/// /calendar/blocks                                 blocks (GET, POST)
/// /calendar/settings                               preferences (GET, PUT)
///
/// /calendar/google/config                          credentials configured?
/// /calendar/google/auth-url                        OAuth consent URL
/// /calendar/google/callback                        OAuth redirect (public)
/// /calendar/google/sync                            two-way sync (POST)
/// /calendar/google/status                          connection status
/// /calendar/google/calendars                       remote calendars
/// /calendar/google/disconnect                      disconnect (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest(
        "/calendar",
        calendar::router().nest("/google", google::router()),
    )
}
