//! Handlers for `/calendar/google`.
//!
//! Thin wrappers over [`assist_gcal::CalendarSyncService`]. Integration
//! failures surface as 502 `CALENDAR_INTEGRATION_UNAVAILABLE`.

use assist_core::error::CoreError;
use assist_events::bus::event_types;
use assist_events::PlatformEvent;
use assist_gcal::service::SyncOptions;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireProfessional;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConfigStatus {
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthUrl {
    pub auth_url: String,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResult {
    pub disconnected: bool,
}

/// Query string Google appends when redirecting back.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/v1/calendar/google/config
pub async fn config(
    RequireProfessional(_user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let configured = state.calendar_sync.config_status().await;
    Ok(Json(DataResponse {
        data: ConfigStatus { configured },
    }))
}

/// GET /api/v1/calendar/google/auth-url
pub async fn auth_url(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let auth_url = state.calendar_sync.auth_url(user.user_id).await?;
    Ok(Json(DataResponse {
        data: AuthUrl { auth_url },
    }))
}

/// GET /api/v1/calendar/google/callback?code&state
///
/// Public: the signed `state` identifies the professional.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(error) = params.error {
        return Err(CoreError::Validation(format!("Authorization was denied: {error}")).into());
    }
    let (Some(code), Some(state_param)) = (params.code, params.state) else {
        return Err(CoreError::Validation("code and state are required".into()).into());
    };

    let outcome = state
        .calendar_sync
        .handle_callback(&code, &state_param)
        .await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/calendar/google/sync
///
/// The body is optional: `{calendar_id?, from?, to?}`.
pub async fn sync(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    body: Option<Json<SyncOptions>>,
) -> AppResult<impl IntoResponse> {
    let options = body.map(|Json(o)| o).unwrap_or_default();
    let report = state.calendar_sync.sync(user.user_id, &options).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::CALENDAR_SYNCED)
            .with_source("professional", user.user_id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "calendar_id": report.calendar_id,
                "exported": report.export.count,
                "imported": report.import.count,
            })),
    );

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/calendar/google/status
pub async fn status(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let status = state.calendar_sync.status(user.user_id).await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/calendar/google/calendars
pub async fn calendars(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let calendars = state.calendar_sync.list_calendars(user.user_id).await?;
    Ok(Json(DataResponse { data: calendars }))
}

/// POST /api/v1/calendar/google/disconnect
pub async fn disconnect(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let disconnected = state.calendar_sync.disconnect(user.user_id).await?;
    Ok(Json(DataResponse {
        data: DisconnectResult { disconnected },
    }))
}
