//! Handlers for `/calendar/settings`.

use assist_core::calendar_settings::{
    validate_bounded, validate_color_scheme, validate_day_bounds, validate_reminder_timing,
    validate_view,
};
use assist_core::error::CoreError;
use assist_db::models::calendar_settings::{CalendarSettings, UpdateCalendarSettings};
use assist_db::repositories::CalendarSettingsRepo;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireProfessional;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/calendar/settings
///
/// Creates the default row on first access.
pub async fn get_settings(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let settings = CalendarSettingsRepo::get_or_create(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/calendar/settings
///
/// Partial update; omitted fields keep their value.
pub async fn update_settings(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Json(mut input): Json<UpdateCalendarSettings>,
) -> AppResult<impl IntoResponse> {
    let current = CalendarSettingsRepo::get_or_create(&state.pool, user.user_id).await?;
    validate_update(&current, &mut input)?;

    let settings = CalendarSettingsRepo::update(&state.pool, user.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CalendarSettings",
            id: current.id,
        }))?;

    tracing::info!(professional_id = user.user_id, "Calendar settings updated");

    Ok(Json(DataResponse { data: settings }))
}

/// Check each provided field and normalize the day bounds in place.
///
/// `min_time`/`max_time` are checked as a pair, falling back to the stored
/// value for whichever side was omitted.
fn validate_update(
    current: &CalendarSettings,
    input: &mut UpdateCalendarSettings,
) -> Result<(), CoreError> {
    if let Some(view) = &input.default_view {
        validate_view(view)?;
    }
    if let Some(day) = input.week_starts_on {
        validate_bounded("week_starts_on", day.into(), 0, 6)?;
    }
    if let Some(v) = input.time_slot_duration {
        validate_bounded("time_slot_duration", v.into(), 15, 120)?;
    }
    if let Some(v) = input.default_intervention_duration {
        validate_bounded("default_intervention_duration", v.into(), 15, 480)?;
    }
    if let Some(v) = input.default_buffer_time {
        validate_bounded("default_buffer_time", v.into(), 0, 120)?;
    }
    if let Some(v) = input.max_concurrent_interventions {
        validate_bounded("max_concurrent_interventions", v.into(), 1, 10)?;
    }
    if let Some(timing) = &input.reminder_timing {
        validate_reminder_timing(timing)?;
    }
    if let Some(scheme) = &input.color_scheme {
        validate_color_scheme(scheme)?;
    }
    if let Some(tz) = &input.time_zone {
        if tz.trim().is_empty() {
            return Err(CoreError::Validation("time_zone must not be empty".into()));
        }
    }

    if input.min_time.is_some() || input.max_time.is_some() {
        let min = input.min_time.as_deref().unwrap_or(&current.min_time);
        let max = input.max_time.as_deref().unwrap_or(&current.max_time);
        let (min, max) = validate_day_bounds(min, max)?;
        input.min_time = Some(min);
        input.max_time = Some(max);
    }
    Ok(())
}
