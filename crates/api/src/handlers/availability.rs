//! Handlers for weekly availability, days off and calendar blocks.
//!
//! All three are owned by the authenticated professional; none of them is
//! consulted by conflict detection unless the caller asks for it.

use assist_core::availability::{exception_dates, validate_week, WindowInput};
use assist_core::conflict::TimeRange;
use assist_core::error::CoreError;
use assist_core::types::{DbId, Timestamp};
use assist_db::models::availability::CreateUnavailability;
use assist_db::models::calendar_block::CreateCalendarBlock;
use assist_db::repositories::{AvailabilityRepo, CalendarBlockRepo, ExceptionRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireProfessional;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `PUT /calendar/availability`.
#[derive(Debug, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub windows: Vec<WindowInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeRangeQuery {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Weekly availability
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar/availability
///
/// Always seven rows; days never configured get their defaults on first read.
pub async fn get_availability(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    AvailabilityRepo::ensure_defaults(&state.pool, user.user_id).await?;
    let week = AvailabilityRepo::list(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: week }))
}

/// PUT /api/v1/calendar/availability
///
/// Upserts the submitted days and returns the whole week.
pub async fn update_availability(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Json(input): Json<UpdateAvailabilityRequest>,
) -> AppResult<impl IntoResponse> {
    let windows = validate_week(&input.windows)?;

    AvailabilityRepo::upsert_week(&state.pool, user.user_id, &windows).await?;
    AvailabilityRepo::ensure_defaults(&state.pool, user.user_id).await?;
    let week = AvailabilityRepo::list(&state.pool, user.user_id).await?;

    tracing::info!(
        professional_id = user.user_id,
        days = windows.len(),
        "Availability updated"
    );

    Ok(Json(DataResponse { data: week }))
}

// ---------------------------------------------------------------------------
// Unavailability (days off)
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar/unavailability?from&to
///
/// `from` defaults to today (UTC).
pub async fn list_unavailability(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> AppResult<impl IntoResponse> {
    let from = params.from.unwrap_or_else(|| Utc::now().date_naive());
    let days = ExceptionRepo::list(&state.pool, user.user_id, Some(from), params.to).await?;
    Ok(Json(DataResponse { data: days }))
}

/// POST /api/v1/calendar/unavailability
///
/// One row per calendar day in `[start_date, end_date]`.
pub async fn add_unavailability(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Json(input): Json<CreateUnavailability>,
) -> AppResult<impl IntoResponse> {
    let dates = exception_dates(input.start_date, input.end_date)?;
    let reason = input.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

    let days = ExceptionRepo::upsert_days_off(&state.pool, user.user_id, &dates, reason).await?;

    tracing::info!(
        professional_id = user.user_id,
        start = %input.start_date,
        end = %input.end_date,
        days = days.len(),
        "Unavailability added"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: days })))
}

/// DELETE /api/v1/calendar/unavailability/{id}
pub async fn remove_unavailability(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let day = ExceptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AvailabilityException",
            id,
        }))?;

    if day.professional_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not authorized to manage this exception".into(),
        )));
    }

    ExceptionRepo::delete(&state.pool, id).await?;
    tracing::info!(
        professional_id = user.user_id,
        exception_id = id,
        date = %day.date,
        "Unavailability removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Calendar blocks
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar/blocks?from&to
pub async fn list_blocks(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Query(params): Query<TimeRangeQuery>,
) -> AppResult<impl IntoResponse> {
    let blocks = CalendarBlockRepo::list(&state.pool, user.user_id, params.from, params.to).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// POST /api/v1/calendar/blocks
pub async fn create_block(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Json(input): Json<CreateCalendarBlock>,
) -> AppResult<impl IntoResponse> {
    TimeRange::new(input.start_date_time, input.end_date_time)?;

    let block = CalendarBlockRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        professional_id = user.user_id,
        block_id = block.id,
        start = %block.start_date_time,
        "Calendar block created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: block })))
}
