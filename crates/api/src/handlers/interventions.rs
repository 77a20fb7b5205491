//! Handlers for `/calendar/interventions` and `/calendar/check-conflicts`.

use assist_core::conflict::ConflictEntry;
use assist_core::recurrence::RecurrencePattern;
use assist_core::scheduling::InterventionStatus;
use assist_core::types::{DbId, Timestamp};
use assist_db::models::intervention::{InterventionDetail, InterventionFilter};
use assist_db::repositories::InterventionRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::{RequireClient, RequireProfessional};
use crate::response::DataResponse;
use crate::scheduling::conflicts::{self, ConflictQuery};
use crate::scheduling::lifecycle::{
    self, CreateInterventionRequest, RescheduleRequest, UpdateInterventionRequest,
};
use crate::scheduling::recurrence;
use crate::state::AppState;

/// An intervention as rendered on the calendar: the joined row plus its
/// computed end.
#[derive(Debug, Serialize)]
pub struct InterventionView {
    #[serde(flatten)]
    pub detail: InterventionDetail,
    pub end_date: Timestamp,
}

impl From<InterventionDetail> for InterventionView {
    fn from(detail: InterventionDetail) -> Self {
        let end_date = detail.intervention.end();
        Self { detail, end_date }
    }
}

/// Query parameters for the calendar listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub category: Option<DbId>,
    pub search: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Optional reason for a cancel or a client rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReasonBody {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictEntry>,
}

// ---------------------------------------------------------------------------
// Professional endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar/interventions
pub async fn list(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<InterventionStatus>)
        .transpose()?;

    let filter = InterventionFilter {
        status: status.map(|s| s.as_str().to_string()),
        category_id: params.category,
        search: params.search,
        from: params.from,
        to: params.to,
    };

    let items: Vec<InterventionView> =
        InterventionRepo::list_for_professional(&state.pool, user.user_id, &filter)
            .await?
            .into_iter()
            .map(InterventionView::from)
            .collect();

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/calendar/interventions
pub async fn create(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Json(input): Json<CreateInterventionRequest>,
) -> AppResult<impl IntoResponse> {
    let detail = lifecycle::create(&state, user.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InterventionView::from(detail),
        }),
    ))
}

/// PUT /api/v1/calendar/interventions/{id}
pub async fn update(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInterventionRequest>,
) -> AppResult<impl IntoResponse> {
    let detail = lifecycle::update(&state, id, user.user_id, input).await?;
    Ok(Json(DataResponse {
        data: InterventionView::from(detail),
    }))
}

/// PATCH /api/v1/calendar/interventions/{id}/reschedule
pub async fn reschedule(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RescheduleRequest>,
) -> AppResult<impl IntoResponse> {
    let detail = lifecycle::reschedule(&state, id, user.user_id, input).await?;
    Ok(Json(DataResponse {
        data: InterventionView::from(detail),
    }))
}

/// POST /api/v1/calendar/interventions/{id}/cancel
///
/// The body is optional; an empty request cancels without a reason.
pub async fn cancel(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ReasonBody>>,
) -> AppResult<impl IntoResponse> {
    let reason = body.and_then(|Json(b)| b.reason);
    let detail = lifecycle::cancel(&state, id, user.user_id, reason).await?;
    Ok(Json(DataResponse {
        data: InterventionView::from(detail),
    }))
}

/// DELETE /api/v1/calendar/interventions/{id}?reason=
///
/// Interventions are never removed; this cancels.
pub async fn delete(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ReasonBody>,
) -> AppResult<impl IntoResponse> {
    let detail = lifecycle::cancel(&state, id, user.user_id, params.reason).await?;
    Ok(Json(DataResponse {
        data: InterventionView::from(detail),
    }))
}

/// POST /api/v1/calendar/interventions/{id}/recurrence
pub async fn create_recurrence(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(pattern): Json<RecurrencePattern>,
) -> AppResult<impl IntoResponse> {
    let report = recurrence::create_series(&state, id, user.user_id, &pattern).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// POST /api/v1/calendar/check-conflicts
pub async fn check_conflicts(
    RequireProfessional(user): RequireProfessional,
    State(state): State<AppState>,
    Json(query): Json<ConflictQuery>,
) -> AppResult<impl IntoResponse> {
    let conflicts = conflicts::detect(&state.pool, user.user_id, &query).await?;
    Ok(Json(DataResponse {
        data: ConflictReport {
            has_conflicts: !conflicts.is_empty(),
            conflicts,
        },
    }))
}

// ---------------------------------------------------------------------------
// Client endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/calendar/interventions/{id}/accept
pub async fn accept(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = lifecycle::accept(&state, id, user.user_id).await?;
    Ok(Json(DataResponse {
        data: InterventionView::from(detail),
    }))
}

/// POST /api/v1/calendar/interventions/{id}/reject
pub async fn reject(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ReasonBody>>,
) -> AppResult<impl IntoResponse> {
    let reason = body.and_then(|Json(b)| b.reason);
    let detail = lifecycle::reject(&state, id, user.user_id, reason).await?;
    Ok(Json(DataResponse {
        data: InterventionView::from(detail),
    }))
}
