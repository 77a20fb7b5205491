//! Intervention lifecycle: create, update, reschedule, cancel and the
//! client's accept / reject.
//!
//! Every mutation is persisted first; the notification is queued afterwards
//! through [`Notifier`](assist_events::Notifier), whose failures are logged
//! and never fail the mutation.

use assist_core::conflict::{effective_end, TimeRange};
use assist_core::error::CoreError;
use assist_core::notifications;
use assist_core::scheduling::{
    state_machine, validate_duration, InterventionStatus, DEFAULT_DURATION_MINS,
};
use assist_core::types::{DbId, Timestamp};
use assist_db::models::intervention::{
    CreateIntervention, Intervention, InterventionDetail, UpdateIntervention,
};
use assist_db::repositories::{InterventionRepo, ServiceRequestRepo};
use assist_db::DbPool;
use assist_events::bus::event_types;
use assist_events::PlatformEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use super::load_owned;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /calendar/interventions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInterventionRequest {
    pub request_id: Option<DbId>,
    pub proposed_date: Timestamp,
    /// Explicit end. When absent the end is derived from the duration.
    pub end_date: Option<Timestamp>,
    pub estimated_duration: Option<i32>,
    /// `pending` (default) or `confirmed`.
    pub status: Option<InterventionStatus>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Body of `PUT /calendar/interventions/{id}`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInterventionRequest {
    pub proposed_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub status: Option<InterventionStatus>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub client_confirmed: Option<bool>,
    pub client_decline_reason: Option<String>,
    pub expected_version: Option<i32>,
}

/// Body of `PATCH /calendar/interventions/{id}/reschedule`.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub expected_version: Option<i32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_detail(pool: &DbPool, id: DbId) -> AppResult<InterventionDetail> {
    InterventionRepo::find_detail(pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Intervention",
                id,
            }
            .into()
        })
}

fn stale_version(id: DbId, expected: Option<i32>) -> AppError {
    let expected = expected.map_or_else(|| "?".to_string(), |v| v.to_string());
    CoreError::Conflict(format!(
        "Intervention {id} was modified concurrently (expected version {expected})"
    ))
    .into()
}

/// The row left `from` between the read and the guarded write.
fn status_changed(id: DbId, from: InterventionStatus) -> AppError {
    CoreError::Conflict(format!(
        "Intervention {id} is no longer {from}; reload and retry"
    ))
    .into()
}

/// Minutes in `range` as a validated duration.
fn range_minutes(range: &TimeRange) -> Result<i32, CoreError> {
    let minutes = i32::try_from(range.duration_minutes()).unwrap_or(i32::MAX);
    validate_duration(minutes)?;
    Ok(minutes)
}

fn publish(state: &AppState, event_type: &str, intervention: &Intervention, actor: DbId) {
    state.event_bus.publish(
        PlatformEvent::intervention(event_type, intervention.id, actor).with_payload(json!({
            "professional_id": intervention.professional_id,
            "request_id": intervention.request_id,
            "status": intervention.status,
            "version": intervention.version,
        })),
    );
}

fn notification_payload(intervention: &Intervention) -> serde_json::Value {
    json!({
        "intervention_id": intervention.id,
        "request_id": intervention.request_id,
        "proposed_date": intervention.proposed_date,
    })
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Schedule a new intervention for a request owned by `professional_id`.
pub async fn create(
    state: &AppState,
    professional_id: DbId,
    input: CreateInterventionRequest,
) -> AppResult<InterventionDetail> {
    let request_id = input
        .request_id
        .ok_or_else(|| CoreError::Validation("request_id is required".into()))?;

    let request = ServiceRequestRepo::find_with_parties(&state.pool, request_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ServiceRequest",
            id: request_id,
        })?;

    if request.professional_id != Some(professional_id) {
        return Err(CoreError::Forbidden("You are not authorized for this request".into()).into());
    }

    let (confirmed_date, duration) = match input.end_date {
        Some(end) => {
            let range = TimeRange::new(input.proposed_date, end)?;
            let duration = match input.estimated_duration {
                Some(d) => {
                    validate_duration(d)?;
                    d
                }
                None => range_minutes(&range)?,
            };
            (Some(end), duration)
        }
        None => {
            let duration = input.estimated_duration.unwrap_or(DEFAULT_DURATION_MINS);
            validate_duration(duration)?;
            (None, duration)
        }
    };

    let status = input.status.unwrap_or(InterventionStatus::Pending);
    state_machine::validate_initial(status)?;

    let intervention = InterventionRepo::create(
        &state.pool,
        &CreateIntervention {
            request_id,
            professional_id,
            proposed_date: input.proposed_date,
            confirmed_date,
            estimated_duration: Some(duration),
            status: Some(status.as_str().to_string()),
            description: input.description,
            notes: input.notes,
            created_by: Some(professional_id),
            parent_intervention_id: None,
        },
    )
    .await?;

    tracing::info!(
        intervention_id = intervention.id,
        professional_id,
        request_id,
        start = %intervention.proposed_date,
        "Intervention created"
    );
    publish(state, event_types::INTERVENTION_CREATED, &intervention, professional_id);

    state
        .notifier
        .notify(
            request.client_id,
            notifications::INTERVENTION_SCHEDULED,
            notifications::scheduled(intervention.proposed_date),
            notification_payload(&intervention),
        )
        .await;

    load_detail(&state.pool, intervention.id).await
}

/// Partial update. Does not run conflict detection.
pub async fn update(
    state: &AppState,
    id: DbId,
    professional_id: DbId,
    input: UpdateInterventionRequest,
) -> AppResult<InterventionDetail> {
    let current = load_owned(&state.pool, id, professional_id).await?;
    let status = current.status()?;

    if let Some(next) = input.status {
        // Cancelling and the client's answer have their own endpoints, which
        // notify the other party.
        match next {
            _ if next == status => {}
            InterventionStatus::Cancelled => {
                return Err(CoreError::Validation(
                    "Use the cancel endpoint to cancel an intervention".into(),
                )
                .into());
            }
            InterventionStatus::Rejected => {
                return Err(CoreError::Validation(
                    "Only the client can reject an intervention".into(),
                )
                .into());
            }
            _ => state_machine::validate_transition(status, next)?,
        }
    }
    let moves_slot = input.proposed_date.is_some()
        || input.end_date.is_some()
        || input.estimated_duration.is_some();
    if moves_slot && status.is_terminal() {
        return Err(CoreError::Validation(format!(
            "Cannot change the dates of a {status} intervention"
        ))
        .into());
    }
    for minutes in [input.estimated_duration, input.actual_duration]
        .into_iter()
        .flatten()
    {
        validate_duration(minutes)?;
    }

    let start = input.proposed_date.unwrap_or(current.proposed_date);
    let end = effective_end(
        start,
        input.end_date.or(current.confirmed_date),
        Some(input.estimated_duration.unwrap_or(current.estimated_duration)),
    );
    TimeRange::new(start, end)?;

    let changes = UpdateIntervention {
        proposed_date: input.proposed_date,
        confirmed_date: input.end_date,
        estimated_duration: input.estimated_duration,
        actual_duration: input.actual_duration,
        status: input.status.map(|s| s.as_str().to_string()),
        description: input.description,
        notes: input.notes,
        client_confirmed: input.client_confirmed,
        client_decline_reason: input.client_decline_reason,
    };

    let updated = InterventionRepo::update(&state.pool, id, &changes, input.expected_version)
        .await?
        .ok_or_else(|| stale_version(id, input.expected_version))?;

    tracing::info!(
        intervention_id = id,
        professional_id,
        version = updated.version,
        "Intervention updated"
    );
    publish(state, event_types::INTERVENTION_UPDATED, &updated, professional_id);

    load_detail(&state.pool, id).await
}

/// Move an intervention to `[start_date, end_date)` and notify the client.
pub async fn reschedule(
    state: &AppState,
    id: DbId,
    professional_id: DbId,
    input: RescheduleRequest,
) -> AppResult<InterventionDetail> {
    let current = load_owned(&state.pool, id, professional_id).await?;

    let status = current.status()?;
    if status.is_terminal() {
        return Err(
            CoreError::Validation(format!("Cannot reschedule a {status} intervention")).into(),
        );
    }
    // Parties are read before the write so the notification never depends
    // on a query after the commit.
    let before = load_detail(&state.pool, id).await?;
    let range = TimeRange::new(input.start_date, input.end_date)?;

    let updated = InterventionRepo::reschedule(
        &state.pool,
        id,
        range.start,
        range.end,
        input.expected_version,
    )
    .await?
    .ok_or_else(|| stale_version(id, input.expected_version))?;

    tracing::info!(
        intervention_id = id,
        professional_id,
        from = %current.proposed_date,
        to = %range.start,
        "Intervention rescheduled"
    );
    publish(state, event_types::INTERVENTION_RESCHEDULED, &updated, professional_id);

    state
        .notifier
        .notify(
            before.client_id,
            notifications::INTERVENTION_RESCHEDULED,
            notifications::rescheduled(range.start),
            notification_payload(&updated),
        )
        .await;

    Ok(InterventionDetail {
        intervention: updated,
        ..before
    })
}

/// Cancel an intervention. Cancelling twice is a no-op.
pub async fn cancel(
    state: &AppState,
    id: DbId,
    professional_id: DbId,
    reason: Option<String>,
) -> AppResult<InterventionDetail> {
    let current = load_owned(&state.pool, id, professional_id).await?;

    let status = current.status()?;
    if status == InterventionStatus::Cancelled {
        return load_detail(&state.pool, id).await;
    }
    state_machine::validate_transition(status, InterventionStatus::Cancelled)?;
    let before = load_detail(&state.pool, id).await?;

    let reason = reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let note = match reason {
        Some(r) => format!("Cancelled: {r}"),
        None => "Intervention cancelled".to_string(),
    };

    let updated = InterventionRepo::set_status(
        &state.pool,
        id,
        status,
        InterventionStatus::Cancelled,
        Some(&note),
    )
    .await?
    .ok_or_else(|| status_changed(id, status))?;

    tracing::info!(intervention_id = id, professional_id, "Intervention cancelled");
    publish(state, event_types::INTERVENTION_CANCELLED, &updated, professional_id);

    state
        .notifier
        .notify(
            before.client_id,
            notifications::INTERVENTION_CANCELLED,
            notifications::cancelled(reason),
            notification_payload(&updated),
        )
        .await;

    Ok(InterventionDetail {
        intervention: updated,
        ..before
    })
}

/// Load an intervention on behalf of the request's client.
async fn load_for_client(
    pool: &DbPool,
    id: DbId,
    client_id: DbId,
) -> AppResult<InterventionDetail> {
    let detail = load_detail(pool, id).await?;
    if detail.client_id != client_id {
        return Err(CoreError::Forbidden(
            "You are not authorized to respond to this intervention".into(),
        )
        .into());
    }
    Ok(detail)
}

/// The client accepts the proposed slot.
pub async fn accept(state: &AppState, id: DbId, client_id: DbId) -> AppResult<InterventionDetail> {
    let detail = load_for_client(&state.pool, id, client_id).await?;
    let status = detail.intervention.status()?;
    state_machine::validate_transition(status, InterventionStatus::Confirmed)?;

    let updated = InterventionRepo::record_client_response(
        &state.pool,
        id,
        status,
        InterventionStatus::Confirmed,
        true,
        None,
    )
    .await?
    .ok_or_else(|| status_changed(id, status))?;

    tracing::info!(intervention_id = id, client_id, "Intervention accepted by client");
    publish(state, event_types::INTERVENTION_ACCEPTED, &updated, client_id);

    state
        .notifier
        .notify(
            updated.professional_id,
            notifications::INTERVENTION_ACCEPTED,
            notifications::accepted(&detail.client_name, updated.proposed_date),
            notification_payload(&updated),
        )
        .await;

    Ok(InterventionDetail {
        intervention: updated,
        ..detail
    })
}

/// The client declines the proposed slot.
pub async fn reject(
    state: &AppState,
    id: DbId,
    client_id: DbId,
    reason: Option<String>,
) -> AppResult<InterventionDetail> {
    let detail = load_for_client(&state.pool, id, client_id).await?;
    let status = detail.intervention.status()?;
    state_machine::validate_transition(status, InterventionStatus::Rejected)?;

    let reason = reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let updated = InterventionRepo::record_client_response(
        &state.pool,
        id,
        status,
        InterventionStatus::Rejected,
        false,
        reason,
    )
    .await?
    .ok_or_else(|| status_changed(id, status))?;

    tracing::info!(intervention_id = id, client_id, "Intervention rejected by client");
    publish(state, event_types::INTERVENTION_REJECTED, &updated, client_id);

    state
        .notifier
        .notify(
            updated.professional_id,
            notifications::INTERVENTION_REJECTED,
            notifications::rejected(&detail.client_name, updated.proposed_date, reason),
            notification_payload(&updated),
        )
        .await;

    Ok(InterventionDetail {
        intervention: updated,
        ..detail
    })
}
