//! Recurring series anchored on an existing intervention.

use assist_core::conflict::{Occupies, TimeRange};
use assist_core::error::CoreError;
use assist_core::notifications;
use assist_core::recurrence::{plan_series, RecurrencePattern, SkippedOccurrence};
use assist_core::scheduling::InterventionStatus;
use assist_core::types::DbId;
use assist_db::models::intervention::{CreateIntervention, Intervention};
use assist_db::repositories::{InterventionRepo, ServiceRequestRepo};
use assist_events::bus::event_types;
use assist_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;
use super::load_owned;

/// Outcome of a series creation: what was inserted and what was not.
#[derive(Debug, Serialize)]
pub struct SeriesReport {
    pub parent_id: DbId,
    pub created: Vec<Intervention>,
    pub skipped: Vec<SkippedOccurrence>,
}

/// Expand `pattern` from intervention `parent_id` and insert every
/// occurrence that does not conflict.
///
/// Occurrences keep the parent's duration, request and description and
/// start as `pending`. Conflicting ones are reported in `skipped`; the
/// call only fails when the pattern itself is invalid.
pub async fn create_series(
    state: &AppState,
    parent_id: DbId,
    professional_id: DbId,
    pattern: &RecurrencePattern,
) -> AppResult<SeriesReport> {
    let parent = load_owned(&state.pool, parent_id, professional_id).await?;
    if parent.status()?.is_terminal() {
        return Err(CoreError::Validation(format!(
            "Cannot repeat a {} intervention",
            parent.status
        ))
        .into());
    }

    let duration = parent.end() - parent.proposed_date;
    let occurrences = pattern
        .expand(parent.proposed_date)?
        .into_iter()
        .map(|start| TimeRange::new(start, start + duration))
        .collect::<Result<Vec<_>, _>>()?;

    let (Some(first), Some(last)) = (occurrences.first(), occurrences.last()) else {
        return Ok(SeriesReport {
            parent_id,
            created: Vec::new(),
            skipped: Vec::new(),
        });
    };
    let span = TimeRange {
        start: first.start,
        end: last.end,
    };

    let existing: Vec<(DbId, TimeRange)> =
        InterventionRepo::find_blocking(&state.pool, professional_id, &span, None)
            .await?
            .iter()
            .map(|d| (d.intervention.id, d.intervention.occupied_range()))
            .collect();

    let plan = plan_series(&occurrences, &existing);

    let inputs: Vec<CreateIntervention> = plan
        .accepted
        .iter()
        .map(|occ| CreateIntervention {
            request_id: parent.request_id,
            professional_id,
            proposed_date: occ.start,
            confirmed_date: parent.confirmed_date.map(|_| occ.end),
            estimated_duration: Some(parent.estimated_duration),
            status: Some(InterventionStatus::Pending.as_str().to_string()),
            description: parent.description.clone(),
            notes: parent.notes.clone(),
            created_by: Some(professional_id),
            parent_intervention_id: Some(parent.id),
        })
        .collect();

    let created = if inputs.is_empty() {
        Vec::new()
    } else {
        InterventionRepo::create_many(&state.pool, &inputs).await?
    };

    tracing::info!(
        parent_id,
        professional_id,
        created = created.len(),
        skipped = plan.skipped.len(),
        "Recurring series created"
    );

    if let Some(first_created) = created.first() {
        state.event_bus.publish(
            PlatformEvent::intervention(event_types::SERIES_CREATED, parent_id, professional_id)
                .with_payload(json!({
                    "created_ids": created.iter().map(|i| i.id).collect::<Vec<_>>(),
                    "skipped": plan.skipped.len(),
                })),
        );

        // The series is committed; a failed lookup only costs the notification.
        match ServiceRequestRepo::find_with_parties(&state.pool, parent.request_id).await {
            Ok(Some(request)) => {
                state
                    .notifier
                    .notify(
                        request.client_id,
                        notifications::INTERVENTION_SERIES_SCHEDULED,
                        notifications::series_scheduled(
                            created.len(),
                            first_created.proposed_date,
                        ),
                        json!({
                            "parent_intervention_id": parent_id,
                            "request_id": parent.request_id,
                            "count": created.len(),
                        }),
                    )
                    .await;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(
                parent_id,
                request_id = parent.request_id,
                error = %e,
                "Could not resolve the client for the series notification"
            ),
        }
    }

    Ok(SeriesReport {
        parent_id,
        created,
        skipped: plan.skipped,
    })
}
