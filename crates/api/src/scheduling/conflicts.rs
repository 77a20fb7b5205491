//! Conflict detection for a candidate time range.

use assist_core::conflict::{find_conflicts, ConflictEntry, ConflictKind, TimeRange};
use assist_core::types::{DbId, Timestamp};
use assist_db::models::availability::AvailabilityException;
use assist_db::models::calendar_block::CalendarBlock;
use assist_db::models::intervention::InterventionDetail;
use assist_db::repositories::{CalendarBlockRepo, ExceptionRepo, InterventionRepo};
use assist_db::DbPool;
use serde::Deserialize;

use crate::error::AppResult;

/// Body of `POST /calendar/check-conflicts`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictQuery {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Intervention being edited; never reported against itself.
    pub exclude_intervention_id: Option<DbId>,
    /// Also report overlapping calendar blocks and days off.
    #[serde(default)]
    pub include_unavailability: bool,
}

/// Everything that overlaps `[start_date, end_date)` for `professional_id`.
///
/// Interventions come first, ordered by start, then blocks and days off
/// when requested. An empty result means the slot is free.
pub async fn detect(
    pool: &DbPool,
    professional_id: DbId,
    query: &ConflictQuery,
) -> AppResult<Vec<ConflictEntry>> {
    let candidate = TimeRange::new(query.start_date, query.end_date)?;

    let existing = InterventionRepo::find_blocking(
        pool,
        professional_id,
        &candidate,
        query.exclude_intervention_id,
    )
    .await?;

    let mut conflicts: Vec<ConflictEntry> = find_conflicts(&candidate, &existing)
        .into_iter()
        .map(intervention_entry)
        .collect();

    if query.include_unavailability {
        let (blocks, days_off) = tokio::try_join!(
            CalendarBlockRepo::find_overlapping(pool, professional_id, &candidate),
            ExceptionRepo::list_non_working(
                pool,
                professional_id,
                candidate.start.date_naive(),
                candidate.end.date_naive(),
            ),
        )?;

        conflicts.extend(find_conflicts(&candidate, &blocks).into_iter().map(block_entry));
        conflicts.extend(
            days_off
                .iter()
                .filter(|day| TimeRange::whole_day(day.date).overlaps(&candidate))
                .map(exception_entry),
        );
    }

    tracing::debug!(
        professional_id,
        start = %candidate.start,
        end = %candidate.end,
        conflicts = conflicts.len(),
        "Checked conflicts"
    );
    Ok(conflicts)
}

fn intervention_entry(detail: &InterventionDetail) -> ConflictEntry {
    let i = &detail.intervention;
    ConflictEntry {
        kind: ConflictKind::Intervention,
        id: i.id,
        start: i.proposed_date,
        end: i.end(),
        title: Some(detail.request_title.clone()),
        client_name: Some(detail.client_name.clone()),
        category_name: detail.category_name.clone(),
        status: i.status().ok(),
    }
}

fn block_entry(block: &CalendarBlock) -> ConflictEntry {
    ConflictEntry {
        kind: ConflictKind::Block,
        id: block.id,
        start: block.start_date_time,
        end: block.end_date_time,
        title: block.reason.clone(),
        client_name: None,
        category_name: None,
        status: None,
    }
}

fn exception_entry(day: &AvailabilityException) -> ConflictEntry {
    let range = TimeRange::whole_day(day.date);
    ConflictEntry {
        kind: ConflictKind::Exception,
        id: day.id,
        start: range.start,
        end: range.end,
        title: day.reason.clone(),
        client_name: None,
        category_name: None,
        status: None,
    }
}
