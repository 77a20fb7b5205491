//! Reconciliation planning between local interventions and remote events.
//!
//! Pure functions: the service fetches both sides, asks the planner what to
//! push and what to pull, then performs the writes.

use std::collections::HashSet;

use assist_core::conflict::TimeRange;
use assist_core::types::DbId;

use crate::api::{EventDateTime, ExtendedProperties, NewRemoteEvent, RemoteEvent};

/// Private extended property carrying the local intervention id on events
/// we create.
pub const PRIVATE_TAG_KEY: &str = "assist_intervention_id";

/// A local intervention as seen by the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalItem {
    pub intervention_id: DbId,
    pub external_event_id: Option<String>,
    pub range: TimeRange,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl LocalItem {
    /// The event body used when exporting this item.
    pub fn to_remote(&self) -> NewRemoteEvent {
        let mut properties = ExtendedProperties::default();
        properties
            .private
            .insert(PRIVATE_TAG_KEY.to_string(), self.intervention_id.to_string());
        NewRemoteEvent {
            summary: self.summary.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start: EventDateTime::timed(self.range.start),
            end: EventDateTime::timed(self.range.end),
            extended_properties: properties,
        }
    }
}

/// A remote event to mirror locally as a calendar block.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub external_event_id: String,
    pub range: TimeRange,
    pub summary: Option<String>,
}

fn tagged_id(event: &RemoteEvent) -> Option<&str> {
    event.private_property(PRIVATE_TAG_KEY)
}

/// Local items with no live remote counterpart.
///
/// A counterpart is a non-cancelled remote event whose id equals the item's
/// `external_event_id`, or that carries the item's id in its private tag.
pub fn plan_export<'a>(local: &'a [LocalItem], remote: &[RemoteEvent]) -> Vec<&'a LocalItem> {
    let live: Vec<&RemoteEvent> = remote.iter().filter(|e| !e.is_cancelled()).collect();
    let live_ids: HashSet<&str> = live.iter().map(|e| e.id.as_str()).collect();
    let tagged: HashSet<&str> = live.iter().filter_map(|e| tagged_id(e)).collect();

    local
        .iter()
        .filter(|item| {
            let linked = item
                .external_event_id
                .as_deref()
                .is_some_and(|id| live_ids.contains(id));
            let id = item.intervention_id.to_string();
            !linked && !tagged.contains(id.as_str())
        })
        .collect()
}

/// Remote events that should become local blocks.
///
/// Skips cancelled events, all-day events, events we created (tagged) and
/// events already linked to a local intervention.
pub fn plan_import(remote: &[RemoteEvent], linked_ids: &HashSet<String>) -> Vec<ImportCandidate> {
    remote
        .iter()
        .filter(|e| !e.is_cancelled() && tagged_id(e).is_none() && !linked_ids.contains(&e.id))
        .filter_map(|e| {
            Some(ImportCandidate {
                external_event_id: e.id.clone(),
                range: e.timed_range()?,
                summary: e.summary.clone(),
            })
        })
        .collect()
}
