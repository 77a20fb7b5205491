//! Time ranges and the overlap rules used by conflict detection.
//!
//! All ranges are half-open `[start, end)`: two ranges that merely touch
//! (one ends exactly when the other starts) do not conflict.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scheduling::{InterventionStatus, DEFAULT_DURATION_MINS};
use crate::types::{DbId, Timestamp};

/// A validated half-open time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted ones.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::Validation(
                "End date must be after start date".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// The full UTC day `[00:00, 24:00)` of `date`.
    pub fn whole_day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// `self.start < other.end && self.end > other.start`.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// End of an intervention: the confirmed date if set, else start plus the
/// estimated duration (60 minutes when unknown).
pub fn effective_end(
    proposed_date: Timestamp,
    confirmed_date: Option<Timestamp>,
    estimated_duration: Option<i32>,
) -> Timestamp {
    confirmed_date.unwrap_or_else(|| {
        proposed_date
            + Duration::minutes(i64::from(
                estimated_duration.unwrap_or(DEFAULT_DURATION_MINS),
            ))
    })
}

// ---------------------------------------------------------------------------
// Conflict detection
// ---------------------------------------------------------------------------

/// Anything that occupies a professional's time.
pub trait Occupies {
    fn occupied_range(&self) -> TimeRange;

    /// Whether this item currently blocks its range. Terminal interventions
    /// stay on the calendar but never block.
    fn blocks_slot(&self) -> bool {
        true
    }
}

/// Items in `existing` that block and overlap `candidate`, in input order.
pub fn find_conflicts<'a, T: Occupies>(candidate: &TimeRange, existing: &'a [T]) -> Vec<&'a T> {
    existing
        .iter()
        .filter(|item| item.blocks_slot() && item.occupied_range().overlaps(candidate))
        .collect()
}

/// Whether an intervention in `status` can conflict with anything.
pub fn status_blocks(status: InterventionStatus) -> bool {
    !status.is_terminal()
}

/// Source of a reported conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Intervention,
    Block,
    Exception,
}

/// One entry of a conflict report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictEntry {
    pub kind: ConflictKind,
    pub id: DbId,
    pub start: Timestamp,
    pub end: Timestamp,
    pub title: Option<String>,
    pub client_name: Option<String>,
    pub category_name: Option<String>,
    pub status: Option<InterventionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 15, h, m, 0).unwrap()
    }

    fn range(sh: u32, sm: u32, eh: u32, em: u32) -> TimeRange {
        TimeRange::new(at(sh, sm), at(eh, em)).unwrap()
    }

    struct Slot {
        range: TimeRange,
        status: InterventionStatus,
    }

    impl Occupies for Slot {
        fn occupied_range(&self) -> TimeRange {
            self.range
        }
        fn blocks_slot(&self) -> bool {
            status_blocks(self.status)
        }
    }

    // -----------------------------------------------------------------------
    // TimeRange
    // -----------------------------------------------------------------------

    #[test]
    fn new_rejects_inverted_and_empty_ranges() {
        assert!(TimeRange::new(at(11, 0), at(10, 0)).is_err());
        assert!(TimeRange::new(at(10, 0), at(10, 0)).is_err());
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = range(10, 0, 11, 0);
        let b = range(10, 30, 11, 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let a = range(10, 0, 11, 0);
        let b = range(11, 0, 12, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn containment_overlaps() {
        let outer = range(9, 0, 12, 0);
        let inner = range(10, 0, 10, 15);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn whole_day_covers_utc_day() {
        let day = TimeRange::whole_day(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
        assert_eq!(day.start, at(0, 0));
        assert_eq!(day.duration_minutes(), 24 * 60);
    }

    // -----------------------------------------------------------------------
    // effective_end
    // -----------------------------------------------------------------------

    #[test]
    fn effective_end_prefers_confirmed_date() {
        assert_eq!(effective_end(at(10, 0), Some(at(12, 0)), Some(30)), at(12, 0));
    }

    #[test]
    fn effective_end_uses_duration_or_default() {
        assert_eq!(effective_end(at(10, 0), None, Some(90)), at(11, 30));
        assert_eq!(effective_end(at(10, 0), None, None), at(11, 0));
    }

    // -----------------------------------------------------------------------
    // find_conflicts
    // -----------------------------------------------------------------------

    #[test]
    fn terminal_items_never_conflict() {
        let existing = vec![
            Slot { range: range(10, 0, 11, 0), status: InterventionStatus::Cancelled },
            Slot { range: range(10, 0, 11, 0), status: InterventionStatus::Completed },
            Slot { range: range(10, 0, 11, 0), status: InterventionStatus::Rejected },
            Slot { range: range(10, 0, 11, 0), status: InterventionStatus::Confirmed },
        ];
        let hits = find_conflicts(&range(10, 30, 11, 30), &existing);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].status, InterventionStatus::Confirmed);
    }

    #[test]
    fn adjacent_candidate_has_no_conflicts() {
        let existing = vec![Slot {
            range: range(10, 0, 11, 0),
            status: InterventionStatus::Pending,
        }];
        assert!(find_conflicts(&range(11, 0, 12, 0), &existing).is_empty());
    }
}
