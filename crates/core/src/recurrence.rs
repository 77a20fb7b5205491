//! Recurrence expansion and series planning.
//!
//! A series is anchored on an existing (parent) intervention. Expansion
//! yields the start times of every occurrence after the parent; planning
//! then splits those occurrences into ones that can be created and ones
//! skipped because of a conflict.

use chrono::{Duration, Months};
use serde::{Deserialize, Serialize};

use crate::conflict::TimeRange;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Upper bound on occurrences in one series, parent included.
pub const MAX_OCCURRENCES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// How a series repeats. Exactly one of `count` or `until` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Total occurrences including the parent.
    pub count: Option<u32>,
    /// Last instant an occurrence may start at (inclusive).
    pub until: Option<Timestamp>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrencePattern {
    pub fn validate(&self, parent_start: Timestamp) -> Result<(), CoreError> {
        if self.interval == 0 {
            return Err(CoreError::Validation("interval must be at least 1".into()));
        }
        match (self.count, self.until) {
            (Some(_), Some(_)) | (None, None) => Err(CoreError::Validation(
                "Exactly one of count or until must be provided".into(),
            )),
            (Some(count), None) if !(2..=MAX_OCCURRENCES).contains(&count) => {
                Err(CoreError::Validation(format!(
                    "count must be between 2 and {MAX_OCCURRENCES}"
                )))
            }
            (None, Some(until)) if until <= parent_start => Err(CoreError::Validation(
                "until must be after the first occurrence".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Start of the `n`-th occurrence (the parent is `n = 0`).
    ///
    /// Monthly steps are computed from the parent so that a series started on
    /// the 31st clamps to shorter months without drifting afterwards.
    fn nth_start(&self, parent_start: Timestamp, n: u32) -> Option<Timestamp> {
        let steps = n.checked_mul(self.interval)?;
        match self.frequency {
            Frequency::Daily => parent_start.checked_add_signed(Duration::days(i64::from(steps))),
            Frequency::Weekly => {
                parent_start.checked_add_signed(Duration::weeks(i64::from(steps)))
            }
            Frequency::Monthly => parent_start.checked_add_months(Months::new(steps)),
        }
    }

    /// Start times of every occurrence after the parent.
    pub fn expand(&self, parent_start: Timestamp) -> Result<Vec<Timestamp>, CoreError> {
        self.validate(parent_start)?;
        let overflow = || CoreError::Validation("Recurrence exceeds the supported date range".into());

        if let Some(count) = self.count {
            return (1..count)
                .map(|n| self.nth_start(parent_start, n).ok_or_else(overflow))
                .collect();
        }

        let until = self.until.unwrap_or(parent_start);
        let mut starts = Vec::new();
        for n in 1.. {
            let start = self.nth_start(parent_start, n).ok_or_else(overflow)?;
            if start > until {
                break;
            }
            // `n + 1` counts the parent.
            if n + 1 > MAX_OCCURRENCES {
                return Err(CoreError::Validation(format!(
                    "Recurrence would create more than {MAX_OCCURRENCES} occurrences"
                )));
            }
            starts.push(start);
        }
        Ok(starts)
    }
}

/// An occurrence that was not created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOccurrence {
    pub start: Timestamp,
    pub end: Timestamp,
    pub reason: String,
    pub conflicting_ids: Vec<DbId>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeriesPlan {
    pub accepted: Vec<TimeRange>,
    pub skipped: Vec<SkippedOccurrence>,
}

/// Split `occurrences` into accepted and skipped ranges.
///
/// An occurrence is skipped when it overlaps any range in `existing` (blocking
/// interventions of the professional, identified by id) or an occurrence
/// already accepted earlier in the same series.
pub fn plan_series(occurrences: &[TimeRange], existing: &[(DbId, TimeRange)]) -> SeriesPlan {
    let mut plan = SeriesPlan::default();

    for occ in occurrences {
        let conflicting_ids: Vec<DbId> = existing
            .iter()
            .filter(|(_, range)| range.overlaps(occ))
            .map(|(id, _)| *id)
            .collect();

        let reason = if !conflicting_ids.is_empty() {
            Some("Conflicts with existing interventions")
        } else if plan.accepted.iter().any(|a| a.overlaps(occ)) {
            Some("Overlaps another occurrence of this series")
        } else {
            None
        };

        match reason {
            Some(reason) => plan.skipped.push(SkippedOccurrence {
                start: occ.start,
                end: occ.end,
                reason: reason.to_string(),
                conflicting_ids,
            }),
            None => plan.accepted.push(*occ),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, mo: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn pattern(frequency: Frequency, count: Option<u32>, until: Option<Timestamp>) -> RecurrencePattern {
        RecurrencePattern {
            frequency,
            interval: 1,
            count,
            until,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn requires_exactly_one_bound() {
        let start = at(2025, 1, 1, 9);
        assert!(pattern(Frequency::Daily, None, None).validate(start).is_err());
        assert!(pattern(Frequency::Daily, Some(3), Some(at(2025, 2, 1, 9)))
            .validate(start)
            .is_err());
    }

    #[test]
    fn count_bounds() {
        let start = at(2025, 1, 1, 9);
        assert!(pattern(Frequency::Daily, Some(1), None).validate(start).is_err());
        assert!(pattern(Frequency::Daily, Some(100), None).validate(start).is_ok());
        assert!(pattern(Frequency::Daily, Some(101), None).validate(start).is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let mut p = pattern(Frequency::Weekly, Some(3), None);
        p.interval = 0;
        assert!(p.validate(at(2025, 1, 1, 9)).is_err());
    }

    #[test]
    fn until_must_follow_parent() {
        let start = at(2025, 1, 1, 9);
        assert!(pattern(Frequency::Daily, None, Some(start)).validate(start).is_err());
    }

    // -----------------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------------

    #[test]
    fn count_includes_parent() {
        let starts = pattern(Frequency::Weekly, Some(3), None)
            .expand(at(2025, 1, 6, 9))
            .unwrap();
        assert_eq!(starts, vec![at(2025, 1, 13, 9), at(2025, 1, 20, 9)]);
    }

    #[test]
    fn until_is_inclusive() {
        let starts = pattern(Frequency::Daily, None, Some(at(2025, 1, 4, 9)))
            .expand(at(2025, 1, 1, 9))
            .unwrap();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts.last(), Some(&at(2025, 1, 4, 9)));
    }

    #[test]
    fn interval_skips_periods() {
        let mut p = pattern(Frequency::Daily, Some(3), None);
        p.interval = 2;
        let starts = p.expand(at(2025, 1, 1, 9)).unwrap();
        assert_eq!(starts, vec![at(2025, 1, 3, 9), at(2025, 1, 5, 9)]);
    }

    #[test]
    fn monthly_clamps_without_drift() {
        let starts = pattern(Frequency::Monthly, Some(4), None)
            .expand(at(2025, 1, 31, 9))
            .unwrap();
        assert_eq!(
            starts,
            vec![at(2025, 2, 28, 9), at(2025, 3, 31, 9), at(2025, 4, 30, 9)]
        );
    }

    #[test]
    fn until_exceeding_cap_is_an_error() {
        let err = pattern(Frequency::Daily, None, Some(at(2026, 1, 1, 9)))
            .expand(at(2025, 1, 1, 9))
            .unwrap_err();
        assert!(err.to_string().contains("more than 100"));
    }

    #[test]
    fn until_at_cap_is_accepted() {
        // Parent plus 99 daily occurrences.
        let starts = pattern(Frequency::Daily, None, Some(at(2025, 4, 10, 9)))
            .expand(at(2025, 1, 1, 9))
            .unwrap();
        assert_eq!(starts.len(), 99);
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    fn hour(d: u32, h: u32) -> TimeRange {
        TimeRange::new(at(2025, 1, d, h), at(2025, 1, d, h + 1)).unwrap()
    }

    #[test]
    fn plan_skips_conflicts_with_existing() {
        let occurrences = vec![hour(2, 9), hour(3, 9), hour(4, 9)];
        let existing = vec![(42, hour(3, 9)), (43, hour(10, 9))];
        let plan = plan_series(&occurrences, &existing);

        assert_eq!(plan.accepted, vec![hour(2, 9), hour(4, 9)]);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].conflicting_ids, vec![42]);
        assert_eq!(plan.skipped[0].start, at(2025, 1, 3, 9));
    }

    #[test]
    fn plan_skips_overlapping_siblings() {
        let long = TimeRange::new(at(2025, 1, 2, 9), at(2025, 1, 3, 10)).unwrap();
        let occurrences = vec![long, hour(3, 9)];
        let plan = plan_series(&occurrences, &[]);

        assert_eq!(plan.accepted, vec![long]);
        assert_eq!(plan.skipped.len(), 1);
        assert!(plan.skipped[0].conflicting_ids.is_empty());
    }
}
