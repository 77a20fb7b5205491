//! Intervention status values and lifecycle state machine.
//!
//! Lives in `core` (zero internal deps) so the repository layer, the API
//! and the calendar sync adapter all agree on which statuses are terminal
//! and which transitions are legal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Duration constants
// ---------------------------------------------------------------------------

/// Duration applied when an intervention has no `estimated_duration`.
pub const DEFAULT_DURATION_MINS: i32 = 60;

/// Upper bound for a single intervention (one full day).
pub const MAX_DURATION_MINS: i32 = 24 * 60;

/// Validate an estimated or actual duration in minutes.
pub fn validate_duration(minutes: i32) -> Result<(), CoreError> {
    if minutes <= 0 || minutes > MAX_DURATION_MINS {
        return Err(CoreError::Validation(format!(
            "Duration must be between 1 and {MAX_DURATION_MINS} minutes, got {minutes}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an intervention. Stored as TEXT in `interventions.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rejected,
}

impl InterventionStatus {
    pub const ALL: [InterventionStatus; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
    ];

    /// Statuses that never block a time slot and accept no further transitions.
    pub const TERMINAL: [InterventionStatus; 3] =
        [Self::Completed, Self::Cancelled, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// Terminal status names, for `status <> ALL($n)` filters in SQL.
    pub fn terminal_names() -> Vec<&'static str> {
        Self::TERMINAL.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid intervention status '{s}'. Must be one of: {}",
                    Self::ALL.map(|st| st.as_str()).join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::InterventionStatus::{self, *};
    use crate::error::CoreError;

    /// Returns the set of statuses reachable from `from`.
    ///
    /// Terminal states (Completed, Cancelled, Rejected) return an empty slice.
    pub fn valid_transitions(from: InterventionStatus) -> &'static [InterventionStatus] {
        match from {
            Pending => &[Confirmed, Cancelled, Rejected],
            Confirmed => &[InProgress, Cancelled, Rejected],
            InProgress => &[Completed],
            Completed | Cancelled | Rejected => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: InterventionStatus, to: InterventionStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a requested status change. Staying in the same status is a no-op.
    pub fn validate_transition(
        from: InterventionStatus,
        to: InterventionStatus,
    ) -> Result<(), CoreError> {
        if from == to || can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid transition: {from} -> {to}"
            )))
        }
    }

    /// Statuses a newly created intervention may start in.
    pub fn validate_initial(status: InterventionStatus) -> Result<(), CoreError> {
        match status {
            Pending | Confirmed => Ok(()),
            other => Err(CoreError::Validation(format!(
                "An intervention cannot be created with status {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::InterventionStatus::*;
    use super::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_confirmed() {
        assert!(can_transition(Pending, Confirmed));
    }

    #[test]
    fn pending_to_cancelled_and_rejected() {
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Pending, Rejected));
    }

    #[test]
    fn confirmed_to_in_progress() {
        assert!(can_transition(Confirmed, InProgress));
    }

    #[test]
    fn confirmed_to_cancelled_and_rejected() {
        assert!(can_transition(Confirmed, Cancelled));
        assert!(can_transition(Confirmed, Rejected));
    }

    #[test]
    fn in_progress_to_completed() {
        assert!(can_transition(InProgress, Completed));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn terminal_states_have_no_transitions() {
        for status in InterventionStatus::TERMINAL {
            assert!(valid_transitions(status).is_empty(), "{status}");
            assert!(status.is_terminal());
        }
    }

    #[test]
    fn non_terminal_states_are_not_terminal() {
        assert!(!Pending.is_terminal());
        assert!(!Confirmed.is_terminal());
        assert!(!InProgress.is_terminal());
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_completed_invalid() {
        assert!(!can_transition(Pending, Completed));
    }

    #[test]
    fn in_progress_to_cancelled_invalid() {
        assert!(!can_transition(InProgress, Cancelled));
    }

    #[test]
    fn cancelled_to_pending_invalid() {
        assert!(!can_transition(Cancelled, Pending));
    }

    #[test]
    fn validate_transition_same_status_is_noop() {
        assert!(validate_transition(Cancelled, Cancelled).is_ok());
    }

    #[test]
    fn validate_transition_err_names_both_states() {
        let err = validate_transition(Completed, InProgress).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("completed"));
        assert!(msg.contains("in_progress"));
    }

    #[test]
    fn initial_status_must_be_pending_or_confirmed() {
        assert!(validate_initial(Pending).is_ok());
        assert!(validate_initial(Confirmed).is_ok());
        assert!(validate_initial(Completed).is_err());
    }

    // -----------------------------------------------------------------------
    // Parsing and serialization
    // -----------------------------------------------------------------------

    #[test]
    fn parses_every_status_name() {
        for status in InterventionStatus::ALL {
            assert_eq!(status.as_str().parse::<InterventionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_validation_error() {
        let err = "CANCELLED".parse::<InterventionStatus>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(60).is_ok());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(MAX_DURATION_MINS + 1).is_err());
    }
}
