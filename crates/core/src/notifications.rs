//! Notification types emitted by the intervention lifecycle.
//!
//! Each constant is the `notification_type` stored in the outbox and handed
//! to the notification dispatcher. The builders produce the human-readable
//! title and message so every caller phrases them identically.

use crate::types::Timestamp;

pub const INTERVENTION_SCHEDULED: &str = "intervention_scheduled";
pub const INTERVENTION_RESCHEDULED: &str = "intervention_rescheduled";
pub const INTERVENTION_CANCELLED: &str = "intervention_cancelled";
pub const INTERVENTION_ACCEPTED: &str = "intervention_accepted";
pub const INTERVENTION_REJECTED: &str = "intervention_rejected";
pub const INTERVENTION_SERIES_SCHEDULED: &str = "intervention_series_scheduled";

/// Display format used in notification messages (`DD/MM/YYYY HH:MM`).
const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationText {
    pub title: String,
    pub message: String,
}

fn text(title: &str, message: String) -> NotificationText {
    NotificationText {
        title: title.to_string(),
        message,
    }
}

pub fn scheduled(start: Timestamp) -> NotificationText {
    text(
        "New intervention scheduled",
        format!(
            "An intervention has been scheduled for {}",
            start.format(DISPLAY_FORMAT)
        ),
    )
}

pub fn rescheduled(new_start: Timestamp) -> NotificationText {
    text(
        "Intervention rescheduled",
        format!(
            "The intervention has been rescheduled to {}",
            new_start.format(DISPLAY_FORMAT)
        ),
    )
}

pub fn cancelled(reason: Option<&str>) -> NotificationText {
    let message = match reason {
        Some(r) if !r.trim().is_empty() => r.trim().to_string(),
        _ => "The scheduled intervention has been cancelled".to_string(),
    };
    text("Intervention cancelled", message)
}

pub fn accepted(client_name: &str, start: Timestamp) -> NotificationText {
    text(
        "Intervention accepted",
        format!(
            "{client_name} accepted the intervention proposed for {}",
            start.format(DISPLAY_FORMAT)
        ),
    )
}

pub fn rejected(client_name: &str, start: Timestamp, reason: Option<&str>) -> NotificationText {
    let mut message = format!(
        "{client_name} declined the intervention proposed for {}",
        start.format(DISPLAY_FORMAT)
    );
    if let Some(r) = reason.filter(|r| !r.trim().is_empty()) {
        message.push_str(&format!(". Reason: {}", r.trim()));
    }
    text("Intervention declined", message)
}

pub fn series_scheduled(count: usize, first_start: Timestamp) -> NotificationText {
    text(
        "Recurring interventions scheduled",
        format!(
            "{count} recurring interventions have been scheduled starting {}",
            first_start.format(DISPLAY_FORMAT)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 10, 15, h, m, 0).unwrap()
    }

    #[test]
    fn scheduled_message_contains_formatted_date() {
        let n = scheduled(at(10, 5));
        assert_eq!(n.message, "An intervention has been scheduled for 15/10/2025 10:05");
    }

    #[test]
    fn cancelled_uses_reason_when_present() {
        assert_eq!(cancelled(Some("client away")).message, "client away");
        assert_eq!(
            cancelled(Some("   ")).message,
            "The scheduled intervention has been cancelled"
        );
        assert_eq!(
            cancelled(None).message,
            "The scheduled intervention has been cancelled"
        );
    }

    #[test]
    fn rejected_appends_reason() {
        let n = rejected("Mario Rossi", at(9, 0), Some("not home"));
        assert!(n.message.starts_with("Mario Rossi declined"));
        assert!(n.message.ends_with(". Reason: not home"));
    }
}
