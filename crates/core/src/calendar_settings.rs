//! Calendar display and scheduling preferences: defaults and validation.

use crate::availability::normalize_clock_time;
use crate::error::CoreError;

pub const VALID_VIEWS: &[&str] = &["day", "week", "month", "list"];

pub const DEFAULT_VIEW: &str = "week";
pub const DEFAULT_WEEK_STARTS_ON: i16 = 1;
pub const DEFAULT_TIME_SLOT_DURATION: i32 = 30;
pub const DEFAULT_MIN_TIME: &str = "08:00";
pub const DEFAULT_MAX_TIME: &str = "20:00";
pub const DEFAULT_INTERVENTION_DURATION: i32 = 60;
pub const DEFAULT_BUFFER_TIME: i32 = 15;
pub const DEFAULT_MAX_CONCURRENT: i32 = 1;
pub const DEFAULT_TIME_ZONE: &str = "Europe/Rome";

/// Reminder offsets in minutes before an intervention.
pub const DEFAULT_REMINDER_TIMING: &[i32] = &[60, 1440];

/// Default colour per intervention status.
pub fn default_color_scheme() -> serde_json::Value {
    serde_json::json!({
        "pending": "#FFA500",
        "confirmed": "#4CAF50",
        "in_progress": "#2196F3",
        "completed": "#808080",
        "cancelled": "#FF0000",
        "rejected": "#9C27B0"
    })
}

pub fn default_reminder_timing() -> serde_json::Value {
    serde_json::json!(DEFAULT_REMINDER_TIMING)
}

pub fn validate_view(view: &str) -> Result<(), CoreError> {
    if !VALID_VIEWS.contains(&view) {
        return Err(CoreError::Validation(format!(
            "Invalid default_view '{view}'. Must be one of: {}",
            VALID_VIEWS.join(", ")
        )));
    }
    Ok(())
}

/// Check that `value` is within `[min, max]`.
pub fn validate_bounded(field: &str, value: i64, min: i64, max: i64) -> Result<(), CoreError> {
    if value < min || value > max {
        return Err(CoreError::Validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Reminder offsets must be a JSON array of positive minute counts.
pub fn validate_reminder_timing(value: &serde_json::Value) -> Result<(), CoreError> {
    let invalid =
        || CoreError::Validation("reminder_timing must be an array of positive minutes".into());
    let items = value.as_array().ok_or_else(invalid)?;
    if items
        .iter()
        .any(|v| v.as_i64().map_or(true, |minutes| minutes <= 0))
    {
        return Err(invalid());
    }
    Ok(())
}

/// Colour schemes map names to colour strings.
pub fn validate_color_scheme(value: &serde_json::Value) -> Result<(), CoreError> {
    let invalid =
        || CoreError::Validation("color_scheme must be an object of string values".into());
    let map = value.as_object().ok_or_else(invalid)?;
    if map.values().any(|v| !v.is_string()) {
        return Err(invalid());
    }
    Ok(())
}

/// Validate the visible day range. Both bounds are normalized to `HH:MM`.
pub fn validate_day_bounds(min_time: &str, max_time: &str) -> Result<(String, String), CoreError> {
    let min = normalize_clock_time(min_time)?;
    let max = normalize_clock_time(max_time)?;
    if min >= max {
        return Err(CoreError::Validation(
            "min_time must be earlier than max_time".to_string(),
        ));
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn views() {
        assert!(validate_view("month").is_ok());
        assert!(validate_view("agenda").is_err());
    }

    #[test]
    fn bounded_inclusive() {
        assert!(validate_bounded("time_slot_duration", 15, 15, 120).is_ok());
        assert!(validate_bounded("time_slot_duration", 120, 15, 120).is_ok());
        let err = validate_bounded("time_slot_duration", 10, 15, 120).unwrap_err();
        assert!(err.to_string().contains("time_slot_duration"));
    }

    #[test]
    fn reminder_timing_shape() {
        assert!(validate_reminder_timing(&json!([15, 60])).is_ok());
        assert!(validate_reminder_timing(&json!([])).is_ok());
        assert!(validate_reminder_timing(&json!([0])).is_err());
        assert!(validate_reminder_timing(&json!({"a": 1})).is_err());
        assert!(validate_reminder_timing(&json!(["60"])).is_err());
    }

    #[test]
    fn color_scheme_shape() {
        assert!(validate_color_scheme(&default_color_scheme()).is_ok());
        assert!(validate_color_scheme(&json!({"pending": 3})).is_err());
        assert!(validate_color_scheme(&json!(["#fff"])).is_err());
    }

    #[test]
    fn day_bounds_are_ordered() {
        assert_eq!(
            validate_day_bounds("8:00", "20:00").unwrap(),
            ("08:00".to_string(), "20:00".to_string())
        );
        assert!(validate_day_bounds("20:00", "08:00").is_err());
    }
}
