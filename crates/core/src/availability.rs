//! Weekly availability windows and date exceptions.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::error::CoreError;

/// Longest range accepted by a single unavailability submission, in days.
pub const MAX_EXCEPTION_RANGE_DAYS: i64 = 366;

pub const SUNDAY: i16 = 0;
pub const SATURDAY: i16 = 6;

/// Default `(is_active, start, end)` for a day of the week: Sunday closed,
/// Monday to Saturday 09:00-18:00.
pub fn default_window(day_of_week: i16) -> (bool, &'static str, &'static str) {
    if day_of_week == SUNDAY {
        (false, "00:00", "00:00")
    } else {
        (true, "09:00", "18:00")
    }
}

pub fn validate_day_of_week(day: i16) -> Result<(), CoreError> {
    if !(SUNDAY..=SATURDAY).contains(&day) {
        return Err(CoreError::Validation(format!(
            "day_of_week must be between 0 and 6, got {day}"
        )));
    }
    Ok(())
}

/// Parse a clock time in `H:MM` or `HH:MM` form.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid time '{value}', expected HH:MM"));

    let (h, m) = value.split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Validate and normalize a clock time to zero-padded `HH:MM`.
pub fn normalize_clock_time(value: &str) -> Result<String, CoreError> {
    Ok(parse_clock_time(value)?.format("%H:%M").to_string())
}

/// A window as submitted by the professional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowInput {
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Validate a weekly submission and return it with normalized times.
///
/// Rejects out-of-range days, duplicate days, malformed times and active
/// windows whose start is not before their end.
pub fn validate_week(windows: &[WindowInput]) -> Result<Vec<WindowInput>, CoreError> {
    let mut seen = [false; 7];
    let mut out = Vec::with_capacity(windows.len());

    for w in windows {
        validate_day_of_week(w.day_of_week)?;
        let slot = &mut seen[w.day_of_week as usize];
        if *slot {
            return Err(CoreError::Validation(format!(
                "day_of_week {} appears more than once",
                w.day_of_week
            )));
        }
        *slot = true;

        let start = parse_clock_time(&w.start_time)?;
        let end = parse_clock_time(&w.end_time)?;
        if w.is_active && start >= end {
            return Err(CoreError::Validation(format!(
                "Window for day {} must start before it ends",
                w.day_of_week
            )));
        }

        out.push(WindowInput {
            day_of_week: w.day_of_week,
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            is_active: w.is_active,
        });
    }
    Ok(out)
}

/// Every calendar date in `[start, end]`, validated against the range cap.
pub fn exception_dates(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, CoreError> {
    if start > end {
        return Err(CoreError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    let span = (end - start).num_days() + 1;
    if span > MAX_EXCEPTION_RANGE_DAYS {
        return Err(CoreError::Validation(format!(
            "Unavailability range cannot exceed {MAX_EXCEPTION_RANGE_DAYS} days"
        )));
    }
    Ok((0..span).map(|i| start + Duration::days(i)).collect())
}
