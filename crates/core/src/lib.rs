//! Domain logic for the intervention scheduling service.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! repository layer, the event services, the calendar sync adapter and the
//! HTTP API without pulling in database or network code.

pub mod availability;
pub mod calendar_settings;
pub mod conflict;
pub mod error;
pub mod notifications;
pub mod recurrence;
pub mod roles;
pub mod scheduling;
pub mod types;
