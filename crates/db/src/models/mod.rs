//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod availability;
pub mod calendar_block;
pub mod calendar_connection;
pub mod calendar_settings;
pub mod intervention;
pub mod notification_outbox;
pub mod service_request;
