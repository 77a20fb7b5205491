//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod availability_repo;
pub mod calendar_block_repo;
pub mod calendar_connection_repo;
pub mod calendar_settings_repo;
pub mod exception_repo;
pub mod intervention_repo;
pub mod notification_outbox_repo;
pub mod service_request_repo;

pub use availability_repo::AvailabilityRepo;
pub use calendar_block_repo::CalendarBlockRepo;
pub use calendar_connection_repo::CalendarConnectionRepo;
pub use calendar_settings_repo::CalendarSettingsRepo;
pub use exception_repo::ExceptionRepo;
pub use intervention_repo::InterventionRepo;
pub use notification_outbox_repo::NotificationOutboxRepo;
pub use service_request_repo::ServiceRequestRepo;
