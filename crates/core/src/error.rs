use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The external calendar provider (OAuth or API) could not be reached
    /// or rejected the call.
    #[error("Calendar integration unavailable: {0}")]
    IntegrationUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
