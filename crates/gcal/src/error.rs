//! Error types for the calendar integration.

use assist_core::error::CoreError;

/// Errors from the Google OAuth and Calendar HTTP endpoints.
#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Google returned a non-2xx status code.
    #[error("Google API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A response was missing a field the integration depends on.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GoogleApiError {
    /// Whether the failure means the grant itself is no longer valid.
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, Self::Api { status: 400 | 401, body } if body.contains("invalid_grant"))
    }
}

/// Errors from [`CalendarSyncService`](crate::CalendarSyncService) operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Google Calendar credentials are not configured")]
    NotConfigured,

    #[error("Google Calendar is not connected")]
    NotConnected,

    #[error("Invalid or expired OAuth state")]
    InvalidState,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Google(#[from] GoogleApiError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SyncError {
    /// Whether the stored grant can never be used again: Google rejected the
    /// refresh token, or none was stored.
    pub fn is_dead_grant(&self) -> bool {
        match self {
            Self::NotConnected => true,
            Self::Google(e) => e.is_invalid_grant(),
            _ => false,
        }
    }
}

impl From<SyncError> for CoreError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotConfigured => CoreError::IntegrationUnavailable(err.to_string()),
            SyncError::Google(e) => CoreError::IntegrationUnavailable(e.to_string()),
            SyncError::NotConnected | SyncError::InvalidState => {
                CoreError::Validation(err.to_string())
            }
            SyncError::Core(e) => e,
            SyncError::Database(e) => CoreError::Internal(e.to_string()),
        }
    }
}
