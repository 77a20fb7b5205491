//! Google Calendar integration.
//!
//! - [`credentials`]: where the OAuth client id/secret come from.
//! - [`oauth`]: authorization URL, code exchange, refresh, revoke, userinfo.
//! - [`api`]: Calendar v3 REST client and the [`CalendarProvider`] seam.
//! - [`state`]: signed OAuth `state` parameter.
//! - [`sync`]: pure reconciliation planning between local interventions
//!   and remote events.
//! - [`service`]: [`CalendarSyncService`], the operations exposed over HTTP.

pub mod api;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod service;
pub mod state;
pub mod sync;

pub use api::{CalendarProvider, GoogleCalendarProvider};
pub use credentials::{
    CredentialProvider, EnvCredentialProvider, OAuthCredentials, StaticCredentialProvider,
};
pub use error::{GoogleApiError, SyncError};
pub use service::CalendarSyncService;
