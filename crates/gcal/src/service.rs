//! Calendar sync operations exposed to the HTTP layer.

use std::collections::HashSet;
use std::sync::Arc;

use assist_core::conflict::TimeRange;
use assist_core::types::{DbId, Timestamp};
use assist_db::models::calendar_connection::{CalendarConnection, UpsertCalendarConnection};
use assist_db::models::intervention::InterventionDetail;
use assist_db::repositories::{
    CalendarBlockRepo, CalendarConnectionRepo, CalendarSettingsRepo, InterventionRepo,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::api::{CalendarListEntry, CalendarProvider, RemoteEvent};
use crate::credentials::{CredentialProvider, OAuthCredentials};
use crate::error::SyncError;
use crate::oauth::OAuthClient;
use crate::state;
use crate::sync::{plan_export, plan_import, LocalItem};

/// Tokens expiring within this many seconds are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Default sync window relative to now.
const SYNC_PAST_DAYS: i64 = 30;
const SYNC_FUTURE_DAYS: i64 = 90;

/// Reason stored on imported blocks whose event has no title.
const IMPORTED_BLOCK_REASON: &str = "Google Calendar event";

/// Result of a completed OAuth callback.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackOutcome {
    #[serde(skip)]
    pub professional_id: DbId,
    pub connected: bool,
    pub email: Option<String>,
    pub calendar_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub configured: bool,
    pub connected: bool,
    pub email: Option<String>,
    pub calendar_id: Option<String>,
    pub last_sync: Option<Timestamp>,
}

impl ConnectionStatus {
    fn disconnected(configured: bool) -> Self {
        Self {
            configured,
            connected: false,
            email: None,
            calendar_id: None,
            last_sync: None,
        }
    }
}

/// Optional parameters of a sync run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncOptions {
    /// Switches the connection to this calendar before syncing.
    pub calendar_id: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Outcome of one sync direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionResult {
    pub count: usize,
    /// Imported blocks deleted because their remote event is gone. Always
    /// zero for the export direction.
    pub removed: usize,
    pub error: Option<String>,
}

impl DirectionResult {
    fn record_error(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub calendar_id: String,
    pub export: DirectionResult,
    pub import: DirectionResult,
    pub last_sync: Timestamp,
}

/// Google Calendar connect, sync and disconnect.
///
/// OAuth credentials are resolved through the injected
/// [`CredentialProvider`] on every call.
pub struct CalendarSyncService {
    pool: PgPool,
    credentials: Arc<dyn CredentialProvider>,
    provider: Arc<dyn CalendarProvider>,
    state_secret: String,
}

impl CalendarSyncService {
    pub fn new(
        pool: PgPool,
        credentials: Arc<dyn CredentialProvider>,
        provider: Arc<dyn CalendarProvider>,
        state_secret: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            credentials,
            provider,
            state_secret: state_secret.into(),
        }
    }

    async fn require_credentials(&self) -> Result<OAuthCredentials, SyncError> {
        self.credentials
            .oauth_credentials()
            .await
            .ok_or(SyncError::NotConfigured)
    }

    async fn require_connection(
        &self,
        professional_id: DbId,
    ) -> Result<CalendarConnection, SyncError> {
        CalendarConnectionRepo::find_by_professional(&self.pool, professional_id)
            .await?
            .ok_or(SyncError::NotConnected)
    }

    /// Whether OAuth credentials are configured.
    pub async fn config_status(&self) -> bool {
        self.credentials.oauth_credentials().await.is_some()
    }

    /// Consent URL for `professional_id`.
    pub async fn auth_url(&self, professional_id: DbId) -> Result<String, SyncError> {
        let creds = self.require_credentials().await?;
        let state = state::sign(professional_id, Utc::now(), &self.state_secret);
        Ok(OAuthClient::new(creds)?.authorization_url(&state)?)
    }

    /// Complete the OAuth flow: verify `state`, exchange `code` and store
    /// the connection.
    pub async fn handle_callback(
        &self,
        code: &str,
        state_param: &str,
    ) -> Result<CallbackOutcome, SyncError> {
        let professional_id = state::verify(state_param, Utc::now(), &self.state_secret)
            .ok_or(SyncError::InvalidState)?;

        let client = OAuthClient::new(self.require_credentials().await?)?;
        let tokens = client.exchange_code(code).await?;

        let email = match client.account_email(&tokens.access_token).await {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(professional_id, error = %e, "Failed to fetch Google account email");
                None
            }
        };

        let connection = CalendarConnectionRepo::upsert(
            &self.pool,
            professional_id,
            &UpsertCalendarConnection {
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                expires_at: tokens.expires_at(Utc::now()),
                scope: tokens.scope.clone(),
                account_email: email,
            },
        )
        .await?;
        CalendarSettingsRepo::set_google_connected(&self.pool, professional_id, true).await?;

        tracing::info!(professional_id, "Google Calendar connected");

        Ok(CallbackOutcome {
            professional_id,
            connected: true,
            email: connection.account_email,
            calendar_id: connection.calendar_id,
        })
    }

    /// A usable access token for `connection`, refreshing it when expired.
    async fn access_token(&self, connection: &CalendarConnection) -> Result<String, SyncError> {
        if !connection.is_expired(Utc::now(), EXPIRY_MARGIN_SECS) {
            return Ok(connection.access_token.clone());
        }

        let refresh_token = connection
            .refresh_token
            .as_deref()
            .ok_or(SyncError::NotConnected)?;
        let client = OAuthClient::new(self.require_credentials().await?)?;
        let tokens = client.refresh(refresh_token).await?;

        CalendarConnectionRepo::update_access_token(
            &self.pool,
            connection.professional_id,
            &tokens.access_token,
            tokens.expires_at(Utc::now()),
        )
        .await?;

        tracing::debug!(
            professional_id = connection.professional_id,
            "Refreshed Google access token"
        );
        Ok(tokens.access_token)
    }

    async fn drop_connection(&self, professional_id: DbId) -> Result<bool, SyncError> {
        let removed = CalendarConnectionRepo::delete(&self.pool, professional_id).await?;
        CalendarSettingsRepo::set_google_connected(&self.pool, professional_id, false).await?;
        Ok(removed)
    }

    /// Connection status. A grant Google no longer accepts drops the
    /// connection; any other refresh failure is returned to the caller.
    pub async fn status(&self, professional_id: DbId) -> Result<ConnectionStatus, SyncError> {
        let configured = self.config_status().await;
        let Some(connection) =
            CalendarConnectionRepo::find_by_professional(&self.pool, professional_id).await?
        else {
            return Ok(ConnectionStatus::disconnected(configured));
        };

        match self.access_token(&connection).await {
            Ok(_) => {}
            Err(e) if e.is_dead_grant() => {
                tracing::warn!(
                    professional_id,
                    error = %e,
                    "Dropping Google connection after the grant was rejected"
                );
                self.drop_connection(professional_id).await?;
                return Ok(ConnectionStatus::disconnected(configured));
            }
            Err(e) => return Err(e),
        }

        Ok(ConnectionStatus {
            configured,
            connected: true,
            email: connection.account_email,
            calendar_id: Some(connection.calendar_id),
            last_sync: connection.last_sync_at,
        })
    }

    /// Calendars visible to the connected account.
    pub async fn list_calendars(
        &self,
        professional_id: DbId,
    ) -> Result<Vec<CalendarListEntry>, SyncError> {
        let connection = self.require_connection(professional_id).await?;
        let token = self.access_token(&connection).await?;
        Ok(self.provider.list_calendars(&token).await?)
    }

    /// Two-way sync over a window (default: 30 days back to 90 days ahead).
    ///
    /// Failing to read the remote calendar fails the run. Failures while
    /// writing either side are reported per direction; completed writes are
    /// kept.
    pub async fn sync(
        &self,
        professional_id: DbId,
        options: &SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        let mut connection = self.require_connection(professional_id).await?;

        let now = Utc::now();
        let window = TimeRange::new(
            options.from.unwrap_or(now - Duration::days(SYNC_PAST_DAYS)),
            options.to.unwrap_or(now + Duration::days(SYNC_FUTURE_DAYS)),
        )?;

        if let Some(calendar_id) = options
            .calendar_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != connection.calendar_id)
        {
            CalendarConnectionRepo::set_calendar_id(&self.pool, professional_id, calendar_id)
                .await?;
            connection.calendar_id = calendar_id.to_string();
        }

        let token = self.access_token(&connection).await?;
        let remote = self
            .provider
            .list_events(&token, &connection.calendar_id, &window)
            .await?;

        let export = self
            .export(professional_id, &token, &connection.calendar_id, &window, &remote)
            .await;
        let import = self.import(professional_id, &window, &remote).await;

        let last_sync = Utc::now();
        CalendarConnectionRepo::set_last_sync(&self.pool, professional_id, last_sync).await?;
        CalendarSettingsRepo::set_last_sync(&self.pool, professional_id, last_sync).await?;

        tracing::info!(
            professional_id,
            exported = export.count,
            imported = import.count,
            removed = import.removed,
            export_error = export.error.is_some(),
            import_error = import.error.is_some(),
            "Google Calendar sync finished"
        );

        Ok(SyncReport {
            calendar_id: connection.calendar_id,
            export,
            import,
            last_sync,
        })
    }

    async fn export(
        &self,
        professional_id: DbId,
        token: &str,
        calendar_id: &str,
        window: &TimeRange,
        remote: &[RemoteEvent],
    ) -> DirectionResult {
        let mut result = DirectionResult::default();

        let local = match InterventionRepo::list_exportable(
            &self.pool,
            professional_id,
            window.start,
            window.end,
        )
        .await
        {
            Ok(rows) => rows.iter().map(local_item).collect::<Vec<_>>(),
            Err(e) => {
                result.record_error(e.to_string());
                return result;
            }
        };

        for item in plan_export(&local, remote) {
            let created = match self
                .provider
                .insert_event(token, calendar_id, &item.to_remote())
                .await
            {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(
                        professional_id,
                        intervention_id = item.intervention_id,
                        error = %e,
                        "Failed to export intervention"
                    );
                    result.record_error(e.to_string());
                    continue;
                }
            };

            match InterventionRepo::set_external_event_id(
                &self.pool,
                item.intervention_id,
                &created.id,
            )
            .await
            {
                Ok(_) => result.count += 1,
                Err(e) => result.record_error(e.to_string()),
            }
        }

        result
    }

    async fn import(
        &self,
        professional_id: DbId,
        window: &TimeRange,
        remote: &[RemoteEvent],
    ) -> DirectionResult {
        let mut result = DirectionResult::default();

        let linked: HashSet<String> =
            match InterventionRepo::linked_external_ids(&self.pool, professional_id).await {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    result.record_error(e.to_string());
                    return result;
                }
            };

        let candidates = plan_import(remote, &linked);
        for candidate in &candidates {
            let reason = candidate.summary.as_deref().unwrap_or(IMPORTED_BLOCK_REASON);
            match CalendarBlockRepo::upsert_imported(
                &self.pool,
                professional_id,
                &candidate.external_event_id,
                candidate.range.start,
                candidate.range.end,
                Some(reason),
            )
            .await
            {
                Ok(_) => result.count += 1,
                Err(e) => result.record_error(e.to_string()),
            }
        }

        // Blocks in the window whose event was deleted, cancelled or is now
        // linked to an intervention.
        let live: Vec<String> = candidates
            .into_iter()
            .map(|c| c.external_event_id)
            .collect();
        match CalendarBlockRepo::delete_stale_imported(&self.pool, professional_id, window, &live)
            .await
        {
            Ok(removed) => result.removed = usize::try_from(removed).unwrap_or(usize::MAX),
            Err(e) => result.record_error(e.to_string()),
        }
        result
    }

    /// Revoke (best effort) and forget the connection. Returns whether a
    /// connection existed.
    pub async fn disconnect(&self, professional_id: DbId) -> Result<bool, SyncError> {
        let connection =
            CalendarConnectionRepo::find_by_professional(&self.pool, professional_id).await?;

        if let (Some(connection), Some(creds)) =
            (&connection, self.credentials.oauth_credentials().await)
        {
            let token = connection
                .refresh_token
                .as_deref()
                .unwrap_or(&connection.access_token);
            let revoked = match OAuthClient::new(creds) {
                Ok(client) => client.revoke(token).await,
                Err(e) => Err(e),
            };
            if let Err(e) = revoked {
                tracing::warn!(professional_id, error = %e, "Token revocation failed");
            }
        }

        let removed = self.drop_connection(professional_id).await?;
        if removed {
            tracing::info!(professional_id, "Google Calendar disconnected");
        }
        Ok(removed)
    }
}

fn local_item(detail: &InterventionDetail) -> LocalItem {
    let i = &detail.intervention;
    let location = match (&detail.request_address, &detail.request_city) {
        (Some(address), Some(city)) => Some(format!("{address}, {city}")),
        (Some(address), None) => Some(address.clone()),
        (None, Some(city)) => Some(city.clone()),
        (None, None) => None,
    };
    LocalItem {
        intervention_id: i.id,
        external_event_id: i.external_event_id.clone(),
        range: TimeRange {
            start: i.proposed_date,
            end: i.end(),
        },
        summary: format!("{} - {}", detail.request_title, detail.client_name),
        description: i.description.clone(),
        location,
    }
}
