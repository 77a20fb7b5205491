//! Google Calendar v3 REST client.
//!
//! [`CalendarProvider`] is the seam the sync service talks to;
//! [`GoogleCalendarProvider`] implements it over HTTP with [`reqwest`].

use std::collections::HashMap;
use std::time::Duration;

use assist_core::conflict::TimeRange;
use assist_core::types::Timestamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GoogleApiError;
use crate::oauth::{ensure_success, parse_response};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Page size requested from the events endpoint.
const PAGE_SIZE: &str = "250";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Start or end of an event. Timed events carry `date_time`; all-day events
/// carry `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn timed(at: Timestamp) -> Self {
        Self {
            date_time: Some(at),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
}

/// An event as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub id: String,
    /// `confirmed`, `tentative` or `cancelled`.
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    pub extended_properties: Option<ExtendedProperties>,
}

impl RemoteEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Value of a private extended property.
    pub fn private_property(&self, key: &str) -> Option<&str> {
        self.extended_properties
            .as_ref()
            .and_then(|p| p.private.get(key))
            .map(String::as_str)
    }

    /// `[start, end)` for timed events; `None` for all-day or malformed ones.
    pub fn timed_range(&self) -> Option<TimeRange> {
        let start = self.start.as_ref()?.date_time?;
        let end = self.end.as_ref()?.date_time?;
        TimeRange::new(start, end).ok()
    }
}

/// Body for inserting an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRemoteEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub extended_properties: ExtendedProperties,
}

/// An entry of the user's calendar list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<RemoteEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CalendarListPage {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

// ---------------------------------------------------------------------------
// CalendarProvider
// ---------------------------------------------------------------------------

/// Remote calendar operations used by the sync service.
#[async_trait::async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_calendars(
        &self,
        access_token: &str,
    ) -> Result<Vec<CalendarListEntry>, GoogleApiError>;

    /// Single (expanded) events overlapping `window`, ordered by start.
    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeRange,
    ) -> Result<Vec<RemoteEvent>, GoogleApiError>;

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewRemoteEvent,
    ) -> Result<RemoteEvent, GoogleApiError>;
}

/// HTTP implementation of [`CalendarProvider`].
pub struct GoogleCalendarProvider {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarProvider {
    pub fn new() -> Result<Self, GoogleApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another API root (e.g. a local stub server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, GoogleApiError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Build `<base>/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GoogleApiError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::UnexpectedResponse("base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn list_calendars(
        &self,
        access_token: &str,
    ) -> Result<Vec<CalendarListEntry>, GoogleApiError> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;
        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        let page: CalendarListPage = parse_response(response).await?;
        Ok(page.items)
    }

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeRange,
    ) -> Result<Vec<RemoteEvent>, GoogleApiError> {
        let time_min = window.start.to_rfc3339();
        let time_max = window.end.to_rfc3339();
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["calendars", calendar_id, "events"])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min)
                    .append_pair("timeMax", &time_max)
                    .append_pair("singleEvents", "true")
                    .append_pair("orderBy", "startTime")
                    .append_pair("maxResults", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.http.get(url).bearer_auth(access_token).send().await?;
            let page: EventsPage = parse_response(response).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(events)
    }

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewRemoteEvent,
    ) -> Result<RemoteEvent, GoogleApiError> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<RemoteEvent>().await?)
    }
}
