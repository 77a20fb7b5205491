//! Shared helpers for HTTP-level integration tests.
//!
//! The app is built through [`build_app_router`] so tests run behind the
//! production middleware stack. Google credentials are absent and the
//! calendar provider never reaches the network.

#![allow(dead_code)]

use std::sync::Arc;

use assist_api::auth::jwt::{generate_access_token, JwtConfig};
use assist_api::config::ServerConfig;
use assist_api::router::build_app_router;
use assist_api::state::AppState;
use assist_core::conflict::TimeRange;
use assist_events::{EventBus, Notifier};
use assist_gcal::api::{CalendarListEntry, NewRemoteEvent, RemoteEvent};
use assist_gcal::{CalendarProvider, CalendarSyncService, GoogleApiError, StaticCredentialProvider};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-jwt-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        oauth_state_secret: "test-state-secret".to_string(),
        notification_webhook_url: None,
        outbox_poll_interval_secs: 30,
    }
}

/// Calendar provider with no calendars and no events.
struct EmptyProvider;

#[async_trait::async_trait]
impl CalendarProvider for EmptyProvider {
    async fn list_calendars(
        &self,
        _access_token: &str,
    ) -> Result<Vec<CalendarListEntry>, GoogleApiError> {
        Ok(Vec::new())
    }

    async fn list_events(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        _window: &TimeRange,
    ) -> Result<Vec<RemoteEvent>, GoogleApiError> {
        Ok(Vec::new())
    }

    async fn insert_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event: &NewRemoteEvent,
    ) -> Result<RemoteEvent, GoogleApiError> {
        Ok(RemoteEvent {
            id: "evt-1".into(),
            summary: Some(event.summary.clone()),
            ..Default::default()
        })
    }
}

/// Build the full application router over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let notifier = Arc::new(Notifier::new(pool.clone(), Arc::clone(&event_bus)));
    let calendar_sync = Arc::new(CalendarSyncService::new(
        pool.clone(),
        Arc::new(StaticCredentialProvider(None)),
        Arc::new(EmptyProvider),
        config.oauth_state_secret.clone(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        notifier,
        calendar_sync,
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for `user_id` with `role`.
pub fn token(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST with no body at all.
pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn insert_user(pool: &PgPool, name: &str, role: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    sqlx::query_scalar(
        "INSERT INTO users (full_name, email, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_request(
    pool: &PgPool,
    title: &str,
    client_id: i64,
    professional_id: i64,
) -> i64 {
    let category_id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id",
    )
    .bind("Plumbing")
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query_scalar(
        "INSERT INTO service_requests (title, client_id, professional_id, category_id, address, city) \
         VALUES ($1, $2, $3, $4, 'Via Roma 1', 'Milano') RETURNING id",
    )
    .bind(title)
    .bind(client_id)
    .bind(professional_id)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// 15 October 2025 at `h:m` UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, h, m, 0).unwrap()
}

/// A professional, a client, one request linking them and their tokens.
pub struct Fixture {
    pub professional_id: i64,
    pub client_id: i64,
    pub request_id: i64,
    pub pro_token: String,
    pub client_token: String,
}

pub async fn fixture(pool: &PgPool) -> Fixture {
    let professional_id = insert_user(pool, "Luca Bianchi", "professional").await;
    let client_id = insert_user(pool, "Mario Rossi", "client").await;
    let request_id = insert_request(pool, "Leaking sink", client_id, professional_id).await;
    Fixture {
        professional_id,
        client_id,
        request_id,
        pro_token: token(professional_id, "professional"),
        client_token: token(client_id, "client"),
    }
}

/// Create an intervention over HTTP and return its id.
pub async fn create_intervention(
    pool: &PgPool,
    f: &Fixture,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/calendar/interventions",
        &f.pro_token,
        serde_json::json!({
            "request_id": f.request_id,
            "proposed_date": start,
            "end_date": end,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
