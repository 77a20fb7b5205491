//! Route definitions for `/calendar/google`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::google;
use crate::state::AppState;

/// Routes mounted at `/calendar/google`.
///
/// ```text
/// GET    /config        -> config
/// GET    /auth-url      -> auth_url
/// GET    /callback      -> callback (no bearer token; state-authenticated)
/// POST   /sync          -> sync
/// GET    /status        -> status
/// GET    /calendars     -> calendars
/// POST   /disconnect    -> disconnect
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(google::config))
        .route("/auth-url", get(google::auth_url))
        .route("/callback", get(google::callback))
        .route("/sync", post(google::sync))
        .route("/status", get(google::status))
        .route("/calendars", get(google::calendars))
        .route("/disconnect", post(google::disconnect))
}
