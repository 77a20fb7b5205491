use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether Google OAuth credentials are available. Informational only.
    pub google_calendar_configured: bool,
}

/// GET /health -- service, database and integration health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, google_calendar_configured) = tokio::join!(
        assist_db::health_check(&state.pool),
        state.calendar_sync.config_status(),
    );
    let db_healthy = db.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        google_calendar_configured,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
