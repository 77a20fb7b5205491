//! Read-only view of marketplace service requests.

use assist_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A service request with its client and category resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRequestWithParties {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub priority: String,
    pub client_id: DbId,
    pub client_name: String,
    pub client_email: String,
    pub professional_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
}
