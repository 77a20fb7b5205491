//! Read-only access to marketplace service requests.

use assist_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_request::ServiceRequestWithParties;

pub struct ServiceRequestRepo;

impl ServiceRequestRepo {
    /// Load a request with its client and category names.
    pub async fn find_with_parties(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceRequestWithParties>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequestWithParties>(
            "SELECT r.id, r.title, r.description, r.address, r.city, r.priority, \
                    r.client_id, u.full_name AS client_name, u.email AS client_email, \
                    r.professional_id, r.category_id, c.name AS category_name \
             FROM service_requests r \
             JOIN users u ON u.id = r.client_id \
             LEFT JOIN categories c ON c.id = r.category_id \
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
