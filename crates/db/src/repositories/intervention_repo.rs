//! Repository for the `interventions` table.

use assist_core::conflict::TimeRange;
use assist_core::scheduling::InterventionStatus;
use assist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::intervention::{
    CreateIntervention, Intervention, InterventionDetail, InterventionFilter, UpdateIntervention,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, request_id, professional_id, proposed_date, confirmed_date, \
    estimated_duration, actual_duration, status, description, notes, client_confirmed, \
    client_decline_reason, created_by, parent_intervention_id, external_event_id, version, \
    created_at, updated_at";

/// Joined projection used by listings and conflict checks.
const DETAIL_SELECT: &str = "SELECT i.id, i.request_id, i.professional_id, i.proposed_date, \
    i.confirmed_date, i.estimated_duration, i.actual_duration, i.status, i.description, i.notes, \
    i.client_confirmed, i.client_decline_reason, i.created_by, i.parent_intervention_id, \
    i.external_event_id, i.version, i.created_at, i.updated_at, \
    r.title AS request_title, r.address AS request_address, r.city AS request_city, \
    r.priority AS request_priority, r.client_id, u.full_name AS client_name, \
    u.email AS client_email, u.phone AS client_phone, r.category_id, c.name AS category_name \
    FROM interventions i \
    JOIN service_requests r ON r.id = i.request_id \
    JOIN users u ON u.id = r.client_id \
    LEFT JOIN categories c ON c.id = r.category_id";

/// SQL form of the effective end of an intervention.
const EFFECTIVE_END: &str =
    "COALESCE(i.confirmed_date, i.proposed_date + make_interval(mins => i.estimated_duration))";

/// Statuses excluded from sync export.
const NOT_EXPORTED: [&str; 2] = ["cancelled", "rejected"];

/// Provides CRUD operations for interventions.
pub struct InterventionRepo;

impl InterventionRepo {
    /// Insert a new intervention, returning the created row.
    ///
    /// Missing `status` defaults to `pending`, missing duration to 60 minutes.
    pub async fn create(
        pool: &PgPool,
        input: &CreateIntervention,
    ) -> Result<Intervention, sqlx::Error> {
        let query = format!(
            "INSERT INTO interventions \
                (request_id, professional_id, proposed_date, confirmed_date, estimated_duration, \
                 status, description, notes, created_by, parent_intervention_id) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 60), COALESCE($6, 'pending'), $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(input.request_id)
            .bind(input.professional_id)
            .bind(input.proposed_date)
            .bind(input.confirmed_date)
            .bind(input.estimated_duration)
            .bind(&input.status)
            .bind(&input.description)
            .bind(&input.notes)
            .bind(input.created_by)
            .bind(input.parent_intervention_id)
            .fetch_one(pool)
            .await
    }

    /// Insert several interventions in one transaction.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateIntervention],
    ) -> Result<Vec<Intervention>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(inputs.len());

        let query = format!(
            "INSERT INTO interventions \
                (request_id, professional_id, proposed_date, confirmed_date, estimated_duration, \
                 status, description, notes, created_by, parent_intervention_id) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 60), COALESCE($6, 'pending'), $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );

        for input in inputs {
            let row = sqlx::query_as::<_, Intervention>(&query)
                .bind(input.request_id)
                .bind(input.professional_id)
                .bind(input.proposed_date)
                .bind(input.confirmed_date)
                .bind(input.estimated_duration)
                .bind(&input.status)
                .bind(&input.description)
                .bind(&input.notes)
                .bind(input.created_by)
                .bind(input.parent_intervention_id)
                .fetch_one(&mut *tx)
                .await?;
            results.push(row);
        }

        tx.commit().await?;
        Ok(results)
    }

    /// Find an intervention by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Intervention>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM interventions WHERE id = $1");
        sqlx::query_as::<_, Intervention>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an intervention with its request, client and category.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InterventionDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE i.id = $1");
        sqlx::query_as::<_, InterventionDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a professional's interventions ordered by start.
    ///
    /// `search` matches description, notes, request title and client name
    /// case-insensitively. `from`/`to` bound the start date inclusively.
    pub async fn list_for_professional(
        pool: &PgPool,
        professional_id: DbId,
        filter: &InterventionFilter,
    ) -> Result<Vec<InterventionDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE i.professional_id = $1 \
               AND ($2::text IS NULL OR i.status = $2) \
               AND ($3::bigint IS NULL OR r.category_id = $3) \
               AND ($4::text IS NULL \
                    OR i.description ILIKE $4 OR i.notes ILIKE $4 \
                    OR r.title ILIKE $4 OR u.full_name ILIKE $4) \
               AND ($5::timestamptz IS NULL OR i.proposed_date >= $5) \
               AND ($6::timestamptz IS NULL OR i.proposed_date <= $6) \
             ORDER BY i.proposed_date ASC, i.id ASC"
        );
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        sqlx::query_as::<_, InterventionDetail>(&query)
            .bind(professional_id)
            .bind(&filter.status)
            .bind(filter.category_id)
            .bind(pattern)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(pool)
            .await
    }

    /// Non-terminal interventions of a professional whose effective range
    /// overlaps `range`, optionally excluding one intervention.
    pub async fn find_blocking(
        pool: &PgPool,
        professional_id: DbId,
        range: &TimeRange,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<InterventionDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE i.professional_id = $1 \
               AND i.status <> ALL($2) \
               AND i.proposed_date < $4 \
               AND {EFFECTIVE_END} > $3 \
               AND ($5::bigint IS NULL OR i.id <> $5) \
             ORDER BY i.proposed_date ASC, i.id ASC"
        );
        sqlx::query_as::<_, InterventionDetail>(&query)
            .bind(professional_id)
            .bind(InterventionStatus::terminal_names())
            .bind(range.start)
            .bind(range.end)
            .bind(exclude_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update and bump `version`.
    ///
    /// When `expected_version` is set the row is only updated if its current
    /// version matches. Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIntervention,
        expected_version: Option<i32>,
    ) -> Result<Option<Intervention>, sqlx::Error> {
        let query = format!(
            "UPDATE interventions SET \
                proposed_date = COALESCE($2, proposed_date), \
                confirmed_date = COALESCE($3, confirmed_date), \
                estimated_duration = COALESCE($4, estimated_duration), \
                actual_duration = COALESCE($5, actual_duration), \
                status = COALESCE($6, status), \
                description = COALESCE($7, description), \
                notes = COALESCE($8, notes), \
                client_confirmed = COALESCE($9, client_confirmed), \
                client_decline_reason = COALESCE($10, client_decline_reason), \
                version = version + 1 \
             WHERE id = $1 AND ($11::int IS NULL OR version = $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(id)
            .bind(input.proposed_date)
            .bind(input.confirmed_date)
            .bind(input.estimated_duration)
            .bind(input.actual_duration)
            .bind(&input.status)
            .bind(&input.description)
            .bind(&input.notes)
            .bind(input.client_confirmed)
            .bind(&input.client_decline_reason)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Move an intervention to `[start, end)`. Same version semantics as [`Self::update`].
    pub async fn reschedule(
        pool: &PgPool,
        id: DbId,
        start: Timestamp,
        end: Timestamp,
        expected_version: Option<i32>,
    ) -> Result<Option<Intervention>, sqlx::Error> {
        let query = format!(
            "UPDATE interventions SET \
                proposed_date = $2, confirmed_date = $3, version = version + 1 \
             WHERE id = $1 AND ($4::int IS NULL OR version = $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(id)
            .bind(start)
            .bind(end)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Move from status `from` to `to`, replacing notes when `notes` is
    /// provided. Returns `None` when the row is gone or no longer in `from`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        from: InterventionStatus,
        to: InterventionStatus,
        notes: Option<&str>,
    ) -> Result<Option<Intervention>, sqlx::Error> {
        let query = format!(
            "UPDATE interventions SET \
                status = $3, notes = COALESCE($4, notes), version = version + 1 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Record the client's answer to a proposed intervention. Same `from`
    /// guard as [`Self::set_status`].
    pub async fn record_client_response(
        pool: &PgPool,
        id: DbId,
        from: InterventionStatus,
        to: InterventionStatus,
        client_confirmed: bool,
        decline_reason: Option<&str>,
    ) -> Result<Option<Intervention>, sqlx::Error> {
        let query = format!(
            "UPDATE interventions SET \
                status = $3, client_confirmed = $4, client_decline_reason = $5, \
                version = version + 1 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(client_confirmed)
            .bind(decline_reason)
            .fetch_optional(pool)
            .await
    }

    /// Link an intervention to the external calendar event that mirrors it.
    pub async fn set_external_event_id(
        pool: &PgPool,
        id: DbId,
        external_event_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE interventions SET external_event_id = $2 WHERE id = $1")
            .bind(id)
            .bind(external_event_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Interventions starting in `[from, to]` that are candidates for export.
    pub async fn list_exportable(
        pool: &PgPool,
        professional_id: DbId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<InterventionDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE i.professional_id = $1 \
               AND i.status <> ALL($2) \
               AND i.proposed_date >= $3 AND i.proposed_date <= $4 \
             ORDER BY i.proposed_date ASC"
        );
        sqlx::query_as::<_, InterventionDetail>(&query)
            .bind(professional_id)
            .bind(&NOT_EXPORTED[..])
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// External event ids already linked to any intervention of the professional.
    pub async fn linked_external_ids(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT external_event_id FROM interventions \
             WHERE professional_id = $1 AND external_event_id IS NOT NULL",
        )
        .bind(professional_id)
        .fetch_all(pool)
        .await
    }
}
