//! Repository for the `availability_exceptions` table.

use assist_core::types::DbId;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::availability::AvailabilityException;

/// Column list for `availability_exceptions` queries.
const COLUMNS: &str =
    "id, professional_id, date, is_working_day, reason, created_at, updated_at";

/// Provides date-exception operations.
pub struct ExceptionRepo;

impl ExceptionRepo {
    /// List exceptions with `from <= date <= to` (either bound optional), by date.
    pub async fn list(
        pool: &PgPool,
        professional_id: DbId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AvailabilityException>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability_exceptions \
             WHERE professional_id = $1 \
               AND ($2::date IS NULL OR date >= $2) \
               AND ($3::date IS NULL OR date <= $3) \
             ORDER BY date ASC"
        );
        sqlx::query_as::<_, AvailabilityException>(&query)
            .bind(professional_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Non-working exceptions whose date falls in `[from, to]`.
    pub async fn list_non_working(
        pool: &PgPool,
        professional_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AvailabilityException>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability_exceptions \
             WHERE professional_id = $1 AND is_working_day = false \
               AND date >= $2 AND date <= $3 \
             ORDER BY date ASC"
        );
        sqlx::query_as::<_, AvailabilityException>(&query)
            .bind(professional_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Mark each date as a non-working day, upserting per (professional, date).
    pub async fn upsert_days_off(
        pool: &PgPool,
        professional_id: DbId,
        dates: &[NaiveDate],
        reason: Option<&str>,
    ) -> Result<Vec<AvailabilityException>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(dates.len());

        let query = format!(
            "INSERT INTO availability_exceptions (professional_id, date, is_working_day, reason) \
             VALUES ($1, $2, false, $3) \
             ON CONFLICT (professional_id, date) DO UPDATE \
             SET is_working_day = false, reason = EXCLUDED.reason \
             RETURNING {COLUMNS}"
        );

        for date in dates {
            let row = sqlx::query_as::<_, AvailabilityException>(&query)
                .bind(professional_id)
                .bind(date)
                .bind(reason)
                .fetch_one(&mut *tx)
                .await?;
            results.push(row);
        }

        tx.commit().await?;
        Ok(results)
    }

    /// Find an exception by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AvailabilityException>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM availability_exceptions WHERE id = $1");
        sqlx::query_as::<_, AvailabilityException>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an exception. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM availability_exceptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
