//! Repository for the `availability_windows` table.

use assist_core::availability::{default_window, WindowInput, SATURDAY, SUNDAY};
use assist_core::types::DbId;
use sqlx::PgPool;

use crate::models::availability::AvailabilityWindow;

/// Column list for `availability_windows` queries.
const COLUMNS: &str =
    "id, professional_id, day_of_week, start_time, end_time, is_active, created_at, updated_at";

/// Provides weekly availability operations.
pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// Insert default windows for any day the professional has no row for.
    ///
    /// Existing rows are never touched, so this is safe to call on every read.
    pub async fn ensure_defaults(pool: &PgPool, professional_id: DbId) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for day in SUNDAY..=SATURDAY {
            let (is_active, start, end) = default_window(day);
            sqlx::query(
                "INSERT INTO availability_windows \
                    (professional_id, day_of_week, start_time, end_time, is_active) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (professional_id, day_of_week) DO NOTHING",
            )
            .bind(professional_id)
            .bind(day)
            .bind(start)
            .bind(end)
            .bind(is_active)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// List the professional's windows ordered by day of week.
    pub async fn list(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<Vec<AvailabilityWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability_windows \
             WHERE professional_id = $1 ORDER BY day_of_week ASC"
        );
        sqlx::query_as::<_, AvailabilityWindow>(&query)
            .bind(professional_id)
            .fetch_all(pool)
            .await
    }

    /// Upsert one row per submitted day within a transaction.
    pub async fn upsert_week(
        pool: &PgPool,
        professional_id: DbId,
        windows: &[WindowInput],
    ) -> Result<Vec<AvailabilityWindow>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(windows.len());

        let query = format!(
            "INSERT INTO availability_windows \
                (professional_id, day_of_week, start_time, end_time, is_active) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (professional_id, day_of_week) DO UPDATE \
             SET start_time = EXCLUDED.start_time, \
                 end_time = EXCLUDED.end_time, \
                 is_active = EXCLUDED.is_active \
             RETURNING {COLUMNS}"
        );

        for w in windows {
            let row = sqlx::query_as::<_, AvailabilityWindow>(&query)
                .bind(professional_id)
                .bind(w.day_of_week)
                .bind(&w.start_time)
                .bind(&w.end_time)
                .bind(w.is_active)
                .fetch_one(&mut *tx)
                .await?;
            results.push(row);
        }

        tx.commit().await?;
        Ok(results)
    }
}
