//! Repository for the `calendar_blocks` table.

use assist_core::conflict::TimeRange;
use assist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::calendar_block::{
    CalendarBlock, CreateCalendarBlock, SOURCE_GOOGLE, SOURCE_MANUAL,
};

/// Column list for `calendar_blocks` queries.
const COLUMNS: &str = "id, professional_id, start_date_time, end_date_time, reason, \
    is_recurring, recurring_pattern, source, external_event_id, created_at, updated_at";

/// Provides calendar block operations.
pub struct CalendarBlockRepo;

impl CalendarBlockRepo {
    /// Insert a manual block.
    pub async fn create(
        pool: &PgPool,
        professional_id: DbId,
        input: &CreateCalendarBlock,
    ) -> Result<CalendarBlock, sqlx::Error> {
        let query = format!(
            "INSERT INTO calendar_blocks \
                (professional_id, start_date_time, end_date_time, reason, is_recurring, \
                 recurring_pattern, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarBlock>(&query)
            .bind(professional_id)
            .bind(input.start_date_time)
            .bind(input.end_date_time)
            .bind(&input.reason)
            .bind(input.is_recurring)
            .bind(&input.recurring_pattern)
            .bind(SOURCE_MANUAL)
            .fetch_one(pool)
            .await
    }

    /// Insert or refresh a block mirrored from an external calendar event.
    pub async fn upsert_imported(
        pool: &PgPool,
        professional_id: DbId,
        external_event_id: &str,
        start: Timestamp,
        end: Timestamp,
        reason: Option<&str>,
    ) -> Result<CalendarBlock, sqlx::Error> {
        let query = format!(
            "INSERT INTO calendar_blocks \
                (professional_id, start_date_time, end_date_time, reason, source, external_event_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (professional_id, external_event_id) DO UPDATE \
             SET start_date_time = EXCLUDED.start_date_time, \
                 end_date_time = EXCLUDED.end_date_time, \
                 reason = EXCLUDED.reason \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarBlock>(&query)
            .bind(professional_id)
            .bind(start)
            .bind(end)
            .bind(reason)
            .bind(SOURCE_GOOGLE)
            .bind(external_event_id)
            .fetch_one(pool)
            .await
    }

    /// Delete imported blocks overlapping `window` whose external event id is
    /// not in `live_ids`. Manual blocks are never touched.
    pub async fn delete_stale_imported(
        pool: &PgPool,
        professional_id: DbId,
        window: &TimeRange,
        live_ids: &[String],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM calendar_blocks \
             WHERE professional_id = $1 AND source = $2 \
               AND start_date_time < $4 AND end_date_time > $3 \
               AND external_event_id <> ALL($5)",
        )
        .bind(professional_id)
        .bind(SOURCE_GOOGLE)
        .bind(window.start)
        .bind(window.end)
        .bind(live_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List blocks with `start >= from` and `end <= to` (either bound optional).
    pub async fn list(
        pool: &PgPool,
        professional_id: DbId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<CalendarBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_blocks \
             WHERE professional_id = $1 \
               AND ($2::timestamptz IS NULL OR start_date_time >= $2) \
               AND ($3::timestamptz IS NULL OR end_date_time <= $3) \
             ORDER BY start_date_time ASC"
        );
        sqlx::query_as::<_, CalendarBlock>(&query)
            .bind(professional_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Blocks overlapping `range`.
    pub async fn find_overlapping(
        pool: &PgPool,
        professional_id: DbId,
        range: &TimeRange,
    ) -> Result<Vec<CalendarBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_blocks \
             WHERE professional_id = $1 AND start_date_time < $3 AND end_date_time > $2 \
             ORDER BY start_date_time ASC"
        );
        sqlx::query_as::<_, CalendarBlock>(&query)
            .bind(professional_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await
    }
}
