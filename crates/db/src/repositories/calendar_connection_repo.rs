//! Repository for the `calendar_connections` table.

use assist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::calendar_connection::{CalendarConnection, UpsertCalendarConnection};

/// Column list for `calendar_connections` queries.
const COLUMNS: &str = "id, professional_id, provider, access_token, refresh_token, expires_at, \
    scope, account_email, calendar_id, last_sync_at, created_at, updated_at";

/// Provides OAuth connection storage.
pub struct CalendarConnectionRepo;

impl CalendarConnectionRepo {
    pub async fn find_by_professional(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<Option<CalendarConnection>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM calendar_connections WHERE professional_id = $1");
        sqlx::query_as::<_, CalendarConnection>(&query)
            .bind(professional_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the professional's connection.
    ///
    /// A missing refresh token keeps the stored one, since providers only
    /// return it on the first consent.
    pub async fn upsert(
        pool: &PgPool,
        professional_id: DbId,
        input: &UpsertCalendarConnection,
    ) -> Result<CalendarConnection, sqlx::Error> {
        let query = format!(
            "INSERT INTO calendar_connections \
                (professional_id, access_token, refresh_token, expires_at, scope, account_email) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (professional_id) DO UPDATE \
             SET access_token = EXCLUDED.access_token, \
                 refresh_token = COALESCE(EXCLUDED.refresh_token, calendar_connections.refresh_token), \
                 expires_at = EXCLUDED.expires_at, \
                 scope = COALESCE(EXCLUDED.scope, calendar_connections.scope), \
                 account_email = COALESCE(EXCLUDED.account_email, calendar_connections.account_email) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarConnection>(&query)
            .bind(professional_id)
            .bind(&input.access_token)
            .bind(&input.refresh_token)
            .bind(input.expires_at)
            .bind(&input.scope)
            .bind(&input.account_email)
            .fetch_one(pool)
            .await
    }

    /// Store a refreshed access token.
    pub async fn update_access_token(
        pool: &PgPool,
        professional_id: DbId,
        access_token: &str,
        expires_at: Option<Timestamp>,
    ) -> Result<Option<CalendarConnection>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_connections SET access_token = $2, expires_at = $3 \
             WHERE professional_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarConnection>(&query)
            .bind(professional_id)
            .bind(access_token)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Change the calendar used for sync.
    pub async fn set_calendar_id(
        pool: &PgPool,
        professional_id: DbId,
        calendar_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE calendar_connections SET calendar_id = $2 WHERE professional_id = $1")
                .bind(professional_id)
                .bind(calendar_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_last_sync(
        pool: &PgPool,
        professional_id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE calendar_connections SET last_sync_at = $2 WHERE professional_id = $1")
            .bind(professional_id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Remove the connection. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, professional_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_connections WHERE professional_id = $1")
            .bind(professional_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
