//! Repository for the `calendar_settings` table.

use assist_core::calendar_settings as defaults;
use assist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::calendar_settings::{CalendarSettings, UpdateCalendarSettings};

/// Column list for `calendar_settings` queries.
const COLUMNS: &str = "id, professional_id, default_view, week_starts_on, time_slot_duration, \
    min_time, max_time, show_weekends, default_intervention_duration, default_buffer_time, \
    max_concurrent_interventions, auto_confirm_interventions, send_reminders, reminder_timing, \
    time_zone, color_scheme, google_calendar_connected, google_sync_enabled, last_google_sync, \
    created_at, updated_at";

/// Provides calendar settings operations.
pub struct CalendarSettingsRepo;

impl CalendarSettingsRepo {
    /// Return the professional's settings, creating the default row if absent.
    pub async fn get_or_create(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<CalendarSettings, sqlx::Error> {
        sqlx::query(
            "INSERT INTO calendar_settings \
                (professional_id, default_view, week_starts_on, time_slot_duration, min_time, \
                 max_time, default_intervention_duration, default_buffer_time, \
                 max_concurrent_interventions, reminder_timing, time_zone, color_scheme) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (professional_id) DO NOTHING",
        )
        .bind(professional_id)
        .bind(defaults::DEFAULT_VIEW)
        .bind(defaults::DEFAULT_WEEK_STARTS_ON)
        .bind(defaults::DEFAULT_TIME_SLOT_DURATION)
        .bind(defaults::DEFAULT_MIN_TIME)
        .bind(defaults::DEFAULT_MAX_TIME)
        .bind(defaults::DEFAULT_INTERVENTION_DURATION)
        .bind(defaults::DEFAULT_BUFFER_TIME)
        .bind(defaults::DEFAULT_MAX_CONCURRENT)
        .bind(defaults::default_reminder_timing())
        .bind(defaults::DEFAULT_TIME_ZONE)
        .bind(defaults::default_color_scheme())
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM calendar_settings WHERE professional_id = $1");
        sqlx::query_as::<_, CalendarSettings>(&query)
            .bind(professional_id)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. The row must already exist.
    pub async fn update(
        pool: &PgPool,
        professional_id: DbId,
        input: &UpdateCalendarSettings,
    ) -> Result<Option<CalendarSettings>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_settings SET \
                default_view = COALESCE($2, default_view), \
                week_starts_on = COALESCE($3, week_starts_on), \
                time_slot_duration = COALESCE($4, time_slot_duration), \
                min_time = COALESCE($5, min_time), \
                max_time = COALESCE($6, max_time), \
                show_weekends = COALESCE($7, show_weekends), \
                default_intervention_duration = COALESCE($8, default_intervention_duration), \
                default_buffer_time = COALESCE($9, default_buffer_time), \
                max_concurrent_interventions = COALESCE($10, max_concurrent_interventions), \
                auto_confirm_interventions = COALESCE($11, auto_confirm_interventions), \
                send_reminders = COALESCE($12, send_reminders), \
                reminder_timing = COALESCE($13, reminder_timing), \
                time_zone = COALESCE($14, time_zone), \
                color_scheme = COALESCE($15, color_scheme), \
                google_sync_enabled = COALESCE($16, google_sync_enabled) \
             WHERE professional_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarSettings>(&query)
            .bind(professional_id)
            .bind(&input.default_view)
            .bind(input.week_starts_on)
            .bind(input.time_slot_duration)
            .bind(&input.min_time)
            .bind(&input.max_time)
            .bind(input.show_weekends)
            .bind(input.default_intervention_duration)
            .bind(input.default_buffer_time)
            .bind(input.max_concurrent_interventions)
            .bind(input.auto_confirm_interventions)
            .bind(input.send_reminders)
            .bind(&input.reminder_timing)
            .bind(&input.time_zone)
            .bind(&input.color_scheme)
            .bind(input.google_sync_enabled)
            .fetch_optional(pool)
            .await
    }

    /// Record whether an external calendar is connected.
    pub async fn set_google_connected(
        pool: &PgPool,
        professional_id: DbId,
        connected: bool,
    ) -> Result<(), sqlx::Error> {
        Self::get_or_create(pool, professional_id).await?;
        sqlx::query(
            "UPDATE calendar_settings \
             SET google_calendar_connected = $2, google_sync_enabled = $2 \
             WHERE professional_id = $1",
        )
        .bind(professional_id)
        .bind(connected)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record the time of the last successful sync.
    pub async fn set_last_sync(
        pool: &PgPool,
        professional_id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE calendar_settings SET last_google_sync = $2 WHERE professional_id = $1")
            .bind(professional_id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }
}
