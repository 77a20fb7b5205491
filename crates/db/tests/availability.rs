//! Integration tests for availability windows, exceptions, blocks and settings.

mod common;

use assist_core::availability::WindowInput;
use assist_core::conflict::TimeRange;
use assist_db::models::calendar_block::CreateCalendarBlock;
use assist_db::models::calendar_settings::UpdateCalendarSettings;
use assist_db::repositories::{
    AvailabilityRepo, CalendarBlockRepo, CalendarSettingsRepo, ExceptionRepo,
};
use chrono::NaiveDate;
use common::{at, insert_user};
use sqlx::PgPool;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
}

// ---------------------------------------------------------------------------
// Weekly windows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_defaults_materialized_once(pool: PgPool) {
    let pro = insert_user(&pool, "Pro", "professional").await;

    AvailabilityRepo::ensure_defaults(&pool, pro).await.unwrap();
    AvailabilityRepo::ensure_defaults(&pool, pro).await.unwrap();

    let week = AvailabilityRepo::list(&pool, pro).await.unwrap();
    assert_eq!(week.len(), 7);
    assert!(!week[0].is_active);
    assert_eq!(week[1].start_time, "09:00");
    assert_eq!(week[6].end_time, "18:00");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_week_is_idempotent(pool: PgPool) {
    let pro = insert_user(&pool, "Pro", "professional").await;
    AvailabilityRepo::ensure_defaults(&pool, pro).await.unwrap();

    let monday = vec![WindowInput {
        day_of_week: 1,
        start_time: "08:00".into(),
        end_time: "12:00".into(),
        is_active: true,
    }];
    AvailabilityRepo::upsert_week(&pool, pro, &monday).await.unwrap();
    AvailabilityRepo::upsert_week(&pool, pro, &monday).await.unwrap();

    let week = AvailabilityRepo::list(&pool, pro).await.unwrap();
    assert_eq!(week.len(), 7);
    let rows: Vec<_> = week.iter().filter(|w| w.day_of_week == 1).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].start_time, "08:00");
}

// ---------------------------------------------------------------------------
// Exceptions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_days_off_upsert_per_date(pool: PgPool) {
    let pro = insert_user(&pool, "Pro", "professional").await;
    let days = [date(24), date(25), date(26)];

    let created = ExceptionRepo::upsert_days_off(&pool, pro, &days, Some("Holidays"))
        .await
        .unwrap();
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|e| !e.is_working_day));

    ExceptionRepo::upsert_days_off(&pool, pro, &days[1..], Some("Christmas"))
        .await
        .unwrap();

    let listed = ExceptionRepo::list(&pool, pro, None, None).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[1].reason.as_deref(), Some("Christmas"));

    let from_25 = ExceptionRepo::list(&pool, pro, Some(date(25)), None)
        .await
        .unwrap();
    assert_eq!(from_25.len(), 2);

    assert!(ExceptionRepo::delete(&pool, listed[0].id).await.unwrap());
    assert!(ExceptionRepo::find_by_id(&pool, listed[0].id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blocks_overlap_and_import(pool: PgPool) {
    let pro = insert_user(&pool, "Pro", "professional").await;
    let block = CalendarBlockRepo::create(
        &pool,
        pro,
        &CreateCalendarBlock {
            start_date_time: at(12, 0),
            end_date_time: at(13, 0),
            reason: Some("Lunch".into()),
            is_recurring: false,
            recurring_pattern: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(block.source, "manual");

    let hit = TimeRange::new(at(12, 30), at(14, 0)).unwrap();
    let miss = TimeRange::new(at(13, 0), at(14, 0)).unwrap();
    assert_eq!(
        CalendarBlockRepo::find_overlapping(&pool, pro, &hit).await.unwrap().len(),
        1
    );
    assert!(CalendarBlockRepo::find_overlapping(&pool, pro, &miss)
        .await
        .unwrap()
        .is_empty());

    let first = CalendarBlockRepo::upsert_imported(&pool, pro, "evt-1", at(8, 0), at(9, 0), None)
        .await
        .unwrap();
    let again =
        CalendarBlockRepo::upsert_imported(&pool, pro, "evt-1", at(8, 30), at(9, 30), Some("Gym"))
            .await
            .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(again.source, "google");
    assert_eq!(again.start_date_time, at(8, 30));

    let all = CalendarBlockRepo::list(&pool, pro, None, None).await.unwrap();
    assert_eq!(all.len(), 2);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_lazy_defaults_and_partial_update(pool: PgPool) {
    let pro = insert_user(&pool, "Pro", "professional").await;

    let settings = CalendarSettingsRepo::get_or_create(&pool, pro).await.unwrap();
    assert_eq!(settings.default_view, "week");
    assert_eq!(settings.time_slot_duration, 30);
    assert!(!settings.google_calendar_connected);

    let again = CalendarSettingsRepo::get_or_create(&pool, pro).await.unwrap();
    assert_eq!(settings.id, again.id);

    let updated = CalendarSettingsRepo::update(
        &pool,
        pro,
        &UpdateCalendarSettings {
            default_view: Some("month".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.default_view, "month");
    assert_eq!(updated.min_time, "08:00");
}
