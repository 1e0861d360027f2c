//! Live integration tests for mplscoffee-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/mplscoffee-db/`), so `"../../migrations"` resolves to the
//! workspace migration directory.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use mplscoffee_core::{CatalogStore, Coordinates, DetailRecord, ReconcileOutcome, ScheduleEntry};
use mplscoffee_db::{
    complete_harvest_run, count_catalog_entries, create_harvest_run, fail_harvest_run,
    get_catalog_entry, get_harvest_run, list_catalog_entries, list_harvest_runs, list_hours,
    reconcile_detail, set_is_good, start_harvest_run, DbError, HarvestRunCounts, PgCatalog,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, day, 3, 0, 0).unwrap()
}

fn record(place_id: &str, name: &str, periods: i16) -> DetailRecord {
    DetailRecord {
        place_id: place_id.to_string(),
        name: name.to_string(),
        address: "Minneapolis, MN".to_string(),
        rating: 4.5,
        user_ratings_total: 100,
        location: Coordinates::new(44.98, -93.27),
        website: "https://example.com".to_string(),
        schedule: (0..periods)
            .map(|day| ScheduleEntry {
                day_of_week: day,
                open_time: hm(7, 0),
                close_time: hm(17, 30),
            })
            .collect(),
        weekday_text: vec!["Sunday: 7 AM – 5:30 PM".to_string(), "Monday: closed".to_string()],
    }
}

// ---------------------------------------------------------------------------
// Section 1: Reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn reconcile_creates_new_entry_with_unset_verdict(pool: sqlx::PgPool) {
    let outcome = reconcile_detail(&pool, &record("p1", "Five Watt", 7), at(18))
        .await
        .expect("reconcile failed");
    assert_eq!(outcome, ReconcileOutcome::Created);

    let entry = get_catalog_entry(&pool, "p1").await.expect("get failed");
    assert_eq!(entry.name, "Five Watt");
    assert_eq!(entry.user_ratings_total, 100);
    assert_eq!(entry.location, Coordinates::new(44.98, -93.27));
    assert_eq!(entry.weekday_text, "Sunday: 7 AM – 5:30 PM|Monday: closed");
    assert_eq!(entry.last_updated, Some(at(18)));
    assert!(entry.is_good.is_none());
    assert_eq!(entry.hours.len(), 7);
    assert_eq!(entry.hours[3].day_of_week, 3);
    assert_eq!(entry.hours[3].close_time, hm(17, 30));
}

#[sqlx::test(migrations = "../../migrations")]
async fn reconcile_twice_is_idempotent_apart_from_timestamp(pool: sqlx::PgPool) {
    reconcile_detail(&pool, &record("p1", "Five Watt", 7), at(18))
        .await
        .unwrap();
    let first = get_catalog_entry(&pool, "p1").await.unwrap();

    let outcome = reconcile_detail(&pool, &record("p1", "Five Watt", 7), at(25))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Updated);

    let mut second = get_catalog_entry(&pool, "p1").await.unwrap();
    assert_eq!(second.last_updated, Some(at(25)));
    second.last_updated = first.last_updated;
    assert_eq!(second, first);

    let rows = list_hours(&pool, "p1").await.unwrap();
    assert_eq!(rows.len(), 7, "no duplicate hour rows");
}

#[sqlx::test(migrations = "../../migrations")]
async fn reconcile_replaces_hours_and_keeps_verdict(pool: sqlx::PgPool) {
    reconcile_detail(&pool, &record("p1", "Old Name", 7), at(18))
        .await
        .unwrap();
    set_is_good(&pool, "p1", Some(false)).await.unwrap();

    reconcile_detail(&pool, &record("p1", "New Name", 2), at(25))
        .await
        .unwrap();

    let entry = get_catalog_entry(&pool, "p1").await.unwrap();
    assert_eq!(entry.name, "New Name");
    assert_eq!(entry.is_good, Some(false), "harvest must not touch is_good");
    assert_eq!(entry.hours.len(), 2);

    let positions: Vec<i32> = list_hours(&pool, "p1")
        .await
        .unwrap()
        .iter()
        .map(|r| r.position)
        .collect();
    assert_eq!(positions, vec![0, 1]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn reconcile_with_empty_schedule_clears_hours(pool: sqlx::PgPool) {
    reconcile_detail(&pool, &record("p1", "Five Watt", 3), at(18))
        .await
        .unwrap();
    reconcile_detail(&pool, &record("p1", "Five Watt", 0), at(25))
        .await
        .unwrap();

    let entry = get_catalog_entry(&pool, "p1").await.unwrap();
    assert!(entry.hours.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_reconcile_rolls_back_the_entity(pool: sqlx::PgPool) {
    reconcile_detail(&pool, &record("p1", "Original", 2), at(18))
        .await
        .unwrap();

    // day_of_week 9 violates the hours check constraint after the row upsert.
    let mut bad = record("p1", "Should Not Stick", 1);
    bad.schedule[0].day_of_week = 9;
    let err = reconcile_detail(&pool, &bad, at(25)).await.unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)));

    let entry = get_catalog_entry(&pool, "p1").await.unwrap();
    assert_eq!(entry.name, "Original");
    assert_eq!(entry.last_updated, Some(at(18)));
    assert_eq!(entry.hours.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_entry_cascades_to_hours(pool: sqlx::PgPool) {
    reconcile_detail(&pool, &record("p1", "Five Watt", 4), at(18))
        .await
        .unwrap();

    sqlx::query("DELETE FROM coffee_shops WHERE place_id = $1")
        .bind("p1")
        .execute(&pool)
        .await
        .unwrap();

    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM coffee_shop_hours WHERE place_id = $1")
            .bind("p1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn pg_catalog_implements_store(pool: sqlx::PgPool) {
    let catalog = PgCatalog::new(pool.clone());
    let outcome = catalog
        .reconcile(&record("p1", "Five Watt", 1), at(18))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Created);
    assert_eq!(count_catalog_entries(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Section 2: Catalog reads and curation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn get_missing_entry_is_not_found(pool: sqlx::PgPool) {
    let err = get_catalog_entry(&pool, "nope").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_orders_by_name_and_pages(pool: sqlx::PgPool) {
    for (id, name) in [("p1", "Spyhouse"), ("p2", "Bull Run"), ("p3", "Dogwood")] {
        reconcile_detail(&pool, &record(id, name, 0), at(18))
            .await
            .unwrap();
    }

    let first_page = list_catalog_entries(&pool, 2, 0).await.unwrap();
    let names: Vec<&str> = first_page.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Bull Run", "Dogwood"]);

    let second_page = list_catalog_entries(&pool, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].name, "Spyhouse");
}

#[sqlx::test(migrations = "../../migrations")]
async fn set_is_good_round_trips_and_clears(pool: sqlx::PgPool) {
    reconcile_detail(&pool, &record("p1", "Five Watt", 0), at(18))
        .await
        .unwrap();

    set_is_good(&pool, "p1", Some(true)).await.unwrap();
    assert_eq!(get_catalog_entry(&pool, "p1").await.unwrap().is_good, Some(true));

    set_is_good(&pool, "p1", None).await.unwrap();
    assert!(get_catalog_entry(&pool, "p1").await.unwrap().is_good.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn set_is_good_on_missing_entry_is_not_found(pool: sqlx::PgPool) {
    let err = set_is_good(&pool, "nope", Some(true)).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 3: Harvest run ledger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn harvest_run_lifecycle_queued_to_succeeded(pool: sqlx::PgPool) {
    let run = create_harvest_run(&pool, "cli")
        .await
        .expect("create_harvest_run failed");
    assert_eq!(run.status, "queued");
    assert_eq!(run.trigger_source, "cli");
    assert!(run.started_at.is_none());

    start_harvest_run(&pool, run.id).await.unwrap();

    let counts = HarvestRunCounts {
        seeds_processed: 1,
        candidates_seen: 20,
        candidates_out_of_bounds: 5,
        candidates_duplicate: 3,
        candidates_unique: 12,
        entries_created: 10,
        entries_updated: 1,
        entries_skipped: 1,
        ..HarvestRunCounts::default()
    };
    complete_harvest_run(&pool, run.id, &counts).await.unwrap();

    let fetched = get_harvest_run(&pool, run.id).await.unwrap();
    assert_eq!(fetched.status, "succeeded");
    assert!(fetched.started_at.is_some());
    assert!(fetched.completed_at.is_some());
    assert_eq!(fetched.candidates_seen, 20);
    assert_eq!(fetched.candidates_out_of_bounds, 5);
    assert_eq!(fetched.candidates_duplicate, 3);
    assert_eq!(fetched.candidates_unique, 12);
    assert_eq!(fetched.entries_created, 10);
    assert!(fetched.error_message.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn harvest_run_lifecycle_running_to_failed(pool: sqlx::PgPool) {
    let run = create_harvest_run(&pool, "scheduler").await.unwrap();
    start_harvest_run(&pool, run.id).await.unwrap();
    fail_harvest_run(&pool, run.id, "places request failed for seed 55401")
        .await
        .unwrap();

    let fetched = get_harvest_run(&pool, run.id).await.unwrap();
    assert_eq!(fetched.status, "failed");
    assert_eq!(
        fetched.error_message.as_deref(),
        Some("places request failed for seed 55401")
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn queued_run_can_be_failed(pool: sqlx::PgPool) {
    let run = create_harvest_run(&pool, "cli").await.unwrap();
    fail_harvest_run(&pool, run.id, "could not start").await.unwrap();
    assert_eq!(get_harvest_run(&pool, run.id).await.unwrap().status, "failed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn completing_a_queued_run_is_rejected(pool: sqlx::PgPool) {
    let run = create_harvest_run(&pool, "cli").await.unwrap();
    let err = complete_harvest_run(&pool, run.id, &HarvestRunCounts::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidHarvestRunTransition {
            expected_status: "running",
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn starting_twice_is_rejected(pool: sqlx::PgPool) {
    let run = create_harvest_run(&pool, "cli").await.unwrap();
    start_harvest_run(&pool, run.id).await.unwrap();
    let err = start_harvest_run(&pool, run.id).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidHarvestRunTransition { .. }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_trigger_source_is_rejected(pool: sqlx::PgPool) {
    let err = create_harvest_run(&pool, "webhook").await.unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_harvest_runs_newest_first(pool: sqlx::PgPool) {
    let first = create_harvest_run(&pool, "cli").await.unwrap();
    let second = create_harvest_run(&pool, "scheduler").await.unwrap();

    let runs = list_harvest_runs(&pool, 10).await.unwrap();
    let ids: Vec<i64> = runs.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let limited = list_harvest_runs(&pool, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}
