//! Database operations for the `harvest_runs` ledger.
//!
//! Runs move `queued → running → succeeded | failed`; each transition is
//! guarded on the expected prior status.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `harvest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HarvestRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub seeds_processed: i32,
    pub seeds_skipped: i32,
    pub candidates_seen: i32,
    pub candidates_out_of_bounds: i32,
    pub candidates_duplicate: i32,
    pub candidates_unique: i32,
    pub entries_created: i32,
    pub entries_updated: i32,
    pub entries_skipped: i32,
    pub entries_failed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters recorded when a run succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestRunCounts {
    pub seeds_processed: i32,
    pub seeds_skipped: i32,
    pub candidates_seen: i32,
    pub candidates_out_of_bounds: i32,
    pub candidates_duplicate: i32,
    pub candidates_unique: i32,
    pub entries_created: i32,
    pub entries_updated: i32,
    pub entries_skipped: i32,
    pub entries_failed: i32,
}

impl HarvestRunCounts {
    /// Narrows a `usize` counter for an `INTEGER` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::CountOverflow`] when `value` exceeds `i32::MAX`.
    pub fn narrow(field: &'static str, value: usize) -> Result<i32, DbError> {
        i32::try_from(value).map_err(|_| DbError::CountOverflow { field, value })
    }
}

const COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
                       seeds_processed, seeds_skipped, candidates_seen, \
                       candidates_out_of_bounds, candidates_duplicate, candidates_unique, \
                       entries_created, entries_updated, entries_skipped, entries_failed, \
                       error_message, created_at";

/// Creates a new run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown
/// `trigger_source`, rejected by the table's check constraint).
pub async fn create_harvest_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<HarvestRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, HarvestRunRow>(&format!(
        "INSERT INTO harvest_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {COLUMNS}"
    ))
    .bind(public_id)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidHarvestRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_harvest_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE harvest_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidHarvestRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded`, sets `completed_at = NOW()` and the counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidHarvestRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_harvest_run(
    pool: &PgPool,
    id: i64,
    counts: &HarvestRunCounts,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE harvest_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             seeds_processed = $1, seeds_skipped = $2, candidates_seen = $3, \
             candidates_out_of_bounds = $4, candidates_duplicate = $5, \
             candidates_unique = $6, entries_created = $7, entries_updated = $8, \
             entries_skipped = $9, entries_failed = $10 \
         WHERE id = $11 AND status = 'running'",
    )
    .bind(counts.seeds_processed)
    .bind(counts.seeds_skipped)
    .bind(counts.candidates_seen)
    .bind(counts.candidates_out_of_bounds)
    .bind(counts.candidates_duplicate)
    .bind(counts.candidates_unique)
    .bind(counts.entries_created)
    .bind(counts.entries_updated)
    .bind(counts.entries_skipped)
    .bind(counts.entries_failed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidHarvestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// Accepts a run that is still `queued` so that a failure to start can
/// be recorded too.
///
/// # Errors
///
/// Returns [`DbError::InvalidHarvestRunTransition`] if the run already
/// finished, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_harvest_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE harvest_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status IN ('queued', 'running')",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidHarvestRunTransition {
            id,
            expected_status: "queued or running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_harvest_run(pool: &PgPool, id: i64) -> Result<HarvestRunRow, DbError> {
    let row = sqlx::query_as::<_, HarvestRunRow>(&format!(
        "SELECT {COLUMNS} FROM harvest_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_harvest_runs(pool: &PgPool, limit: i64) -> Result<Vec<HarvestRunRow>, DbError> {
    let rows = sqlx::query_as::<_, HarvestRunRow>(&format!(
        "SELECT {COLUMNS} FROM harvest_runs ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
