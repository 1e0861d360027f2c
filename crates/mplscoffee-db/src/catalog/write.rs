//! Write operations for the catalog tables.

use chrono::{DateTime, NaiveTime, Utc};
use mplscoffee_core::{CatalogEntry, DetailRecord, ReconcileOutcome};
use sqlx::{PgPool, Postgres, Transaction};

use super::types::CoffeeShopRow;
use crate::DbError;

/// Merges one detail record into the catalog inside a single transaction.
///
/// The existing row (if any) is locked, the core merge rules are applied,
/// the row is upserted without touching `is_good`, and the entry's hours
/// are deleted and re-inserted in schedule order. A failure anywhere rolls
/// back the whole entity.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement or the commit fails.
pub async fn reconcile_detail(
    pool: &PgPool,
    record: &DetailRecord,
    run_at: DateTime<Utc>,
) -> Result<ReconcileOutcome, DbError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, CoffeeShopRow>(
        "SELECT place_id, name, address, latitude, longitude, rating, user_ratings_total, \
                weekday_text, website, last_updated, is_good, created_at \
         FROM coffee_shops \
         WHERE place_id = $1 \
         FOR UPDATE",
    )
    .bind(&record.place_id)
    .fetch_optional(&mut *tx)
    .await?;

    // Hours are replaced wholesale, so the old ones are never loaded.
    let mut entry = existing.map_or_else(
        || CatalogEntry::new(record.place_id.clone()),
        |row| row.into_entry(Vec::new()),
    );
    entry.apply_detail(record, run_at);

    let is_new = upsert_entry(&mut tx, &entry).await?;
    replace_hours(&mut tx, &entry).await?;

    tx.commit().await?;

    tracing::debug!(
        place_id = %entry.place_id,
        hours = entry.hours.len(),
        is_new,
        "catalog entry reconciled"
    );

    Ok(if is_new {
        ReconcileOutcome::Created
    } else {
        ReconcileOutcome::Updated
    })
}

/// Returns `true` when the row was inserted rather than updated.
async fn upsert_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: &CatalogEntry,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "INSERT INTO coffee_shops \
             (place_id, name, address, latitude, longitude, rating, user_ratings_total, \
              weekday_text, website, last_updated) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (place_id) DO UPDATE SET \
             name               = EXCLUDED.name, \
             address            = EXCLUDED.address, \
             latitude           = EXCLUDED.latitude, \
             longitude          = EXCLUDED.longitude, \
             rating             = EXCLUDED.rating, \
             user_ratings_total = EXCLUDED.user_ratings_total, \
             weekday_text       = EXCLUDED.weekday_text, \
             website            = EXCLUDED.website, \
             last_updated       = EXCLUDED.last_updated \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&entry.place_id)
    .bind(&entry.name)
    .bind(&entry.address)
    .bind(entry.location.lat)
    .bind(entry.location.lng)
    .bind(entry.rating)
    .bind(entry.user_ratings_total)
    .bind(&entry.weekday_text)
    .bind(&entry.website)
    .bind(entry.last_updated)
    .fetch_one(&mut **tx)
    .await
}

async fn replace_hours(
    tx: &mut Transaction<'_, Postgres>,
    entry: &CatalogEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM coffee_shop_hours WHERE place_id = $1")
        .bind(&entry.place_id)
        .execute(&mut **tx)
        .await?;

    if entry.hours.is_empty() {
        return Ok(());
    }

    let days: Vec<i16> = entry.hours.iter().map(|h| h.day_of_week).collect();
    let opens: Vec<NaiveTime> = entry.hours.iter().map(|h| h.open_time).collect();
    let closes: Vec<NaiveTime> = entry.hours.iter().map(|h| h.close_time).collect();

    sqlx::query(
        "INSERT INTO coffee_shop_hours \
             (place_id, position, day_of_week, open_time, close_time) \
         SELECT $1, (t.ord - 1)::int, t.day_of_week, t.open_time, t.close_time \
         FROM UNNEST($2::smallint[], $3::time[], $4::time[]) \
              WITH ORDINALITY AS t(day_of_week, open_time, close_time, ord)",
    )
    .bind(&entry.place_id)
    .bind(&days)
    .bind(&opens)
    .bind(&closes)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Sets or clears the operator verdict for one entry.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entry has `place_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_is_good(
    pool: &PgPool,
    place_id: &str,
    is_good: Option<bool>,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE coffee_shops SET is_good = $1 WHERE place_id = $2")
        .bind(is_good)
        .bind(place_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
