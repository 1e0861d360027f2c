//! Read operations for the catalog tables.

use mplscoffee_core::{CatalogEntry, HoursEntry};
use sqlx::PgPool;

use super::types::{CoffeeShopRow, HoursRow};
use crate::DbError;

/// Fetches one entry with its hours in position order.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entry has `place_id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn get_catalog_entry(pool: &PgPool, place_id: &str) -> Result<CatalogEntry, DbError> {
    let row = sqlx::query_as::<_, CoffeeShopRow>(
        "SELECT place_id, name, address, latitude, longitude, rating, user_ratings_total, \
                weekday_text, website, last_updated, is_good, created_at \
         FROM coffee_shops \
         WHERE place_id = $1",
    )
    .bind(place_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let hours = list_hours(pool, place_id).await?;
    Ok(row.into_entry(hours.iter().map(HoursEntry::from).collect()))
}

/// Hour rows for one entry, ordered by `position`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_hours(pool: &PgPool, place_id: &str) -> Result<Vec<HoursRow>, sqlx::Error> {
    sqlx::query_as::<_, HoursRow>(
        "SELECT id, place_id, position, day_of_week, open_time, close_time \
         FROM coffee_shop_hours \
         WHERE place_id = $1 \
         ORDER BY position",
    )
    .bind(place_id)
    .fetch_all(pool)
    .await
}

/// Catalog rows ordered by name, then `place_id` for a stable page order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_catalog_entries(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<CoffeeShopRow>, sqlx::Error> {
    sqlx::query_as::<_, CoffeeShopRow>(
        "SELECT place_id, name, address, latitude, longitude, rating, user_ratings_total, \
                weekday_text, website, last_updated, is_good, created_at \
         FROM coffee_shops \
         ORDER BY name, place_id \
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_catalog_entries(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM coffee_shops")
        .fetch_one(pool)
        .await
}
