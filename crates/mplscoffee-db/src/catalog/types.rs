//! Row types for the catalog tables.

use chrono::{DateTime, NaiveTime, Utc};
use mplscoffee_core::{CatalogEntry, Coordinates, HoursEntry};

/// A row from the `coffee_shops` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CoffeeShopRow {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub user_ratings_total: i32,
    /// Lines joined with `mplscoffee_core::WEEKDAY_TEXT_DELIMITER`.
    pub weekday_text: String,
    pub website: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_good: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl CoffeeShopRow {
    /// Rebuilds the domain entry; `hours` must already be in position order.
    #[must_use]
    pub fn into_entry(self, hours: Vec<HoursEntry>) -> CatalogEntry {
        CatalogEntry {
            place_id: self.place_id,
            name: self.name,
            address: self.address,
            location: Coordinates::new(self.latitude, self.longitude),
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            weekday_text: self.weekday_text,
            website: self.website,
            last_updated: self.last_updated,
            is_good: self.is_good,
            hours,
        }
    }
}

/// A row from the `coffee_shop_hours` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HoursRow {
    pub id: i64,
    pub place_id: String,
    pub position: i32,
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl From<&HoursRow> for HoursEntry {
    fn from(row: &HoursRow) -> Self {
        Self {
            day_of_week: row.day_of_week,
            open_time: row.open_time,
            close_time: row.close_time,
        }
    }
}
