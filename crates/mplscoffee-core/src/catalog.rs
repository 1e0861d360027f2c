//! Catalog entries and the merge rules applied when a fresh detail record
//! meets the persisted catalog.
//!
//! The rules are storage-agnostic: [`CatalogEntry::apply_detail`] is used
//! by the Postgres store inside its per-entity transaction and by the
//! in-memory store used for dry runs.

use std::future::Future;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::places::{DetailRecord, ScheduleEntry};

/// Separator used when flattening `weekday_text` into one column.
///
/// Segments containing the delimiter are not escaped.
pub const WEEKDAY_TEXT_DELIMITER: &str = "|";

/// One persisted opening period, owned by its [`CatalogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursEntry {
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl From<&ScheduleEntry> for HoursEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            day_of_week: entry.day_of_week,
            open_time: entry.open_time,
            close_time: entry.close_time,
        }
    }
}

/// A coffee shop as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    pub rating: f64,
    pub user_ratings_total: i32,
    pub weekday_text: String,
    pub website: String,
    pub last_updated: Option<DateTime<Utc>>,
    /// Operator-curated verdict. The harvester never writes it.
    pub is_good: Option<bool>,
    pub hours: Vec<HoursEntry>,
}

impl CatalogEntry {
    /// A blank entry carrying only its identifier.
    #[must_use]
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: String::new(),
            address: String::new(),
            location: Coordinates::new(0.0, 0.0),
            rating: 0.0,
            user_ratings_total: 0,
            weekday_text: String::new(),
            website: String::new(),
            last_updated: None,
            is_good: None,
            hours: Vec::new(),
        }
    }

    /// Overwrites every harvested field from `record` and stamps `run_at`.
    ///
    /// Last write wins: scalars are replaced unconditionally, the hours
    /// collection is discarded and rebuilt in schedule order, and
    /// `last_updated` is stamped even when nothing else changed. `place_id`
    /// and `is_good` are left alone.
    pub fn apply_detail(&mut self, record: &DetailRecord, run_at: DateTime<Utc>) {
        self.name.clone_from(&record.name);
        self.address.clone_from(&record.address);
        self.location = record.location;
        self.rating = record.rating;
        self.user_ratings_total = record.user_ratings_total;
        self.website.clone_from(&record.website);
        self.weekday_text = join_weekday_text(&record.weekday_text);

        self.hours.clear();
        self.hours
            .extend(record.schedule.iter().map(HoursEntry::from));

        self.last_updated = Some(run_at);
    }
}

/// Joins weekday text lines with [`WEEKDAY_TEXT_DELIMITER`].
#[must_use]
pub fn join_weekday_text(lines: &[String]) -> String {
    lines.join(WEEKDAY_TEXT_DELIMITER)
}

/// Whether a reconcile inserted a new entry or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
}

/// Persistence seam for the reconciliation step.
///
/// Implementations must apply one record as a single unit of work: either
/// the entry and its full hours collection are written, or nothing is.
pub trait CatalogStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Upserts the entry for `record.place_id`, replacing its hours and
    /// stamping `last_updated = run_at`.
    fn reconcile(
        &self,
        record: &DetailRecord,
        run_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<ReconcileOutcome, Self::Error>> + Send;
}
