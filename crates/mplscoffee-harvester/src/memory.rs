//! In-memory catalog used by dry runs and pipeline tests.
//!
//! Entries and hour rows are held in separate tables linked by `place_id`,
//! the same shape as the Postgres schema: hour rows carry their own id and
//! are removed with their owning entry.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use mplscoffee_core::{CatalogEntry, CatalogStore, DetailRecord, HoursEntry, ReconcileOutcome};

/// One stored opening period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRow {
    pub id: i64,
    pub place_id: String,
    pub position: i32,
    pub hours: HoursEntry,
}

#[derive(Debug, Default)]
struct Tables {
    /// Entries with `hours` left empty; hours live in `hour_rows`.
    entries: BTreeMap<String, CatalogEntry>,
    hour_rows: Vec<HourRow>,
    next_hour_id: i64,
}

impl Tables {
    fn hours_of(&self, place_id: &str) -> Vec<HoursEntry> {
        let mut rows: Vec<&HourRow> = self
            .hour_rows
            .iter()
            .filter(|r| r.place_id == place_id)
            .collect();
        rows.sort_by_key(|r| r.position);
        rows.into_iter().map(|r| r.hours).collect()
    }

    fn assemble(&self, entry: &CatalogEntry) -> CatalogEntry {
        let mut full = entry.clone();
        full.hours = self.hours_of(&entry.place_id);
        full
    }
}

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: Mutex<Tables>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic mid-reconcile cannot leave a half-written entry: every write
    // happens after the merge is computed.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds an entry as if it had been curated or harvested earlier.
    pub fn insert(&self, entry: CatalogEntry) {
        let mut tables = self.lock();
        let place_id = entry.place_id.clone();
        tables.hour_rows.retain(|r| r.place_id != place_id);
        write_hours(&mut tables, &place_id, &entry.hours);
        let mut stored = entry;
        stored.hours.clear();
        tables.entries.insert(place_id, stored);
    }

    /// The entry with its hours, if present.
    #[must_use]
    pub fn get(&self, place_id: &str) -> Option<CatalogEntry> {
        let tables = self.lock();
        tables.entries.get(place_id).map(|e| tables.assemble(e))
    }

    /// Every entry ordered by `place_id`.
    #[must_use]
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let tables = self.lock();
        tables.entries.values().map(|e| tables.assemble(e)).collect()
    }

    /// Removes an entry and, with it, every hour row it owns.
    pub fn remove(&self, place_id: &str) -> Option<CatalogEntry> {
        let mut tables = self.lock();
        let removed = tables.entries.remove(place_id)?;
        let hours = tables.hours_of(place_id);
        tables.hour_rows.retain(|r| r.place_id != place_id);
        let mut full = removed;
        full.hours = hours;
        Some(full)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Stored hour rows across all entries, in insertion order.
    #[must_use]
    pub fn hour_rows(&self) -> Vec<HourRow> {
        self.lock().hour_rows.clone()
    }

    fn reconcile_sync(&self, record: &DetailRecord, run_at: DateTime<Utc>) -> ReconcileOutcome {
        let mut tables = self.lock();
        let (mut entry, outcome) = match tables.entries.get(&record.place_id) {
            Some(existing) => (tables.assemble(existing), ReconcileOutcome::Updated),
            None => (
                CatalogEntry::new(record.place_id.clone()),
                ReconcileOutcome::Created,
            ),
        };
        entry.apply_detail(record, run_at);

        tables.hour_rows.retain(|r| r.place_id != record.place_id);
        write_hours(&mut tables, &record.place_id, &entry.hours);
        entry.hours.clear();
        tables.entries.insert(record.place_id.clone(), entry);
        outcome
    }
}

fn write_hours(tables: &mut Tables, place_id: &str, hours: &[HoursEntry]) {
    for (position, h) in (0i32..).zip(hours) {
        tables.next_hour_id += 1;
        let id = tables.next_hour_id;
        tables.hour_rows.push(HourRow {
            id,
            place_id: place_id.to_string(),
            position,
            hours: *h,
        });
    }
}

impl CatalogStore for MemoryCatalog {
    type Error = Infallible;

    async fn reconcile(
        &self,
        record: &DetailRecord,
        run_at: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, Self::Error> {
        Ok(self.reconcile_sync(record, run_at))
    }
}
