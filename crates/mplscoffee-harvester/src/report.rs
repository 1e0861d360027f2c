use serde::Serialize;

/// Counters for one harvest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub seeds_processed: usize,
    pub seeds_skipped: usize,
    /// Raw search hits across every seed and page.
    pub candidates_seen: usize,
    pub candidates_out_of_bounds: usize,
    pub candidates_duplicate: usize,
    pub candidates_unique: usize,
    pub entries_created: usize,
    pub entries_updated: usize,
    pub entries_skipped: usize,
    /// Detail fetched but the catalog write failed.
    pub entries_failed: usize,
}

impl HarvestReport {
    /// Entries written to the catalog, new or existing.
    #[must_use]
    pub fn entries_reconciled(&self) -> usize {
        self.entries_created + self.entries_updated
    }
}
