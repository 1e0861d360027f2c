//! One harvest run: seeds → candidates → details → catalog.
//!
//! Everything is sequential. The provider rate-limits per key and each
//! continuation page depends on the previous response, so no request is
//! issued while another is in flight.

use chrono::{DateTime, Utc};
use mplscoffee_core::{
    BoundingBox, Candidate, CatalogStore, Coordinates, DetailRecord, MissingDataPolicy,
    ReconcileOutcome,
};
use mplscoffee_places::PlacesClient;

use crate::candidates::{Admission, CandidateSet};
use crate::error::HarvestError;
use crate::outcome::UnitOutcome;
use crate::report::HarvestReport;

pub struct Harvester<'a, S> {
    places: &'a PlacesClient,
    store: &'a S,
    bounds: BoundingBox,
    policy: MissingDataPolicy,
}

impl<'a, S: CatalogStore + Sync> Harvester<'a, S> {
    #[must_use]
    pub fn new(
        places: &'a PlacesClient,
        store: &'a S,
        bounds: BoundingBox,
        policy: MissingDataPolicy,
    ) -> Self {
        Self {
            places,
            store,
            bounds,
            policy,
        }
    }

    /// Runs a full harvest over `seeds`, stamping every reconciled entry
    /// with `run_at`.
    ///
    /// Entries reconciled before a fatal error stay committed.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError`] on a transport or provider failure, or on
    /// missing data when the policy is [`MissingDataPolicy::Abort`].
    pub async fn run(
        &self,
        seeds: &[String],
        run_at: DateTime<Utc>,
    ) -> Result<HarvestReport, HarvestError> {
        if seeds.is_empty() {
            return Err(HarvestError::NoSeeds);
        }

        let mut report = HarvestReport::default();
        let candidates = self.collect_candidates(seeds, &mut report).await?;
        report.candidates_unique = candidates.len();
        tracing::info!(
            seeds = seeds.len(),
            seen = report.candidates_seen,
            unique = report.candidates_unique,
            out_of_bounds = report.candidates_out_of_bounds,
            duplicates = report.candidates_duplicate,
            "candidate collection complete"
        );

        for candidate in candidates.iter() {
            match self.fetch_detail(candidate).await {
                UnitOutcome::Done(record) => self.reconcile(&record, run_at, &mut report).await,
                UnitOutcome::Skipped { reason } => {
                    tracing::warn!(place_id = %candidate.place_id, %reason, "skipping candidate");
                    report.entries_skipped += 1;
                }
                UnitOutcome::Fatal(e) => return Err(e),
            }
        }

        tracing::info!(
            created = report.entries_created,
            updated = report.entries_updated,
            skipped = report.entries_skipped,
            failed = report.entries_failed,
            "harvest run complete"
        );
        Ok(report)
    }

    /// Expands every seed into search hits and folds them into a
    /// geofenced, deduplicated set.
    async fn collect_candidates(
        &self,
        seeds: &[String],
        report: &mut HarvestReport,
    ) -> Result<CandidateSet, HarvestError> {
        let mut set = CandidateSet::new(self.bounds);

        for seed in seeds {
            let hits = match self.search_seed(seed).await {
                UnitOutcome::Done(hits) => hits,
                UnitOutcome::Skipped { reason } => {
                    tracing::warn!(seed = %seed, %reason, "skipping seed");
                    report.seeds_skipped += 1;
                    continue;
                }
                UnitOutcome::Fatal(e) => return Err(e),
            };
            report.seeds_processed += 1;
            report.candidates_seen += hits.len();

            for hit in hits {
                match set.offer(hit) {
                    Admission::Inserted => {}
                    Admission::Duplicate => report.candidates_duplicate += 1,
                    Admission::OutOfBounds => report.candidates_out_of_bounds += 1,
                }
            }
        }

        Ok(set)
    }

    async fn search_seed(&self, seed: &str) -> UnitOutcome<Vec<Candidate>> {
        let location: Coordinates = match self.places.geocode(seed).await {
            Ok(Some(location)) => location,
            Ok(None) => {
                return UnitOutcome::missing(
                    self.policy,
                    "geocoder returned no location".to_string(),
                    || HarvestError::SeedNotGeocoded {
                        seed: seed.to_string(),
                    },
                )
            }
            Err(e) => return UnitOutcome::Fatal(HarvestError::places(format!("seed {seed}"), e)),
        };

        match self.places.nearby_search(location).await {
            Ok(hits) => {
                tracing::debug!(seed, %location, hits = hits.len(), "seed searched");
                UnitOutcome::Done(hits)
            }
            Err(e) => UnitOutcome::Fatal(HarvestError::places(format!("seed {seed}"), e)),
        }
    }

    async fn fetch_detail(&self, candidate: &Candidate) -> UnitOutcome<DetailRecord> {
        match self.places.place_details(&candidate.place_id).await {
            Ok(record) => UnitOutcome::Done(record),
            Err(e) if e.is_missing_data() => {
                let unit = format!("place {}", candidate.place_id);
                UnitOutcome::missing(self.policy, e.to_string(), || HarvestError::places(unit, e))
            }
            Err(e) => UnitOutcome::Fatal(HarvestError::places(
                format!("place {}", candidate.place_id),
                e,
            )),
        }
    }

    /// Writes one record. A failed write is counted and logged; the run
    /// carries on with the next candidate.
    async fn reconcile(
        &self,
        record: &DetailRecord,
        run_at: DateTime<Utc>,
        report: &mut HarvestReport,
    ) {
        match self.store.reconcile(record, run_at).await {
            Ok(ReconcileOutcome::Created) => {
                tracing::debug!(place_id = %record.place_id, "catalog entry created");
                report.entries_created += 1;
            }
            Ok(ReconcileOutcome::Updated) => {
                tracing::debug!(place_id = %record.place_id, "catalog entry updated");
                report.entries_updated += 1;
            }
            Err(e) => {
                tracing::error!(
                    place_id = %record.place_id,
                    error = %e,
                    "failed to reconcile catalog entry"
                );
                report.entries_failed += 1;
            }
        }
    }
}
