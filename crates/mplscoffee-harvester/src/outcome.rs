//! Per-unit results and the missing-data policy that maps onto them.
//!
//! A unit is either a seed (geocode plus search) or a candidate (detail
//! fetch plus reconcile).

use mplscoffee_core::MissingDataPolicy;

use crate::error::HarvestError;

#[derive(Debug)]
pub enum UnitOutcome<T> {
    Done(T),
    /// The unit was dropped and the run continues.
    Skipped { reason: String },
    /// The run must stop.
    Fatal(HarvestError),
}

impl<T> UnitOutcome<T> {
    /// Resolves a missing-data condition under `policy`.
    pub(crate) fn missing(
        policy: MissingDataPolicy,
        reason: String,
        error: impl FnOnce() -> HarvestError,
    ) -> Self {
        match policy {
            MissingDataPolicy::Skip => Self::Skipped { reason },
            MissingDataPolicy::Abort => Self::Fatal(error()),
        }
    }
}
