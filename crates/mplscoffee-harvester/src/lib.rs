//! Harvest run orchestration: seed expansion, geofenced deduplication,
//! detail fetches and reconciliation into a [`CatalogStore`].
//!
//! [`CatalogStore`]: mplscoffee_core::CatalogStore

pub mod candidates;
pub mod error;
pub mod memory;
pub mod outcome;
pub mod pipeline;
pub mod report;

pub use candidates::{Admission, CandidateSet};
pub use error::HarvestError;
pub use memory::{HourRow, MemoryCatalog};
pub use outcome::UnitOutcome;
pub use pipeline::Harvester;
pub use report::HarvestReport;
