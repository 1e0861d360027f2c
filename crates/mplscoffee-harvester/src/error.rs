use mplscoffee_places::PlacesError;
use thiserror::Error;

/// Errors that stop a harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no seeds to harvest")]
    NoSeeds,

    /// The geocoder had nothing for a seed and the run aborts on missing data.
    #[error("seed {seed} did not geocode to a location")]
    SeedNotGeocoded { seed: String },

    #[error("places request failed for {unit}")]
    Places {
        unit: String,
        #[source]
        source: PlacesError,
    },
}

impl HarvestError {
    pub(crate) fn places(unit: impl Into<String>, source: PlacesError) -> Self {
        Self::Places {
            unit: unit.into(),
            source,
        }
    }
}
