use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::BoundingBox;
use crate::ConfigError;

/// The harvest area: where searches are anchored and which results are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub bounding_box: BoundingBox,
    /// Postal codes (or any address the geocoder accepts) used as search anchors.
    pub seeds: Vec<String>,
}

/// Load and validate the region configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_region(path: &Path) -> Result<RegionConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_region(&content)
}

fn parse_region(content: &str) -> Result<RegionConfig, ConfigError> {
    let region: RegionConfig =
        serde_yaml::from_str(content).map_err(ConfigError::RegionFileParse)?;
    validate_region(&region)?;
    Ok(region)
}

fn validate_region(region: &RegionConfig) -> Result<(), ConfigError> {
    region
        .bounding_box
        .validate()
        .map_err(|reason| ConfigError::Validation(format!("region '{}': {reason}", region.name)))?;

    if region.seeds.is_empty() {
        return Err(ConfigError::Validation(format!(
            "region '{}' must list at least one seed",
            region.name
        )));
    }

    validate_seeds(&region.seeds)
}

/// Rejects blank and duplicate seeds. Duplicates are compared after
/// trimming.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] on the first blank or repeated seed.
pub fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for seed in seeds {
        if seed.trim().is_empty() {
            return Err(ConfigError::Validation(
                "seed entries must be non-empty".to_string(),
            ));
        }
        if !seen.insert(seed.trim()) {
            return Err(ConfigError::Validation(format!("duplicate seed: '{seed}'")));
        }
    }

    Ok(())
}
