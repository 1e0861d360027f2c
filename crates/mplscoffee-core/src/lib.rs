pub mod app_config;
pub mod catalog;
mod config;
pub mod geo;
pub mod places;
pub mod region;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, MissingDataPolicy};
pub use catalog::{
    join_weekday_text, CatalogEntry, CatalogStore, HoursEntry, ReconcileOutcome,
    WEEKDAY_TEXT_DELIMITER,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{BoundingBox, Coordinates};
pub use places::{Candidate, DetailRecord, ScheduleEntry};
pub use region::{load_region, validate_seeds, RegionConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read region file {path}: {source}")]
    RegionFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse region file: {0}")]
    RegionFileParse(#[source] serde_yaml::Error),

    #[error("invalid region configuration: {0}")]
    Validation(String),
}
