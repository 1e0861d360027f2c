use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What a run does when the provider returns no data for a unit of work
/// (a seed with zero geocode results, a place without a detail payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingDataPolicy {
    /// Log the unit and carry on with the rest of the run.
    #[default]
    Skip,
    /// Treat the unit as fatal and stop the run.
    Abort,
}

impl std::fmt::Display for MissingDataPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingDataPolicy::Skip => write!(f, "skip"),
            MissingDataPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for MissingDataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("expected 'skip' or 'abort', got '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub region_path: PathBuf,
    pub places_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub places_timeout_secs: u64,
    pub places_max_retries: u32,
    pub places_backoff_base_ms: u64,
    pub missing_data_policy: MissingDataPolicy,
    pub harvest_schedule: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("region_path", &self.region_path)
            .field("database_url", &"[redacted]")
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("places_max_retries", &self.places_max_retries)
            .field("places_backoff_base_ms", &self.places_backoff_base_ms)
            .field("missing_data_policy", &self.missing_data_policy)
            .field("harvest_schedule", &self.harvest_schedule)
            .finish()
    }
}
