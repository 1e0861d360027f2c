use crate::app_config::{AppConfig, Environment, MissingDataPolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    // Timeouts of zero would fail every request.
    let parse_timeout_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let secs = parse_u64(var, default)?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(secs)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("MPLSCOFFEE_ENV", "development"))?;

    let log_level = or_default("MPLSCOFFEE_LOG_LEVEL", "info");
    let region_path = PathBuf::from(or_default(
        "MPLSCOFFEE_REGION_PATH",
        "./config/region.yaml",
    ));
    let places_api_key = lookup("GOOGLE_PLACES_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());

    let db_max_connections = parse_u32("MPLSCOFFEE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MPLSCOFFEE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_timeout_secs("MPLSCOFFEE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let places_timeout_secs = parse_timeout_secs("MPLSCOFFEE_PLACES_TIMEOUT_SECS", "30")?;
    let places_max_retries = parse_u32("MPLSCOFFEE_PLACES_MAX_RETRIES", "3")?;
    let places_backoff_base_ms = parse_u64("MPLSCOFFEE_PLACES_BACKOFF_BASE_MS", "1000")?;

    let missing_data_policy = or_default("MPLSCOFFEE_MISSING_DATA_POLICY", "skip")
        .parse::<MissingDataPolicy>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "MPLSCOFFEE_MISSING_DATA_POLICY".to_string(),
            reason,
        })?;

    let harvest_schedule = or_default("MPLSCOFFEE_HARVEST_SCHEDULE", "0 0 3 * * SUN");
    if harvest_schedule.split_whitespace().count() != 6 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MPLSCOFFEE_HARVEST_SCHEDULE".to_string(),
            reason: format!("expected a six-field cron expression, got '{harvest_schedule}'"),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        region_path,
        places_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        places_timeout_secs,
        places_max_retries,
        places_backoff_base_ms,
        missing_data_policy,
        harvest_schedule,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MPLSCOFFEE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
