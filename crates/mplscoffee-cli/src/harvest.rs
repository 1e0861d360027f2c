//! Harvest command handlers.
//!
//! A live run is recorded in the `harvest_runs` ledger; a dry run writes to
//! an in-memory catalog and never opens a database connection.

use anyhow::Context;
use chrono::Utc;
use mplscoffee_core::{validate_seeds, AppConfig, ConfigError, RegionConfig};
use mplscoffee_db::{DbError, HarvestRunCounts, PgCatalog};
use mplscoffee_harvester::{HarvestReport, Harvester, MemoryCatalog};
use mplscoffee_places::{PlacesClient, RetryPolicy};

pub(crate) const TRIGGER_CLI: &str = "cli";
pub(crate) const TRIGGER_SCHEDULER: &str = "scheduler";

pub(crate) fn build_places_client(config: &AppConfig) -> anyhow::Result<PlacesClient> {
    let Some(api_key) = config.places_api_key.as_deref() else {
        anyhow::bail!("GOOGLE_PLACES_API_KEY is not set; it is required to harvest");
    };
    let retry = RetryPolicy::new(config.places_max_retries, config.places_backoff_base_ms);
    PlacesClient::new(api_key, config.places_timeout_secs, retry)
        .context("failed to build places client")
}

/// Seeds given on the command line win over the region file's list and
/// go through the same blank/duplicate checks.
pub(crate) fn resolve_seeds(
    region: &RegionConfig,
    overrides: &[String],
) -> Result<Vec<String>, ConfigError> {
    if overrides.is_empty() {
        return Ok(region.seeds.clone());
    }
    validate_seeds(overrides)?;
    Ok(overrides.iter().map(|s| s.trim().to_string()).collect())
}

pub(crate) fn counts_from_report(report: &HarvestReport) -> Result<HarvestRunCounts, DbError> {
    Ok(HarvestRunCounts {
        seeds_processed: HarvestRunCounts::narrow("seeds_processed", report.seeds_processed)?,
        seeds_skipped: HarvestRunCounts::narrow("seeds_skipped", report.seeds_skipped)?,
        candidates_seen: HarvestRunCounts::narrow("candidates_seen", report.candidates_seen)?,
        candidates_out_of_bounds: HarvestRunCounts::narrow(
            "candidates_out_of_bounds",
            report.candidates_out_of_bounds,
        )?,
        candidates_duplicate: HarvestRunCounts::narrow(
            "candidates_duplicate",
            report.candidates_duplicate,
        )?,
        candidates_unique: HarvestRunCounts::narrow(
            "candidates_unique",
            report.candidates_unique,
        )?,
        entries_created: HarvestRunCounts::narrow("entries_created", report.entries_created)?,
        entries_updated: HarvestRunCounts::narrow("entries_updated", report.entries_updated)?,
        entries_skipped: HarvestRunCounts::narrow("entries_skipped", report.entries_skipped)?,
        entries_failed: HarvestRunCounts::narrow("entries_failed", report.entries_failed)?,
    })
}

/// Run the full harvest against the Postgres catalog.
///
/// Creates a ledger row, runs the pipeline, and records either the counts
/// or the error chain. Entries reconciled before a failure stay committed.
///
/// # Errors
///
/// Returns an error if the region file or places client cannot be loaded,
/// the ledger cannot be written, or the run fails.
pub(crate) async fn run_harvest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    seed_overrides: &[String],
    trigger_source: &'static str,
) -> anyhow::Result<HarvestReport> {
    let region = mplscoffee_core::load_region(&config.region_path)?;
    let seeds = resolve_seeds(&region, seed_overrides)?;
    let client = build_places_client(config)?;
    let catalog = PgCatalog::new(pool.clone());

    let run = mplscoffee_db::create_harvest_run(pool, trigger_source).await?;
    if let Err(e) = mplscoffee_db::start_harvest_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    tracing::info!(
        run_id = run.id,
        region = %region.name,
        seeds = seeds.len(),
        trigger_source,
        "harvest run started"
    );

    let harvester = Harvester::new(
        &client,
        &catalog,
        region.bounding_box,
        config.missing_data_policy,
    );
    let report = match harvester.run(&seeds, Utc::now()).await {
        Ok(report) => report,
        Err(e) => {
            let err = anyhow::Error::from(e);
            tracing::error!(run_id = run.id, error = %format!("{err:#}"), "harvest run failed");
            fail_run_best_effort(pool, run.id, format!("{err:#}")).await;
            return Err(err);
        }
    };

    let counts = match counts_from_report(&report) {
        Ok(counts) => counts,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e.into());
        }
    };
    if let Err(e) = mplscoffee_db::complete_harvest_run(pool, run.id, &counts).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    print_report(&report);
    Ok(report)
}

/// Run the pipeline into an in-memory catalog and print what would be
/// written.
///
/// # Errors
///
/// Returns an error if the region file or places client cannot be loaded,
/// or the run fails.
pub(crate) async fn run_dry_run(config: &AppConfig, seed_overrides: &[String]) -> anyhow::Result<()> {
    let region = mplscoffee_core::load_region(&config.region_path)?;
    let seeds = resolve_seeds(&region, seed_overrides)?;
    let client = build_places_client(config)?;
    let catalog = MemoryCatalog::new();

    println!(
        "dry-run: harvesting {} seed(s) in {} [{}]",
        seeds.len(),
        region.name,
        seeds.join(", ")
    );

    let report = Harvester::new(
        &client,
        &catalog,
        region.bounding_box,
        config.missing_data_policy,
    )
    .run(&seeds, Utc::now())
    .await?;

    for entry in catalog.entries() {
        println!("{}", serde_json::to_string(&entry)?);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &HarvestReport) {
    println!(
        "seeds: {} processed, {} skipped",
        report.seeds_processed, report.seeds_skipped
    );
    println!(
        "candidates: {} seen, {} unique, {} duplicate, {} out of bounds",
        report.candidates_seen,
        report.candidates_unique,
        report.candidates_duplicate,
        report.candidates_out_of_bounds
    );
    println!(
        "entries: {} created, {} updated, {} skipped, {} failed",
        report.entries_created, report.entries_updated, report.entries_skipped, report.entries_failed
    );
}

/// Mark the run failed; a ledger error here is logged, never propagated,
/// so the original failure stays the one reported.
pub(crate) async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = mplscoffee_db::fail_harvest_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark harvest run as failed"
        );
    }
}
