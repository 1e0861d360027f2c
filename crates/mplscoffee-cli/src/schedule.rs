//! Periodic harvesting.
//!
//! Registers one cron job that runs the harvest with the `scheduler`
//! trigger source, then blocks until Ctrl-C or SIGTERM.

use std::sync::Arc;

use mplscoffee_core::AppConfig;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::harvest::{run_harvest, TRIGGER_SCHEDULER};

/// Run harvests on `config.harvest_schedule` until interrupted.
///
/// A tick that fires while the previous harvest is still running is
/// skipped.
///
/// # Errors
///
/// Returns an error if the scheduler cannot be built, the cron expression
/// is rejected, or the scheduler fails to start or shut down.
pub(crate) async fn run_schedule(pool: PgPool, config: AppConfig) -> anyhow::Result<()> {
    let schedule = config.harvest_schedule.clone();
    let pool = Arc::new(pool);
    let config = Arc::new(config);
    let in_flight = Arc::new(Mutex::new(()));

    let mut scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let in_flight = Arc::clone(&in_flight);

        Box::pin(async move {
            let Ok(_guard) = in_flight.try_lock_owned() else {
                tracing::warn!("scheduler: previous harvest still running; skipping this tick");
                return;
            };
            tracing::info!("scheduler: starting harvest run");
            match run_harvest(&pool, &config, &[], TRIGGER_SCHEDULER).await {
                Ok(report) => tracing::info!(
                    created = report.entries_created,
                    updated = report.entries_updated,
                    skipped = report.entries_skipped,
                    failed = report.entries_failed,
                    "scheduler: harvest run complete"
                ),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "scheduler: harvest run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(%schedule, "scheduler: waiting for next tick");

    shutdown_signal().await;
    tracing::info!("scheduler: shutting down");
    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
