/// Print the most recent harvest runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = mplscoffee_db::list_harvest_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no harvest runs recorded");
        return Ok(());
    }

    println!(
        "{:<6}{:<11}{:<11}{:<18}{:<9}{:<9}{:<9}ERROR",
        "ID", "TRIGGER", "STATUS", "STARTED", "CREATED", "UPDATED", "FAILED"
    );
    for run in &runs {
        let started = run
            .started_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{:<6}{:<11}{:<11}{:<18}{:<9}{:<9}{:<9}{}",
            run.id,
            run.trigger_source,
            run.status,
            started,
            run.entries_created,
            run.entries_updated,
            run.entries_failed,
            run.error_message.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
