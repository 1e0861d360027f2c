//! Catalog inspection and curation.

use chrono::{DateTime, Utc};
use mplscoffee_db::DbError;

fn fmt_verdict(is_good: Option<bool>) -> &'static str {
    match is_good {
        Some(true) => "good",
        Some(false) => "bad",
        None => "-",
    }
}

fn fmt_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

/// Print one page of the catalog ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_shops_list(
    pool: &sqlx::PgPool,
    limit: i64,
    offset: i64,
) -> anyhow::Result<()> {
    let rows = mplscoffee_db::list_catalog_entries(pool, limit, offset).await?;
    if rows.is_empty() {
        println!("no shops found; run `mplscoffee harvest` first");
        return Ok(());
    }

    let total = mplscoffee_db::count_catalog_entries(pool).await?;
    println!(
        "{:<30}{:<8}{:<8}{:<18}PLACE ID",
        "NAME", "RATING", "VERDICT", "LAST UPDATED"
    );
    for row in &rows {
        let name = if row.name.chars().count() > 28 {
            format!("{}...", row.name.chars().take(25).collect::<String>())
        } else {
            row.name.clone()
        };
        println!(
            "{:<30}{:<8.1}{:<8}{:<18}{}",
            name,
            row.rating,
            fmt_verdict(row.is_good),
            fmt_timestamp(row.last_updated),
            row.place_id
        );
    }
    println!("showing {} of {total}", rows.len());
    Ok(())
}

/// Print one shop with its opening hours.
///
/// # Errors
///
/// Returns an error if the shop does not exist or the query fails.
pub(crate) async fn run_shops_get(pool: &sqlx::PgPool, place_id: &str) -> anyhow::Result<()> {
    let entry = match mplscoffee_db::get_catalog_entry(pool, place_id).await {
        Ok(entry) => entry,
        Err(DbError::NotFound) => anyhow::bail!("shop '{place_id}' not found"),
        Err(e) => return Err(e.into()),
    };

    println!("{} ({})", entry.name, entry.place_id);
    println!("Address: {}", entry.address);
    println!("Location: {}", entry.location);
    println!(
        "Rating: {:.1} ({} ratings)",
        entry.rating, entry.user_ratings_total
    );
    if !entry.website.is_empty() {
        println!("Website: {}", entry.website);
    }
    println!("Verdict: {}", fmt_verdict(entry.is_good));
    println!("Last updated: {}", fmt_timestamp(entry.last_updated));
    println!();
    if entry.hours.is_empty() {
        println!("no opening hours on record");
    } else {
        println!("{:<6}{:<8}CLOSE", "DAY", "OPEN");
        for h in &entry.hours {
            println!(
                "{:<6}{:<8}{}",
                h.day_of_week,
                h.open_time.format("%H:%M").to_string(),
                h.close_time.format("%H:%M")
            );
        }
    }
    Ok(())
}

/// Set or clear the operator verdict.
///
/// # Errors
///
/// Returns an error if the shop does not exist or the update fails.
pub(crate) async fn run_shops_mark(
    pool: &sqlx::PgPool,
    place_id: &str,
    is_good: Option<bool>,
) -> anyhow::Result<()> {
    match mplscoffee_db::set_is_good(pool, place_id, is_good).await {
        Ok(()) => {
            println!("{place_id}: verdict set to {}", fmt_verdict(is_good));
            Ok(())
        }
        Err(DbError::NotFound) => anyhow::bail!("shop '{place_id}' not found"),
        Err(e) => Err(e.into()),
    }
}
