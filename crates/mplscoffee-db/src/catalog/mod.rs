//! Database operations for the `coffee_shops` and `coffee_shop_hours`
//! tables.

mod read;
mod types;
mod write;

use chrono::{DateTime, Utc};
use mplscoffee_core::{CatalogStore, DetailRecord, ReconcileOutcome};
use sqlx::PgPool;

use crate::DbError;

pub use read::{count_catalog_entries, get_catalog_entry, list_catalog_entries, list_hours};
pub use types::{CoffeeShopRow, HoursRow};
pub use write::{reconcile_detail, set_is_good};

/// Postgres-backed catalog used by harvest runs.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CatalogStore for PgCatalog {
    type Error = DbError;

    async fn reconcile(
        &self,
        record: &DetailRecord,
        run_at: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, Self::Error> {
        reconcile_detail(&self.pool, record, run_at).await
    }
}
