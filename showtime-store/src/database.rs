use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;
use crate::catalog_repo::PgVenueCatalog;
use crate::reservation_repo::PgReservationStore;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared Postgres pool. Catalog and reservation stores are handed clones
/// of the same pool.
#[derive(Clone)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&config.url)
            .await?;
        info!(max_connections = config.max_connections, "Connected to Postgres");

        Ok(Self { pool })
    }

    /// Apply `migrations/` (venue catalog, reservations, seat claims).
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Schema up to date");
        Ok(())
    }

    pub fn venue_catalog(&self) -> PgVenueCatalog {
        PgVenueCatalog::new(self.pool.clone())
    }

    pub fn reservation_store(&self) -> PgReservationStore {
        PgReservationStore::new(self.pool.clone())
    }
}
