use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::memory::MemoryTenantStore;
use super::postgres::PgTenantStore;
use super::store::{StoreError, TenantStore};
use crate::config::{DatabaseConfig, StoreBackend};

/// Builds the tenant store selected by configuration
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Open the configured backend; postgres pools are migrated on open
    pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn TenantStore>, StoreError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory tenant store");
                Ok(Arc::new(MemoryTenantStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Self::migrate(&pool).await?;
                Ok(Arc::new(PgTenantStore::new(pool)))
            }
        }
    }
}
