use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Analytics, BusinessId, BusinessIdError, NewTenant, Tenant, TenantPatch};

/// Errors from a tenant store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    BusinessId(#[from] BusinessIdError),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },

    #[error("Analytics update for {0} lost the race after every retry")]
    Contention(BusinessId),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence for tenant records.
///
/// The analytics block is written only through `swap_analytics`, a
/// compare-and-swap on `analytics_version`, so concurrent aggregator
/// updates never silently overwrite one another.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Allocate the next business id and insert, serialized against
    /// concurrent creations.
    async fn create(&self, new: NewTenant) -> Result<Tenant, StoreError>;

    /// All tenants, newest first
    async fn list(&self) -> Result<Vec<Tenant>, StoreError>;

    async fn list_active(&self) -> Result<Vec<Tenant>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Tenant>, StoreError>;

    async fn find_active_by_business_id(&self, business_id: &BusinessId) -> Result<Option<Tenant>, StoreError>;

    /// Case-insensitive email match among active tenants
    async fn find_active_by_email(&self, email: &str) -> Result<Option<Tenant>, StoreError>;

    /// Greatest business id currently allocated
    async fn last_business_id(&self) -> Result<Option<BusinessId>, StoreError>;

    async fn update(&self, id: Uuid, patch: TenantPatch) -> Result<Option<Tenant>, StoreError>;

    /// Hard delete; false when no such record existed
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Replace the analytics block if `expected_version` is still current.
    /// Returns false when another writer got there first.
    async fn swap_analytics(&self, id: Uuid, expected_version: i64, analytics: &Analytics) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
