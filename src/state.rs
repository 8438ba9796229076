use std::sync::Arc;
use std::time::Duration;

use crate::auth::{GoogleIdentityVerifier, IdentityVerifier, StaticIdentityVerifier};
use crate::config::{AppConfig, IdentityBackend};
use crate::database::{DatabaseManager, TenantStore};
use crate::services::{AnalyticsService, AssetService, TenantService};
use crate::storage::{self, ObjectStore};

/// Shared handler state, resolved once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tenants: TenantService,
    pub analytics: AnalyticsService,
    pub assets: AssetService,
    pub identity: Arc<dyn IdentityVerifier>,
    /// Outbound client for the PDF proxy
    pub http: reqwest::Client,
}

impl AppState {
    /// Wire services around already-opened backends
    pub fn new(
        config: AppConfig,
        store: Arc<dyn TenantStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityVerifier>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            tenants: TenantService::new(store.clone()),
            analytics: AnalyticsService::new(store, config.analytics.max_update_attempts),
            assets: AssetService::new(objects, config.uploads.clone()),
            identity,
            http,
            config: Arc::new(config),
        }
    }

    /// Open every backend named by `config`
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = http_client(&config)?;
        let store = DatabaseManager::open(&config.database).await?;
        let objects = storage::open(&config.storage, http.clone());
        let identity: Arc<dyn IdentityVerifier> = match config.identity.backend {
            IdentityBackend::Google => Arc::new(GoogleIdentityVerifier::new(&config.identity, http.clone())),
            IdentityBackend::Static => {
                tracing::warn!("Using static identity tokens; not for production");
                Arc::new(StaticIdentityVerifier::from_config(&config.identity))
            }
        };
        Ok(Self::new(config, store, objects, identity, http))
    }
}

pub fn http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.outbound_timeout_secs))
        .build()
}
