pub mod gcs;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

pub use gcs::GcsObjectStore;
pub use memory::MemoryObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object storage rejected upload of {path}: HTTP {status}")]
    Rejected { path: String, status: u16 },

    #[error("Object storage is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Object storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Managed object storage holding uploaded images and menus
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`, publicly readable, returning its public URL
    async fn put_public(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError>;
}

pub fn open(config: &StorageConfig, http: reqwest::Client) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Gcs => Arc::new(GcsObjectStore::new(config.clone(), http)),
        StorageBackend::Memory => {
            tracing::info!("Using in-memory object store");
            Arc::new(MemoryObjectStore::new(config.public_prefix()))
        }
    }
}
