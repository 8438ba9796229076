use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;

/// Google Cloud Storage via the JSON upload API
pub struct GcsObjectStore {
    config: StorageConfig,
    http: reqwest::Client,
}

impl GcsObjectStore {
    pub fn new(config: StorageConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn upload_url(&self, path: &str) -> Result<Url, StorageError> {
        let base = format!(
            "{}/upload/storage/v1/b/{}/o",
            self.config.api_base.trim_end_matches('/'),
            self.config.bucket
        );
        let mut url = Url::parse(&base).map_err(|_| StorageError::NotConfigured("STORAGE_API_BASE"))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path)
            .append_pair("predefinedAcl", "publicRead");
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn put_public(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(StorageError::NotConfigured("STORAGE_ACCESS_TOKEN"))?;

        let response = self
            .http
            .post(self.upload_url(path)?)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        tracing::info!("Uploaded {} to bucket {}", path, self.config.bucket);
        Ok(format!("{}{}", self.config.public_prefix(), path))
    }
}
