use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub outbound_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_ttl_hours: u64,
    pub cookie_name: String,
    pub secure_cookies: bool,
    /// Lower-cased admin email allow-list
    pub admin_emails: Vec<String>,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityBackend {
    Google,
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub backend: IdentityBackend,
    pub tokeninfo_url: String,
    /// Expected `aud` claim of identity tokens; unchecked when unset
    pub audience: Option<String>,
    /// `token=email` pairs accepted by the static verifier
    #[serde(skip_serializing)]
    pub static_tokens: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Gcs,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub api_base: String,
    pub public_base: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl StorageConfig {
    /// Public URL prefix under which every stored object is served
    pub fn public_prefix(&self) -> String {
        format!("{}/{}/", self.public_base.trim_end_matches('/'), self.bucket)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_image_bytes: usize,
    pub max_document_bytes: usize,
    pub image_placeholder_on_failure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub default_range_days: u32,
    pub max_update_attempts: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set outside development")]
    MissingSessionSecret,

    #[error("DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,

    #[error("STORAGE_BUCKET is required for the gcs backend")]
    MissingBucket,
}

const MIB: usize = 1024 * 1024;

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("STOREFRONT_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }
        if let Ok(v) = env::var("SERVER_OUTBOUND_TIMEOUT_SECS") {
            self.server.outbound_timeout_secs = v.parse().unwrap_or(self.server.outbound_timeout_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = match v.as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" => StoreBackend::Postgres,
                _ => self.database.backend,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.security.cookie_name = v;
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("ADMIN_EMAILS") {
            self.security.admin_emails = parse_email_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Identity overrides
        if let Ok(v) = env::var("IDENTITY_BACKEND") {
            self.identity.backend = match v.as_str() {
                "static" => IdentityBackend::Static,
                "google" => IdentityBackend::Google,
                _ => self.identity.backend,
            };
        }
        if let Ok(v) = env::var("IDENTITY_TOKENINFO_URL") {
            self.identity.tokeninfo_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_AUDIENCE") {
            self.identity.audience = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("IDENTITY_STATIC_TOKENS") {
            self.identity.static_tokens = parse_token_pairs(&v);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.storage.backend = match v.as_str() {
                "memory" => StorageBackend::Memory,
                "gcs" => StorageBackend::Gcs,
                _ => self.storage.backend,
            };
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_API_BASE") {
            self.storage.api_base = v;
        }
        if let Ok(v) = env::var("STORAGE_PUBLIC_BASE") {
            self.storage.public_base = v;
        }
        if let Ok(v) = env::var("STORAGE_ACCESS_TOKEN") {
            self.storage.access_token = Some(v).filter(|s| !s.is_empty());
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_IMAGE_BYTES") {
            self.uploads.max_image_bytes = v.parse().unwrap_or(self.uploads.max_image_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_DOCUMENT_BYTES") {
            self.uploads.max_document_bytes = v.parse().unwrap_or(self.uploads.max_document_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_IMAGE_PLACEHOLDER_ON_FAILURE") {
            self.uploads.image_placeholder_on_failure =
                v.parse().unwrap_or(self.uploads.image_placeholder_on_failure);
        }

        // Analytics overrides
        if let Ok(v) = env::var("ANALYTICS_DEFAULT_RANGE_DAYS") {
            self.analytics.default_range_days = v.parse().unwrap_or(self.analytics.default_range_days);
        }
        if let Ok(v) = env::var("ANALYTICS_MAX_UPDATE_ATTEMPTS") {
            self.analytics.max_update_attempts = v.parse().unwrap_or(self.analytics.max_update_attempts);
        }

        self
    }

    /// Reject combinations that cannot serve traffic safely
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development && self.security.session_secret.is_empty() {
            return Err(ConfigError::MissingSessionSecret);
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.storage.backend == StorageBackend::Gcs && self.storage.bucket.is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        Ok(())
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.security.admin_emails.iter().any(|e| *e == email)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 50 * MIB,
                outbound_timeout_secs: 30,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                session_secret: "development-session-secret".to_string(),
                session_ttl_hours: 24,
                cookie_name: "storefront.sid".to_string(),
                secure_cookies: false,
                admin_emails: Vec::new(),
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            identity: IdentityConfig {
                backend: IdentityBackend::Static,
                tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
                audience: None,
                static_tokens: Vec::new(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                bucket: "storefront-dev".to_string(),
                api_base: "https://storage.googleapis.com".to_string(),
                public_base: "https://storage.googleapis.com".to_string(),
                access_token: None,
            },
            uploads: UploadConfig {
                max_image_bytes: 5 * MIB,
                max_document_bytes: 10 * MIB,
                image_placeholder_on_failure: true,
            },
            analytics: AnalyticsConfig {
                default_range_days: 30,
                max_update_attempts: 5,
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.outbound_timeout_secs = 15;
        config.database.backend = StoreBackend::Postgres;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.session_secret = String::new();
        config.security.secure_cookies = true;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config.identity.backend = IdentityBackend::Google;
        config.storage.backend = StorageBackend::Gcs;
        config.storage.bucket = String::new();
        config
    }

    pub fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.server.outbound_timeout_secs = 10;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn parse_token_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (token, email) = pair.split_once('=')?;
            let (token, email) = (token.trim(), email.trim());
            if token.is_empty() || email.is_empty() {
                return None;
            }
            Some((token.to_string(), email.to_string()))
        })
        .collect()
}

#[macro_export]
macro_rules! is_development {
    ($config:expr) => {
        matches!($config.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.uploads.max_image_bytes, 5 * MIB);
        assert_eq!(config.uploads.max_document_bytes, 10 * MIB);
        assert!(config.validate().is_ok());
        assert!(is_development!(config));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.secure_cookies);
        assert_eq!(config.storage.backend, StorageBackend::Gcs);
        assert!(matches!(config.validate(), Err(ConfigError::MissingSessionSecret)));
    }

    #[test]
    fn admin_allow_list_is_case_insensitive() {
        let mut config = AppConfig::development();
        config.security.admin_emails = parse_email_list(" Owner@Example.com , ops@example.com,");
        assert_eq!(config.security.admin_emails.len(), 2);
        assert!(config.is_admin_email("OWNER@example.COM"));
        assert!(!config.is_admin_email("someone@example.com"));
    }

    #[test]
    fn parses_static_token_pairs() {
        let pairs = parse_token_pairs("abc=a@example.com, bad, =x@example.com,def = d@example.com");
        assert_eq!(
            pairs,
            vec![
                ("abc".to_string(), "a@example.com".to_string()),
                ("def".to_string(), "d@example.com".to_string()),
            ]
        );
    }

    #[test]
    fn public_prefix_joins_base_and_bucket() {
        let mut config = AppConfig::development();
        config.storage.public_base = "https://storage.googleapis.com/".to_string();
        config.storage.bucket = "menus.firebasestorage.app".to_string();
        assert_eq!(
            config.storage.public_prefix(),
            "https://storage.googleapis.com/menus.firebasestorage.app/"
        );
    }
}
