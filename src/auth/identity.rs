use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::IdentityConfig;

/// Verified identity behind an identity-provider token
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token was issued for another audience")]
    AudienceMismatch,

    #[error("Token carries no verified email")]
    UnverifiedEmail,

    #[error("Identity provider unavailable: {0}")]
    Provider(#[from] reqwest::Error),
}

/// Verifies identity tokens presented at login
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError>;
}

/// Google `tokeninfo` endpoint verifier
pub struct GoogleIdentityVerifier {
    tokeninfo_url: String,
    audience: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    aud: Option<String>,
    email: Option<String>,
    // tokeninfo reports booleans as strings
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdentityVerifier {
    pub fn new(config: &IdentityConfig, http: reqwest::Client) -> Self {
        Self {
            tokeninfo_url: config.tokeninfo_url.clone(),
            audience: config.audience.clone(),
            http,
        }
    }

    fn check(&self, info: TokenInfo) -> Result<Identity, IdentityError> {
        if let Some(expected) = &self.audience {
            if info.aud.as_deref() != Some(expected.as_str()) {
                return Err(IdentityError::AudienceMismatch);
            }
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(IdentityError::UnverifiedEmail);
        }
        let email = info.email.ok_or(IdentityError::UnverifiedEmail)?;

        Ok(Identity {
            uid: info.sub,
            email,
            name: info.name,
            picture: info.picture,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("tokeninfo rejected token with HTTP {}", response.status());
            return Err(IdentityError::InvalidToken);
        }

        let info: TokenInfo = response.json().await?;
        self.check(info)
    }
}

/// Fixed token table, for local development and tests
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        config
            .static_tokens
            .iter()
            .fold(Self::new(), |verifier, (token, email)| verifier.with_token(token, email))
    }

    pub fn with_token(mut self, token: &str, email: &str) -> Self {
        let identity = Identity {
            uid: format!("static-{token}"),
            email: email.to_string(),
            name: None,
            picture: None,
        };
        self.tokens.insert(token.to_string(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError> {
        self.tokens.get(id_token).cloned().ok_or(IdentityError::InvalidToken)
    }
}
