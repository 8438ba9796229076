pub mod identity;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::BusinessId;

pub use identity::{GoogleIdentityVerifier, Identity, IdentityError, IdentityVerifier, StaticIdentityVerifier};

/// Dashboard role carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Business owner, linked to exactly one tenant
    User,
}

impl Role {
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/login",
            Role::User => "/user/login",
        }
    }
}

/// Session token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity provider user id
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_number: Option<BusinessId>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, role: Role, business_number: Option<BusinessId>, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(ttl_hours as i64)).timestamp();

        Self {
            sub: identity.uid.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            picture: identity.picture.clone(),
            role,
            business_number,
            exp,
            iat: now.timestamp(),
        }
    }

    /// Same identity and linkage, fresh expiry
    pub fn renewed(&self, ttl_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            exp: (now + Duration::hours(ttl_hours as i64)).timestamp(),
            iat: now.timestamp(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session secret is not configured")]
    InvalidSecret,

    #[error("Session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid session: {0}")]
    Invalid(String),
}

pub fn issue_session(claims: &Claims, security: &SecurityConfig) -> Result<String, SessionError> {
    let secret = &security.session_secret;
    if secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| SessionError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, returning the claims
pub fn verify_session(token: &str, security: &SecurityConfig) -> Result<Claims, SessionError> {
    let secret = &security.session_secret;
    if secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| SessionError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}
