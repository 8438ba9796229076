#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use storefront_api::auth::StaticIdentityVerifier;
use storefront_api::config::AppConfig;
use storefront_api::database::models::{NewTenant, Tenant};
use storefront_api::database::{MemoryTenantStore, TenantStore};
use storefront_api::storage::MemoryObjectStore;
use storefront_api::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const OWNER_EMAIL: &str = "owner@cafe.example";
pub const OWNER_TOKEN: &str = "owner-token";
pub const STRANGER_TOKEN: &str = "stranger-token";

/// Router wired to in-memory backends, driven without a socket
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTenantStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub config: AppConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `name=value` pair of the session cookie set by this response
    pub fn session_cookie(&self) -> Result<String> {
        let set_cookie = self.header(header::SET_COOKIE).context("no Set-Cookie header")?;
        Ok(set_cookie.split(';').next().unwrap_or_default().to_string())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::development();
        config.security.admin_emails = vec![ADMIN_EMAIL.to_string()];
        config.identity.static_tokens = vec![
            (ADMIN_TOKEN.to_string(), ADMIN_EMAIL.to_string()),
            (OWNER_TOKEN.to_string(), OWNER_EMAIL.to_string()),
            (STRANGER_TOKEN.to_string(), "stranger@example.com".to_string()),
        ];
        adjust(&mut config);

        let store = Arc::new(MemoryTenantStore::new());
        let objects = Arc::new(MemoryObjectStore::new(config.storage.public_prefix()));
        let identity = Arc::new(StaticIdentityVerifier::from_config(&config.identity));
        let state = AppState::new(
            config.clone(),
            store.clone(),
            objects.clone(),
            identity,
            reqwest::Client::new(),
        );

        Self {
            router: app(state),
            store,
            objects,
            config,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
        headers: &[(header::HeaderName, &str)],
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, None, cookie, &[]).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookie: Option<&str>) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(body), cookie, &[]).await
    }

    pub async fn put(&self, uri: &str, body: Value, cookie: Option<&str>) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(body), cookie, &[]).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, None, cookie, &[]).await
    }

    pub async fn login(&self, path: &str, id_token: &str) -> Result<String> {
        let res = self.post(path, serde_json::json!({ "idToken": id_token }), None).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {} {}", res.status, res.body);
        res.session_cookie()
    }

    pub async fn admin_cookie(&self) -> Result<String> {
        self.login("/admin/verify-token", ADMIN_TOKEN).await
    }

    pub async fn owner_cookie(&self) -> Result<String> {
        self.login("/user/verify-token", OWNER_TOKEN).await
    }

    pub async fn seed_tenant(&self, name: &str, email: &str) -> Result<Tenant> {
        Ok(self
            .store
            .create(NewTenant {
                name: name.to_string(),
                email: email.to_string(),
                mobile_number: "+15550100".to_string(),
                created_by: Some(ADMIN_EMAIL.to_string()),
            })
            .await?)
    }
}
