use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{verify_session, Claims, Role};
use crate::config::SecurityConfig;
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::services::TenantError;
use crate::state::AppState;

/// Verified admin session
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub claims: Claims,
}

/// Verified owner session, with the tenant it is linked to
#[derive(Clone, Debug)]
pub struct OwnerSession {
    pub claims: Claims,
    pub tenant: Tenant,
}

/// Session rejection: browsers go to the login page, API callers get JSON
pub struct SessionRejection {
    role: Role,
    wants_html: bool,
    error: ApiError,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        if self.wants_html {
            tracing::debug!("Redirecting to {}: {}", self.role.login_path(), self.error);
            Redirect::to(self.role.login_path()).into_response()
        } else {
            self.error.into_response()
        }
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

/// Session cookie carrying a signed token
pub fn session_cookie(token: String, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((security.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(security.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(security.session_ttl_hours as i64))
        .build()
}

/// Cookie that, added to a jar, clears the session
pub fn removal_cookie(security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((security.cookie_name.clone(), "")).path("/").build()
}

/// Signature, expiry and role check on the session cookie
fn session_claims(state: &AppState, jar: &CookieJar, role: Role) -> Result<Claims, ApiError> {
    let security = &state.config.security;
    let cookie = jar
        .get(&security.cookie_name)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let claims = verify_session(cookie.value(), security)?;
    if claims.role != role {
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(claims)
}

async fn admin_session(state: &AppState, jar: &CookieJar) -> Result<AdminSession, ApiError> {
    let claims = session_claims(state, jar, Role::Admin)?;

    // Allow-list can shrink while a session is alive
    if !state.config.is_admin_email(&claims.email) {
        tracing::warn!("Admin session for {} no longer allow-listed", claims.email);
        return Err(ApiError::forbidden("Access denied. Admin privileges required."));
    }
    Ok(AdminSession { claims })
}

async fn owner_session(state: &AppState, jar: &CookieJar) -> Result<OwnerSession, ApiError> {
    let claims = session_claims(state, jar, Role::User)?;
    let business_number = claims
        .business_number
        .clone()
        .ok_or_else(|| ApiError::forbidden("Session is not linked to a business"))?;

    let tenant = match state.tenants.owner_record(&business_number).await {
        Ok(tenant) => tenant,
        Err(TenantError::NotFound) => {
            tracing::warn!("Owner session for {} has no active tenant {}", claims.email, business_number);
            return Err(ApiError::forbidden("Business account is not active"));
        }
        Err(e) => return Err(e.into()),
    };

    // Linked by business number; the owner may change the tenant's email
    Ok(OwnerSession { claims, tenant })
}

/// Requires an admin session; injects `AdminSession` into request extensions
pub async fn admin_session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionRejection> {
    let session = admin_session(&state, &jar).await.map_err(|error| SessionRejection {
        role: Role::Admin,
        wants_html: wants_html(&headers),
        error,
    })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Requires an owner session; injects `OwnerSession` into request extensions
pub async fn owner_session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionRejection> {
    let session = owner_session(&state, &jar).await.map_err(|error| SessionRejection {
        role: Role::User,
        wants_html: wants_html(&headers),
        error,
    })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn browsers_are_redirected_to_login() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        let response = SessionRejection {
            role: Role::User,
            wants_html: wants_html(&headers),
            error: ApiError::unauthorized("Authentication required"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/user/login");
    }

    #[test]
    fn api_callers_get_status_codes() {
        let response = SessionRejection {
            role: Role::Admin,
            wants_html: wants_html(&HeaderMap::new()),
            error: ApiError::forbidden("Access denied"),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let mut security = crate::config::AppConfig::development().security;
        security.secure_cookies = true;
        let cookie = session_cookie("token".to_string(), &security);
        assert_eq!(cookie.name(), "storefront.sid");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
