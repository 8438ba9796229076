// handlers/public/auth/verify.rs - POST /admin/verify-token and POST /user/verify-token handlers

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_session, Claims, Identity, Role};
use crate::error::ApiError;
use crate::middleware::auth::session_cookie;
use crate::middleware::{ApiJson, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyTokenRequest {
    pub id_token: String,
}

async fn verified_identity(state: &AppState, request: &VerifyTokenRequest) -> Result<Identity, ApiError> {
    if request.id_token.trim().is_empty() {
        return Err(ApiError::bad_request("ID token is required"));
    }
    Ok(state.identity.verify(request.id_token.trim()).await?)
}

pub(crate) fn start_session(state: &AppState, jar: CookieJar, claims: &Claims) -> Result<CookieJar, ApiError> {
    let token = issue_session(claims, &state.config.security)?;
    Ok(jar.add(session_cookie(token, &state.config.security)))
}

/**
 * POST /admin/verify-token - Exchange an identity token for an admin session
 *
 * Expected Input:
 * ```json
 * { "idToken": "eyJhbGciOiJSUzI1NiI..." }
 * ```
 *
 * The verified email must be on the admin allow-list.
 */
pub async fn admin_verify_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<VerifyTokenRequest>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let identity = verified_identity(&state, &request).await?;
    if !state.config.is_admin_email(&identity.email) {
        tracing::warn!("Admin login refused for {}", identity.email);
        return Err(ApiError::forbidden("Access denied. Admin privileges required."));
    }

    let claims = Claims::new(&identity, Role::Admin, None, state.config.security.session_ttl_hours);
    let jar = start_session(&state, jar, &claims)?;
    tracing::info!("Admin session started for {}", identity.email);

    Ok((
        jar,
        ApiResponse::success(json!({
            "user": {
                "email": identity.email,
                "name": identity.name,
                "picture": identity.picture,
                "role": Role::Admin,
            },
            "redirect": "/admin/dashboard"
        })),
    ))
}

/**
 * POST /user/verify-token - Exchange an identity token for a business-owner session
 *
 * Expected Input:
 * ```json
 * { "idToken": "eyJhbGciOiJSUzI1NiI..." }
 * ```
 *
 * Requires an active business registered under the verified email.
 */
pub async fn owner_verify_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<VerifyTokenRequest>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let identity = verified_identity(&state, &request).await?;
    let tenant = state
        .tenants
        .find_owner(&identity.email)
        .await?
        .ok_or_else(|| ApiError::not_found("No active business account found for this email"))?;

    let claims = Claims::new(
        &identity,
        Role::User,
        Some(tenant.business_number.clone()),
        state.config.security.session_ttl_hours,
    );
    let jar = start_session(&state, jar, &claims)?;
    tracing::info!("Owner session started for {} ({})", identity.email, tenant.business_number);

    Ok((
        jar,
        ApiResponse::success(json!({
            "user": {
                "email": identity.email,
                "name": identity.name,
                "picture": identity.picture,
                "role": Role::User,
                "businessNumber": tenant.business_number,
                "businessName": tenant.name,
            },
            "redirect": "/user/dashboard"
        })),
    ))
}
