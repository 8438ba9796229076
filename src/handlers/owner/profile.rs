// handlers/owner/profile.rs - GET /user/api/data and PUT /user/api/update handlers

use axum::extract::{Extension, State};
use axum_extra::extract::cookie::CookieJar;

use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::handlers::public::auth::verify::start_session;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, OwnerSession};
use crate::services::tenant_service::ProfileUpdate;
use crate::state::AppState;

/// GET /user/api/data - The owner's full record, analytics included
pub async fn profile_data(Extension(session): Extension<OwnerSession>) -> ApiResult<Tenant> {
    Ok(ApiResponse::success(session.tenant))
}

/// PUT /user/api/update - Edit the owner's own profile
///
/// Expected Input (all optional):
/// ```json
/// {
///   "name": "Cafe", "email": "...", "mobileNumber": "...",
///   "bannerImage": "https://...", "logo": "https://...", "reviewUrl": "https://...",
///   "buttons": [{"text": "Order", "url": "https://..."}],
///   "socialLinks": [{"icon": "instagram", "url": "https://..."}],
///   "hideReviewTab": false
/// }
/// ```
///
/// Threshold and status are admin-only and ignored here. An email change
/// re-issues the session cookie so the session carries the new address.
pub async fn profile_update(
    State(state): State<AppState>,
    Extension(session): Extension<OwnerSession>,
    jar: CookieJar,
    ApiJson(request): ApiJson<ProfileUpdate>,
) -> Result<(CookieJar, ApiResponse<Tenant>), ApiError> {
    let patch = request.into_patch()?;
    let tenant = state.tenants.update(session.tenant.id, patch).await?;

    let jar = if tenant.email.eq_ignore_ascii_case(&session.claims.email) {
        jar
    } else {
        tracing::info!(
            "Owner of {} changed email from {} to {}",
            tenant.business_number,
            session.claims.email,
            tenant.email
        );
        let mut claims = session.claims.renewed(state.config.security.session_ttl_hours);
        claims.email = tenant.email.clone();
        start_session(&state, jar, &claims)?
    };
    Ok((jar, ApiResponse::success(tenant)))
}
