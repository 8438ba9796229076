// handlers/owner/session.rs - POST /user/refresh-session handler

use axum::extract::{Extension, State};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::public::auth::verify::start_session;
use crate::middleware::{ApiResponse, OwnerSession};
use crate::state::AppState;

/// POST /user/refresh-session - Re-issue the owner session with a fresh expiry
pub async fn refresh_session(
    State(state): State<AppState>,
    Extension(session): Extension<OwnerSession>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let claims = session.claims.renewed(state.config.security.session_ttl_hours);
    let jar = start_session(&state, jar, &claims)?;
    Ok((
        jar,
        ApiResponse::success(json!({
            "expiresAt": claims.exp,
            "businessNumber": session.tenant.business_number,
        })),
    ))
}
