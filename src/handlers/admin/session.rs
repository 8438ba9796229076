// handlers/admin/session.rs - POST /admin/refresh-session handler

use axum::extract::{Extension, State};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::public::auth::verify::start_session;
use crate::middleware::{AdminSession, ApiResponse};
use crate::state::AppState;

/// POST /admin/refresh-session - Re-issue the admin session with a fresh expiry
pub async fn refresh_session(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let claims = session.claims.renewed(state.config.security.session_ttl_hours);
    let jar = start_session(&state, jar, &claims)?;
    Ok((jar, ApiResponse::success(json!({ "expiresAt": claims.exp }))))
}
