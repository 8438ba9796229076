// handlers/public/profile.rs - GET /api/user/:businessNumber handler

use axum::{
    extract::{Path, State},
    http::HeaderMap,
};

use crate::handlers::request_device;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::PublicTenant;
use crate::state::AppState;

/// GET /api/user/:businessNumber - Public landing-page data for an active business
///
/// Button targets are resolved for the requesting device. Responds 400 for a
/// malformed business number and 404 when it is unknown or inactive.
pub async fn user_by_business_number(
    State(state): State<AppState>,
    Path(business_number): Path<String>,
    headers: HeaderMap,
) -> ApiResult<PublicTenant> {
    let tenant = state
        .tenants
        .public_profile(&business_number, request_device(&headers))
        .await?;
    Ok(ApiResponse::success(tenant))
}
