// handlers/admin/users.rs - Tenant CRUD under /admin/users

use axum::extract::{Extension, Path, State};
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::Tenant;
use crate::middleware::{AdminSession, ApiJson, ApiResponse, ApiResult};
use crate::services::tenant_service::{CreateTenantRequest, TenantUpdateRequest};
use crate::state::AppState;

/// GET /admin/users - List every business, newest first
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<Tenant>> {
    Ok(ApiResponse::success(state.tenants.list().await?))
}

/// POST /admin/users - Register a business and allocate its business number
///
/// Expected Input:
/// ```json
/// { "name": "Cafe", "email": "owner@cafe.example", "mobileNumber": "+15550100" }
/// ```
pub async fn user_create(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    ApiJson(request): ApiJson<CreateTenantRequest>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.create(request, Some(session.claims.email)).await?;
    Ok(ApiResponse::created(tenant))
}

/// GET /admin/users/:id - Show one business
pub async fn user_get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Tenant> {
    Ok(ApiResponse::success(state.tenants.get(id).await?))
}

/// PUT /admin/users/:id - Edit a business, including threshold and status
pub async fn user_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<TenantUpdateRequest>,
) -> ApiResult<Tenant> {
    let patch = request.into_patch()?;
    Ok(ApiResponse::success(state.tenants.update(id, patch).await?))
}

/// DELETE /admin/users/:id - Permanently delete a business
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    state.tenants.delete(id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
