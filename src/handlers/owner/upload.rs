// handlers/owner/upload.rs - POST /user/upload-image and POST /user/upload-pdf handlers

use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::admin::upload::UploadImageRequest;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, OwnerSession};
use crate::services::UploadOutcome;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerPdfRequest {
    pub pdf_data: String,
}

/// POST /user/upload-image - Store an image for the owner's page
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(session): Extension<OwnerSession>,
    ApiJson(request): ApiJson<UploadImageRequest>,
) -> ApiResult<UploadOutcome> {
    if request.image_data.is_empty() {
        return Err(ApiError::bad_request("No image data provided"));
    }
    let outcome = state.assets.ingest_image(&request.image_data, &request.category).await?;
    tracing::debug!("Owner {} uploaded {}", session.tenant.business_number, outcome.filename);
    Ok(ApiResponse::success(outcome))
}

/// POST /user/upload-pdf - Replace the owner's menu PDF
///
/// Expected Input:
/// ```json
/// { "pdfData": "data:application/pdf;base64,..." }
/// ```
pub async fn upload_pdf(
    State(state): State<AppState>,
    Extension(session): Extension<OwnerSession>,
    ApiJson(request): ApiJson<OwnerPdfRequest>,
) -> ApiResult<UploadOutcome> {
    if request.pdf_data.is_empty() {
        return Err(ApiError::bad_request("No PDF data provided"));
    }
    let tenant = &session.tenant;
    let outcome = state.assets.ingest_menu(&request.pdf_data, &tenant.business_number).await?;
    state.tenants.set_menu(tenant.id, outcome.url.clone()).await?;
    Ok(ApiResponse::success(outcome))
}
