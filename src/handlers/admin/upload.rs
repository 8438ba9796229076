// handlers/admin/upload.rs - POST /admin/upload-image and POST /admin/upload-pdf handlers

use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::UploadOutcome;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadImageRequest {
    pub image_data: String,
    /// Upload category, e.g. `logo` or `banner`
    #[serde(rename = "type")]
    pub category: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadPdfRequest {
    pub pdf_data: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuUploaded {
    #[serde(flatten)]
    pub upload: UploadOutcome,
    pub user_id: Uuid,
}

/// POST /admin/upload-image - Store an image and return its public URL
///
/// Expected Input:
/// ```json
/// { "imageData": "data:image/png;base64,...", "type": "logo" }
/// ```
pub async fn upload_image(State(state): State<AppState>, ApiJson(request): ApiJson<UploadImageRequest>) -> ApiResult<UploadOutcome> {
    if request.image_data.is_empty() {
        return Err(ApiError::bad_request("No image data provided"));
    }
    let outcome = state.assets.ingest_image(&request.image_data, &request.category).await?;
    Ok(ApiResponse::success(outcome))
}

/// POST /admin/upload-pdf - Store a business's menu PDF and link it to the record
///
/// Expected Input:
/// ```json
/// { "pdfData": "data:application/pdf;base64,...", "userId": "uuid" }
/// ```
pub async fn upload_pdf(State(state): State<AppState>, ApiJson(request): ApiJson<UploadPdfRequest>) -> ApiResult<MenuUploaded> {
    let user_id = match request.user_id {
        Some(id) if !request.pdf_data.is_empty() => id,
        _ => return Err(ApiError::bad_request("PDF data and user ID are required")),
    };
    let tenant = state.tenants.get(user_id).await?;

    let upload = state.assets.ingest_menu(&request.pdf_data, &tenant.business_number).await?;
    state.tenants.set_menu(tenant.id, upload.url.clone()).await?;

    Ok(ApiResponse::success(MenuUploaded { upload, user_id }))
}
