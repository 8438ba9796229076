// handlers/public/rate.rs - POST /api/rate handler

use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::rating_gate::json_rating;
use crate::services::{GateDecision, RatingGate, ReviewSubmission};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateRequest {
    pub business_number: String,
    pub rating: Option<Value>,
}

/// POST /api/rate - Run the rating gate for a business
///
/// Expected Input:
/// ```json
/// { "businessNumber": "BIS00001", "rating": 4 }
/// ```
///
/// Responds with `{"action": "redirect", "url"}`, `{"action": "acknowledge",
/// "message"}` or `{"action": "thank_you", "location", ...}`. Ratings below
/// the threshold are recorded first; a failed recording is only logged.
pub async fn rate(State(state): State<AppState>, ApiJson(request): ApiJson<RateRequest>) -> ApiResult<GateDecision> {
    let rating = request
        .rating
        .ok_or_else(|| ApiError::bad_request("Business number and rating are required"))?;
    let rating = json_rating(&rating)?;
    let tenant = state.tenants.find_active(&request.business_number).await?;

    let mut gate = RatingGate::for_tenant(&tenant);
    let decision = gate
        .select(rating)?
        .ok_or_else(|| ApiError::conflict("Rating already submitted"))?;

    if decision.captures_review() {
        let submission = ReviewSubmission::new(rating);
        if let Err(e) = state.analytics.record_review(&tenant.business_number, &submission).await {
            tracing::warn!("Failed to record rating for {}: {}", tenant.business_number, e);
        }
    }

    Ok(ApiResponse::success(decision))
}
