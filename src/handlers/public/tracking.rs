// handlers/public/tracking.rs - POST /api/track-visit and POST /api/submit-review handlers

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::BusinessId;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::rating_gate::json_rating;
use crate::services::ReviewSubmission;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackVisitRequest {
    pub business_number: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitReviewRequest {
    pub business_number: String,
    pub rating: Option<Value>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// POST /api/track-visit - Count a landing-page visit
///
/// Expected Input:
/// ```json
/// { "businessNumber": "BIS00001" }
/// ```
///
/// Unknown or inactive businesses are accepted and ignored.
pub async fn track_visit(State(state): State<AppState>, ApiJson(request): ApiJson<TrackVisitRequest>) -> ApiResult<Value> {
    if request.business_number.is_empty() {
        return Err(ApiError::bad_request("Business number is required"));
    }
    let business_number: BusinessId = request.business_number.parse()?;

    let tracked = state.analytics.record_visit(&business_number).await?.is_some();
    Ok(ApiResponse::success(json!({
        "message": "Visit tracked successfully",
        "tracked": tracked
    })))
}

/// POST /api/submit-review - Record an internally captured star rating
///
/// Expected Input:
/// ```json
/// { "businessNumber": "BIS00001", "rating": 2, "timestamp": "...", "type": "internal_review" }
/// ```
pub async fn submit_review(State(state): State<AppState>, ApiJson(request): ApiJson<SubmitReviewRequest>) -> ApiResult<Value> {
    let raw_rating = match request.rating {
        Some(rating) if !request.business_number.is_empty() => rating,
        _ => return Err(ApiError::bad_request("Business number and rating are required")),
    };
    let business_number: BusinessId = request.business_number.parse()?;
    let rating = json_rating(&raw_rating)?;

    let submission = ReviewSubmission {
        rating,
        timestamp: request.timestamp.unwrap_or_else(Utc::now),
        kind: request
            .kind
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| ReviewSubmission::DEFAULT_KIND.to_string()),
    };

    let recorded = state.analytics.record_review(&business_number, &submission).await?.is_some();
    Ok(ApiResponse::success(json!({
        "message": "Review submitted successfully",
        "recorded": recorded
    })))
}
