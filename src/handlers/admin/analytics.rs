// handlers/admin/analytics.rs - GET /admin/analytics/api handler

use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{BusinessId, TenantFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AnalyticsReport;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    /// Window in days, defaults to the configured range
    pub time_range: Option<u32>,
    pub user_id: Option<Uuid>,
    pub business_number: Option<String>,
}

/// GET /admin/analytics/api?timeRange&userId&businessNumber - Cross-tenant analytics
pub async fn analytics(State(state): State<AppState>, Query(query): Query<AnalyticsQuery>) -> ApiResult<AnalyticsReport> {
    let business_number = match query.business_number.filter(|b| !b.is_empty()) {
        Some(raw) => Some(raw.parse::<BusinessId>()?),
        None => None,
    };
    let filter = TenantFilter {
        id: query.user_id,
        business_number,
    };
    let range = query.time_range.unwrap_or(state.config.analytics.default_range_days);

    Ok(ApiResponse::success(state.analytics.summarize(range, &filter).await?))
}
