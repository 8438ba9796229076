// handlers/owner/analytics.rs - GET /user/api/analytics handler

use axum::extract::{Extension, Query, State};
use serde::{Deserialize, Serialize};

use crate::database::models::TenantFilter;
use crate::middleware::{ApiResponse, ApiResult, OwnerSession};
use crate::services::analytics_service::{AnalyticsSummary, TenantAnalytics};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAnalyticsQuery {
    pub time_range: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OwnerAnalytics {
    pub analytics: Option<TenantAnalytics>,
    pub summary: AnalyticsSummary,
}

/// GET /user/api/analytics?timeRange - The owner's own analytics row and summary
pub async fn analytics(
    State(state): State<AppState>,
    Extension(session): Extension<OwnerSession>,
    Query(query): Query<OwnerAnalyticsQuery>,
) -> ApiResult<OwnerAnalytics> {
    let filter = TenantFilter {
        id: Some(session.tenant.id),
        business_number: None,
    };
    let range = query.time_range.unwrap_or(state.config.analytics.default_range_days);
    let report = state.analytics.summarize(range, &filter).await?;

    Ok(ApiResponse::success(OwnerAnalytics {
        analytics: report.users.into_iter().next(),
        summary: report.summary,
    }))
}
