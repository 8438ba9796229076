use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::analytics::{buckets_since, cutoff_date, round1};
use crate::database::models::{Analytics, BusinessId, RatingDistribution, Tenant, TenantFilter};
use crate::database::{StoreError, TenantStore};

/// A review captured internally (below the tenant's threshold)
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub rating: u8,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
}

impl ReviewSubmission {
    pub const DEFAULT_KIND: &'static str = "internal_review";

    pub fn new(rating: u8) -> Self {
        Self {
            rating,
            timestamp: Utc::now(),
            kind: Self::DEFAULT_KIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantReviewAnalytics {
    pub total_submissions: u64,
    pub submissions_in_range: u64,
    pub submissions_by_date: BTreeMap<NaiveDate, u64>,
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
}

/// One tenant's row in an analytics report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantAnalytics {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub business_number: BusinessId,
    pub total_visits: u64,
    pub visits_in_range: u64,
    pub visits_by_date: BTreeMap<NaiveDate, u64>,
    pub last_visit: Option<DateTime<Utc>>,
    pub reviews: TenantReviewAnalytics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_visits: u64,
    pub total_reviews: u64,
    pub active_users: u64,
    pub avg_visits_per_user: f64,
    pub avg_rating: f64,
    pub top_performing_user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// Sorted by in-range visits, busiest first
    pub users: Vec<TenantAnalytics>,
    pub summary: AnalyticsSummary,
}

/// Aggregate tenants' analytics over the last `range_days` days.
///
/// Date buckets on or after `today - range_days` are in range. The global
/// average rating weighs every tenant's full distribution, not just the window.
pub fn summarize(tenants: &[Tenant], range_days: u32, now: DateTime<Utc>) -> AnalyticsReport {
    let cutoff = cutoff_date(now, range_days);

    let mut users = Vec::with_capacity(tenants.len());
    let mut total_visits = 0;
    let mut total_reviews = 0;
    let mut active_users = 0;
    let mut top: Option<(&str, u64)> = None;
    let mut rating_sum = 0;
    let mut rating_count = 0;

    for tenant in tenants {
        let analytics = tenant.analytics_or_default();
        let (visits_by_date, visits_in_range) = buckets_since(&analytics.visits_by_date, cutoff);
        let (submissions_by_date, submissions_in_range) =
            buckets_since(&analytics.reviews.submissions_by_date, cutoff);

        total_visits += visits_in_range;
        total_reviews += submissions_in_range;
        if visits_in_range > 0 {
            active_users += 1;
        }
        if visits_in_range > top.map_or(0, |(_, v)| v) {
            top = Some((tenant.name.as_str(), visits_in_range));
        }

        let distribution = analytics.reviews.rating_distribution;
        rating_sum += distribution.weighted_sum();
        rating_count += distribution.total();

        users.push(TenantAnalytics {
            id: tenant.id,
            name: tenant.name.clone(),
            email: tenant.email.clone(),
            business_number: tenant.business_number.clone(),
            total_visits: analytics.total_visits,
            visits_in_range,
            visits_by_date,
            last_visit: analytics.last_visit,
            reviews: TenantReviewAnalytics {
                total_submissions: analytics.reviews.total_submissions,
                submissions_in_range,
                submissions_by_date,
                average_rating: analytics.reviews.average_rating,
                rating_distribution: distribution,
            },
        });
    }

    // Stable, so ties keep store order
    users.sort_by(|a, b| b.visits_in_range.cmp(&a.visits_in_range));

    let summary = AnalyticsSummary {
        total_visits,
        total_reviews,
        active_users,
        avg_visits_per_user: if active_users > 0 {
            round1(total_visits as f64 / active_users as f64)
        } else {
            0.0
        },
        avg_rating: if rating_count > 0 {
            round1(rating_sum as f64 / rating_count as f64)
        } else {
            0.0
        },
        top_performing_user: top.map_or_else(|| "-".to_string(), |(name, _)| name.to_string()),
    };

    AnalyticsReport { users, summary }
}

/// Visit / review counters for tenants, updated with optimistic concurrency
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn TenantStore>,
    max_attempts: u32,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn TenantStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Count a landing-page visit. Unknown or inactive tenants are ignored
    /// and yield `None`.
    pub async fn record_visit(&self, business_number: &BusinessId) -> Result<Option<Analytics>, StoreError> {
        let updated = self
            .update(business_number, |analytics, now| analytics.record_visit(now))
            .await?;
        if let Some(analytics) = &updated {
            info!("Visit tracked for {}. Total visits: {}", business_number, analytics.total_visits);
        }
        Ok(updated)
    }

    /// Count an internally captured review
    pub async fn record_review(
        &self,
        business_number: &BusinessId,
        review: &ReviewSubmission,
    ) -> Result<Option<Analytics>, StoreError> {
        let rating = review.rating;
        let updated = self
            .update(business_number, |analytics, now| analytics.record_review(rating, now))
            .await?;
        if let Some(analytics) = &updated {
            info!(
                kind = %review.kind,
                submitted_at = %review.timestamp,
                "Review submission tracked for {}. Rating: {}, Total submissions: {}",
                business_number,
                rating,
                analytics.reviews.total_submissions
            );
        }
        Ok(updated)
    }

    pub async fn summarize(&self, range_days: u32, filter: &TenantFilter) -> Result<AnalyticsReport, StoreError> {
        let tenants: Vec<Tenant> = self
            .store
            .list_active()
            .await?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        Ok(summarize(&tenants, range_days, Utc::now()))
    }

    async fn update<F>(&self, business_number: &BusinessId, apply: F) -> Result<Option<Analytics>, StoreError>
    where
        F: Fn(&mut Analytics, DateTime<Utc>) + Send + Sync,
    {
        for attempt in 1..=self.max_attempts {
            let Some(tenant) = self.store.find_active_by_business_id(business_number).await? else {
                info!("Tenant not found for business number: {}", business_number);
                return Ok(None);
            };

            let mut analytics = tenant.analytics_or_default();
            apply(&mut analytics, Utc::now());

            if self
                .store
                .swap_analytics(tenant.id, tenant.analytics_version, &analytics)
                .await?
            {
                return Ok(Some(analytics));
            }
            debug!("Analytics for {} changed underneath us (attempt {})", business_number, attempt);
        }

        Err(StoreError::Contention(business_number.clone()))
    }
}
