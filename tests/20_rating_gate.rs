mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use storefront_api::database::models::TenantPatch;
use storefront_api::database::TenantStore;

async fn app_with_threshold(minimum_rating: u8, review_url: Option<&str>) -> Result<(TestApp, uuid::Uuid)> {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Cafe", "cafe@example.com").await?;
    let patch = TenantPatch {
        minimum_rating: Some(minimum_rating),
        review_url: Some(review_url.map(str::to_string)),
        ..Default::default()
    };
    app.store.update(tenant.id, patch).await?;
    Ok((app, tenant.id))
}

#[tokio::test]
async fn rating_at_threshold_redirects_without_recording() -> Result<()> {
    let (app, id) = app_with_threshold(4, Some("https://g.page/r/cafe/review")).await?;

    let res = app.post("/api/rate", json!({"businessNumber": "BIS00001", "rating": 4}), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["action"], "redirect");
    assert_eq!(res.data()["url"], "https://g.page/r/cafe/review");

    assert!(app.store.get(id).await?.unwrap().analytics.is_none());
    Ok(())
}

#[tokio::test]
async fn rating_below_threshold_is_captured() -> Result<()> {
    let (app, id) = app_with_threshold(4, Some("https://g.page/r/cafe/review")).await?;

    let res = app.post("/api/rate", json!({"businessNumber": "BIS00001", "rating": 2}), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["action"], "thank_you");
    assert_eq!(res.data()["location"], "/thank-you?rating=2&BIS=BIS00001");

    let reviews = app.store.get(id).await?.unwrap().analytics.unwrap().reviews;
    assert_eq!(reviews.total_submissions, 1);
    assert_eq!(reviews.rating_distribution.count(2), 1);
    Ok(())
}

#[tokio::test]
async fn missing_review_url_acknowledges() -> Result<()> {
    let (app, _) = app_with_threshold(3, None).await?;

    let res = app.post("/api/rate", json!({"businessNumber": "BIS00001", "rating": 5}), None).await?;
    assert_eq!(res.data()["action"], "acknowledge");
    assert!(res.data()["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn rate_validates_input() -> Result<()> {
    let (app, _) = app_with_threshold(3, None).await?;

    let out_of_range = app.post("/api/rate", json!({"businessNumber": "BIS00001", "rating": 9}), None).await?;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let unknown = app.post("/api/rate", json!({"businessNumber": "BIS00077", "rating": 2}), None).await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    Ok(())
}
