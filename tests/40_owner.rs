mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::{TestApp, OWNER_EMAIL, STRANGER_TOKEN};

#[tokio::test]
async fn login_requires_an_active_business() -> Result<()> {
    let app = TestApp::new();

    let stranger = app.post("/user/verify-token", json!({"idToken": STRANGER_TOKEN}), None).await?;
    assert_eq!(stranger.status, StatusCode::NOT_FOUND);

    app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    let owner = app.post("/user/verify-token", json!({"idToken": common::OWNER_TOKEN}), None).await?;
    assert_eq!(owner.status, StatusCode::OK);
    assert_eq!(owner.data()["user"]["businessNumber"], "BIS00001");
    assert_eq!(owner.data()["redirect"], "/user/dashboard");
    Ok(())
}

#[tokio::test]
async fn owner_routes_require_a_session() -> Result<()> {
    let app = TestApp::new();

    let api = app.get("/user/api/data", None).await?;
    assert_eq!(api.status, StatusCode::UNAUTHORIZED);

    let browser = app
        .request(Method::GET, "/user/api/data", None, None, &[(header::ACCEPT, "text/html")])
        .await?;
    assert_eq!(browser.status, StatusCode::SEE_OTHER);
    assert_eq!(browser.header(header::LOCATION), Some("/user/login"));

    let admin = app.admin_cookie().await?;
    assert_eq!(app.get("/user/api/data", Some(&admin)).await?.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn data_includes_zero_state_analytics() -> Result<()> {
    let app = TestApp::new();
    app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    let cookie = app.owner_cookie().await?;

    let res = app.get("/user/api/data", Some(&cookie)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "Cafe");
    assert_eq!(res.data()["analytics"]["totalVisits"], 0);
    assert_eq!(res.data()["analytics"]["reviews"]["ratingDistribution"]["5"], 0);
    Ok(())
}

#[tokio::test]
async fn update_ignores_admin_only_fields() -> Result<()> {
    let app = TestApp::new();
    app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    let cookie = app.owner_cookie().await?;

    let res = app
        .put(
            "/user/api/update",
            json!({
                "name": "Cafe Luna",
                "logo": "https://cdn.example.com/logo.png",
                "socialLinks": [{"icon": "instagram", "url": "https://instagram.com/cafeluna"}],
                "minimumRating": 5,
                "status": "inactive"
            }),
            Some(&cookie),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "Cafe Luna");
    assert_eq!(res.data()["logo"], "https://cdn.example.com/logo.png");
    assert_eq!(res.data()["socialLinks"][0]["icon"], "instagram");
    assert_eq!(res.data()["minimumRating"], 0);
    assert_eq!(res.data()["status"], "active");
    assert!(res.header(header::SET_COOKIE).is_none());

    let cleared = app.put("/user/api/update", json!({"logo": ""}), Some(&cookie)).await?;
    assert!(cleared.data()["logo"].is_null());

    let blank = app.put("/user/api/update", json!({"name": "  "}), Some(&cookie)).await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn email_change_keeps_the_session() -> Result<()> {
    let app = TestApp::new();
    app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    let cookie = app.owner_cookie().await?;

    let res = app
        .put("/user/api/update", json!({"email": "new-owner@cafe.example"}), Some(&cookie))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["email"], "new-owner@cafe.example");
    let reissued = res.session_cookie()?;

    for session in [&cookie, &reissued] {
        let data = app.get("/user/api/data", Some(session)).await?;
        assert_eq!(data.status, StatusCode::OK);
        assert_eq!(data.data()["email"], "new-owner@cafe.example");

        let refreshed = app.post("/user/refresh-session", json!({}), Some(session)).await?;
        assert_eq!(refreshed.status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn analytics_are_scoped_to_the_owner() -> Result<()> {
    let app = TestApp::new();
    app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    app.seed_tenant("Bakery", "bakery@example.com").await?;
    let cookie = app.owner_cookie().await?;

    app.post("/api/track-visit", json!({"businessNumber": "BIS00001"}), None).await?;
    for _ in 0..3 {
        app.post("/api/track-visit", json!({"businessNumber": "BIS00002"}), None).await?;
    }

    let res = app.get("/user/api/analytics?timeRange=30", Some(&cookie)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["analytics"]["businessNumber"], "BIS00001");
    assert_eq!(res.data()["analytics"]["visitsInRange"], 1);
    assert_eq!(res.data()["summary"]["totalVisits"], 1);
    assert_eq!(res.data()["summary"]["topPerformingUser"], "Cafe");
    Ok(())
}

#[tokio::test]
async fn deleted_business_loses_its_session() -> Result<()> {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    let cookie = app.owner_cookie().await?;
    assert_eq!(app.get("/user/api/data", Some(&cookie)).await?.status, StatusCode::OK);

    let admin = app.admin_cookie().await?;
    app.delete(&format!("/admin/users/{}", tenant.id), Some(&admin)).await?;

    let res = app.get("/user/api/data", Some(&cookie)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn refresh_and_logout() -> Result<()> {
    let app = TestApp::new();
    app.seed_tenant("Cafe", OWNER_EMAIL).await?;
    let cookie = app.owner_cookie().await?;

    let refreshed = app.post("/user/refresh-session", json!({}), Some(&cookie)).await?;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.header(header::SET_COOKIE).is_some());

    let logout = app.get("/user/logout", Some(&cookie)).await?;
    assert_eq!(logout.status, StatusCode::SEE_OTHER);
    assert_eq!(logout.header(header::LOCATION), Some("/user/login"));
    Ok(())
}
