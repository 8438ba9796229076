use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{admin, owner, public};
use crate::middleware::{admin_session_middleware, owner_session_middleware};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;
    let cors = cors_layer(&state);

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(session_routes())
        .merge(admin_routes(state.clone()))
        .merge(owner_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/:business_number", get(public::user_by_business_number))
        .route("/api/track-visit", post(public::track_visit))
        .route("/api/submit-review", post(public::submit_review))
        .route("/api/rate", post(public::rate))
        .route("/api/pdf-proxy", get(public::pdf_proxy))
}

fn session_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/admin/verify-token", post(auth::admin_verify_token))
        .route("/admin/logout", get(auth::admin_logout))
        .route("/user/verify-token", post(auth::owner_verify_token))
        .route("/user/logout", get(auth::owner_logout))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(admin::user_list).post(admin::user_create))
        .route(
            "/admin/users/:id",
            get(admin::user_get).put(admin::user_update).delete(admin::user_delete),
        )
        .route("/admin/analytics/api", get(admin::analytics))
        .route("/admin/upload-image", post(admin::upload_image))
        .route("/admin/upload-pdf", post(admin::upload_pdf))
        .route("/admin/refresh-session", post(admin::refresh_session))
        .route_layer(middleware::from_fn_with_state(state, admin_session_middleware))
}

fn owner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/user/api/data", get(owner::profile_data))
        .route("/user/api/update", put(owner::profile_update))
        .route("/user/api/analytics", get(owner::analytics))
        .route("/user/upload-image", post(owner::upload_image))
        .route("/user/upload-pdf", post(owner::upload_pdf))
        .route("/user/refresh-session", post(owner::refresh_session))
        .route_layer(middleware::from_fn_with_state(state, owner_session_middleware))
}

fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let security = &state.config.security;
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    // Credentialed requests need explicit origins
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Storefront API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant digital storefront: review pages, menus and dashboards",
            "endpoints": {
                "public": "/api/user/:businessNumber, /api/track-visit, /api/submit-review, /api/rate, /api/pdf-proxy",
                "session": "/admin/verify-token, /user/verify-token, /admin/logout, /user/logout",
                "admin": "/admin/users[/:id], /admin/analytics/api, /admin/upload-image, /admin/upload-pdf (admin session)",
                "owner": "/user/api/data, /user/api/update, /user/api/analytics, /user/upload-image, /user/upload-pdf (owner session)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.tenants.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
