// handlers/public/pdf_proxy.rs - GET /api/pdf-proxy handler

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// Accept only URLs under the object store's public prefix. The prefix carries
/// the scheme, so an https prefix refuses plain http. Parsing first resolves
/// `..` segments before the comparison.
pub fn allowed_pdf_url(raw: &str, public_prefix: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|_| ApiError::invalid("INVALID_PDF_URL", "Invalid PDF URL"))?;
    if !url.as_str().starts_with(public_prefix) {
        return Err(ApiError::invalid("INVALID_PDF_URL", "Invalid PDF URL"));
    }
    Ok(url)
}

/// GET /api/pdf-proxy?url= - Stream a stored menu PDF through this server
pub async fn pdf_proxy(State(state): State<AppState>, Query(query): Query<ProxyQuery>) -> Result<Response, ApiError> {
    let raw = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("PDF URL is required"))?;
    let url = allowed_pdf_url(raw.trim(), &state.config.storage.public_prefix())?;

    let upstream = state.http.get(url.clone()).send().await.map_err(|e| {
        tracing::error!("Error fetching PDF {}: {}", url, e);
        ApiError::bad_gateway("Failed to fetch PDF from storage")
    })?;

    let status = upstream.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::not_found("PDF not found"));
    }
    if !status.is_success() {
        tracing::error!("Failed to fetch PDF {}: HTTP {}", url, status);
        return Err(ApiError::bad_gateway(format!("Failed to fetch PDF: HTTP {}", status.as_u16())));
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        Body::from_stream(upstream.bytes_stream().inspect_err(move |e| {
            tracing::warn!("PDF stream from {} ended early: {}", url, e);
        })),
    )
        .into_response())
}
