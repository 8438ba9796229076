// handlers/mod.rs - Handler tiers
//
// Public (no session) → Admin (admin session) → Owner (business-owner session)
pub mod admin;
pub mod owner;
pub mod public;

use axum::http::{header, HeaderMap};

use crate::database::models::Device;

/// Device class of the requester, from its User-Agent
pub(crate) fn request_device(headers: &HeaderMap) -> Device {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(Device::from_user_agent)
        .unwrap_or(Device::Desktop)
}
