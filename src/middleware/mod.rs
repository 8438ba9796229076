pub mod auth;
pub mod json;
pub mod response;

pub use auth::{admin_session_middleware, owner_session_middleware, AdminSession, OwnerSession};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
