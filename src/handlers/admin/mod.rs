// handlers/admin/mod.rs - Admin handlers (admin session required)
//
// Route Prefix: /admin/*
// Middleware: admin_session_middleware injects AdminSession
pub mod analytics;
pub mod session;
pub mod upload;
pub mod users;

pub use analytics::analytics;
pub use session::refresh_session;
pub use upload::{upload_image, upload_pdf};
pub use users::{user_create, user_delete, user_get, user_list, user_update};
