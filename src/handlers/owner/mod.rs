// handlers/owner/mod.rs - Business-owner handlers (owner session required)
//
// Route Prefix: /user/*
// Middleware: owner_session_middleware injects OwnerSession with the live tenant record
pub mod analytics;
pub mod profile;
pub mod session;
pub mod upload;

pub use analytics::analytics;
pub use profile::{profile_data, profile_update};
pub use session::refresh_session;
pub use upload::{upload_image, upload_pdf};
