// handlers/public/auth/mod.rs - Login and logout (no session required)
pub mod logout;
pub mod verify;

pub use logout::{admin_logout, owner_logout};
pub use verify::{admin_verify_token, owner_verify_token, VerifyTokenRequest};
