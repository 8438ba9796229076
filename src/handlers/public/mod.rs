// handlers/public/mod.rs - Public handlers (no session required)
//
// Landing-page API used by review pages, plus identity-token login.
pub mod auth;
pub mod pdf_proxy;
pub mod profile;
pub mod rate;
pub mod tracking;

pub use pdf_proxy::pdf_proxy;
pub use profile::user_by_business_number;
pub use rate::rate;
pub use tracking::{submit_review, track_visit};
