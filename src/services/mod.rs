pub mod analytics_service;
pub mod asset_service;
pub mod rating_gate;
pub mod tenant_service;

pub use analytics_service::{AnalyticsReport, AnalyticsService, ReviewSubmission};
pub use asset_service::{AssetService, IngestError, UploadOutcome};
pub use rating_gate::{GateDecision, GateError, RatingGate};
pub use tenant_service::{TenantError, TenantService};
