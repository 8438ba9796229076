pub mod analytics;
pub mod business_id;
pub mod tenant;

pub use analytics::{Analytics, RatingDistribution, ReviewStats};
pub use business_id::{BusinessId, BusinessIdError};
pub use tenant::{ActionButton, Device, NewTenant, SocialLink, Tenant, TenantFilter, TenantPatch, TenantStatus};
