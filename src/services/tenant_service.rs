use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{
    ActionButton, BusinessId, BusinessIdError, Device, NewTenant, SocialLink, Tenant, TenantPatch, TenantStatus,
};
use crate::database::{StoreError, TenantStore};

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Name, email, and mobile number are required")]
    MissingRequired,
    #[error("Invalid {field}: {problem}")]
    InvalidField { field: &'static str, problem: String },
    #[error("Tenant not found")]
    NotFound,
    #[error(transparent)]
    BusinessId(#[from] BusinessIdError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Expected Input: `{"name": "...", "email": "...", "mobileNumber": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTenantRequest {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
}

/// Fields an owner may edit on their own record. Optional URL fields are
/// cleared by sending an empty string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub banner_image: Option<String>,
    pub logo: Option<String>,
    pub review_url: Option<String>,
    pub buttons: Option<Vec<ActionButton>>,
    pub social_links: Option<Vec<SocialLink>>,
    pub hide_review_tab: Option<bool>,
}

/// Admin edit: the owner's fields plus threshold, status and menu
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantUpdateRequest {
    #[serde(flatten)]
    pub profile: ProfileUpdate,
    pub minimum_rating: Option<i64>,
    pub status: Option<TenantStatus>,
    pub menu_pdf: Option<String>,
}

fn required(field: &'static str, value: Option<String>) -> Result<Option<String>, TenantError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(TenantError::InvalidField {
            field,
            problem: "must not be empty".to_string(),
        }),
        other => Ok(other),
    }
}

fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

fn check_email(email: &str) -> Result<(), TenantError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(TenantError::InvalidField {
            field: "email",
            problem: "must be an email address".to_string(),
        })
    }
}

impl ProfileUpdate {
    pub fn into_patch(self) -> Result<TenantPatch, TenantError> {
        let email = required("email", self.email)?;
        if let Some(email) = &email {
            check_email(email)?;
        }

        Ok(TenantPatch {
            name: required("name", self.name)?,
            email,
            mobile_number: required("mobileNumber", self.mobile_number)?,
            banner_image: clearable(self.banner_image),
            logo: clearable(self.logo),
            review_url: clearable(self.review_url),
            buttons: self
                .buttons
                .map(|buttons| buttons.into_iter().filter(ActionButton::is_complete).collect()),
            social_links: self
                .social_links
                .map(|links| links.into_iter().filter(SocialLink::is_complete).collect()),
            hide_review_tab: self.hide_review_tab,
            ..TenantPatch::default()
        })
    }
}

impl TenantUpdateRequest {
    pub fn into_patch(self) -> Result<TenantPatch, TenantError> {
        let minimum_rating = match self.minimum_rating {
            Some(r) if (0..=5).contains(&r) => Some(r as u8),
            Some(_) => {
                return Err(TenantError::InvalidField {
                    field: "minimumRating",
                    problem: "must be between 0 and 5".to_string(),
                })
            }
            None => None,
        };

        let mut patch = self.profile.into_patch()?;
        patch.minimum_rating = minimum_rating;
        patch.status = self.status;
        patch.menu_pdf = clearable(self.menu_pdf);
        Ok(patch)
    }
}

/// Landing-page button with its target resolved for the requesting device
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicButton {
    #[serde(flatten)]
    pub button: ActionButton,
    pub target_url: Option<String>,
}

/// Public-safe subset of a tenant record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTenant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub business_number: BusinessId,
    pub banner_image: Option<String>,
    pub logo: Option<String>,
    pub review_url: Option<String>,
    pub minimum_rating: u8,
    pub buttons: Vec<PublicButton>,
    pub social_links: Vec<SocialLink>,
    pub menu_pdf: Option<String>,
    pub hide_review_tab: bool,
    pub created_at: DateTime<Utc>,
    pub status: TenantStatus,
}

impl PublicTenant {
    pub fn new(tenant: Tenant, device: Device) -> Self {
        let buttons = tenant
            .buttons
            .into_iter()
            .map(|button| PublicButton {
                target_url: button.target_url(device).map(str::to_string),
                button,
            })
            .collect();

        Self {
            id: tenant.id,
            name: tenant.name,
            email: tenant.email,
            mobile_number: tenant.mobile_number,
            business_number: tenant.business_number,
            banner_image: tenant.banner_image,
            logo: tenant.logo,
            review_url: tenant.review_url,
            minimum_rating: tenant.minimum_rating,
            buttons,
            social_links: tenant.social_links,
            menu_pdf: tenant.menu_pdf,
            hide_review_tab: tenant.hide_review_tab,
            created_at: tenant.created_at,
            status: tenant.status,
        }
    }
}

/// Tenant directory operations on top of a `TenantStore`
#[derive(Clone)]
pub struct TenantService {
    store: Arc<dyn TenantStore>,
}

impl TenantService {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateTenantRequest, created_by: Option<String>) -> Result<Tenant, TenantError> {
        let name = request.name.trim();
        let email = request.email.trim();
        let mobile_number = request.mobile_number.trim();
        if name.is_empty() || email.is_empty() || mobile_number.is_empty() {
            return Err(TenantError::MissingRequired);
        }
        check_email(email)?;

        let tenant = self
            .store
            .create(NewTenant {
                name: name.to_string(),
                email: email.to_string(),
                mobile_number: mobile_number.to_string(),
                created_by,
            })
            .await?;

        info!("Created tenant {} ({})", tenant.business_number, tenant.name);
        Ok(tenant)
    }

    pub async fn list(&self) -> Result<Vec<Tenant>, TenantError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Tenant, TenantError> {
        self.store.get(id).await?.ok_or(TenantError::NotFound)
    }

    pub async fn update(&self, id: Uuid, patch: TenantPatch) -> Result<Tenant, TenantError> {
        let tenant = self.store.update(id, patch).await?.ok_or(TenantError::NotFound)?;
        info!("Updated tenant {}", tenant.business_number);
        Ok(tenant)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), TenantError> {
        if self.store.delete(id).await? {
            info!("Deleted tenant {}", id);
            Ok(())
        } else {
            Err(TenantError::NotFound)
        }
    }

    pub async fn set_menu(&self, id: Uuid, url: String) -> Result<Tenant, TenantError> {
        let patch = TenantPatch {
            menu_pdf: Some(Some(url)),
            ..TenantPatch::default()
        };
        self.update(id, patch).await
    }

    /// Active tenant behind a public business number
    pub async fn find_active(&self, business_number: &str) -> Result<Tenant, TenantError> {
        let business_number: BusinessId = business_number.parse()?;
        self.store
            .find_active_by_business_id(&business_number)
            .await?
            .ok_or(TenantError::NotFound)
    }

    pub async fn public_profile(&self, business_number: &str, device: Device) -> Result<PublicTenant, TenantError> {
        let tenant = self.find_active(business_number).await?;
        Ok(PublicTenant::new(tenant, device))
    }

    /// Active tenant an owner logs in as
    pub async fn find_owner(&self, email: &str) -> Result<Option<Tenant>, TenantError> {
        Ok(self.store.find_active_by_email(email).await?)
    }

    /// Owner's full record, with zero-state analytics when none exist yet
    pub async fn owner_record(&self, business_number: &BusinessId) -> Result<Tenant, TenantError> {
        let mut tenant = self
            .store
            .find_active_by_business_id(business_number)
            .await?
            .ok_or(TenantError::NotFound)?;
        tenant.analytics = Some(tenant.analytics_or_default());
        Ok(tenant)
    }

    pub async fn health_check(&self) -> Result<(), TenantError> {
        Ok(self.store.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTenantStore;
    use serde_json::json;

    fn service() -> TenantService {
        TenantService::new(Arc::new(MemoryTenantStore::new()))
    }

    fn request(name: &str, email: &str) -> CreateTenantRequest {
        CreateTenantRequest {
            name: name.to_string(),
            email: email.to_string(),
            mobile_number: "+15550100".to_string(),
        }
    }

    #[tokio::test]
    async fn create_requires_all_fields() {
        let err = service().create(request("Cafe", "  "), None).await.unwrap_err();
        assert!(matches!(err, TenantError::MissingRequired));
    }

    #[tokio::test]
    async fn create_assigns_business_numbers_in_order() {
        let service = service();
        let a = service.create(request("A", "a@example.com"), Some("admin@example.com".into())).await.unwrap();
        let b = service.create(request("B", "b@example.com"), None).await.unwrap();
        assert_eq!(a.business_number.as_str(), "BIS00001");
        assert_eq!(b.business_number.as_str(), "BIS00002");
        assert_eq!(a.created_by.as_deref(), Some("admin@example.com"));
        assert_eq!(a.minimum_rating, 0);
        assert!(a.is_active());
    }

    #[test]
    fn admin_update_validates_threshold() {
        let body = json!({"minimumRating": 6});
        let request: TenantUpdateRequest = serde_json::from_value(body).unwrap();
        assert!(matches!(
            request.into_patch(),
            Err(TenantError::InvalidField { field: "minimumRating", .. })
        ));

        let request: TenantUpdateRequest = serde_json::from_value(json!({"minimumRating": 4, "name": "New"})).unwrap();
        let patch = request.into_patch().unwrap();
        assert_eq!(patch.minimum_rating, Some(4));
        assert_eq!(patch.name.as_deref(), Some("New"));
    }

    #[test]
    fn incomplete_buttons_and_links_are_dropped() {
        let body = json!({
            "buttons": [
                {"text": "Order", "url": "https://order.example.com"},
                {"text": "", "url": "https://x.example.com"},
                {"text": "App", "deviceSpecific": true, "iosUrl": "https://apps.apple.com/x"},
                {"text": "Broken", "deviceSpecific": true}
            ],
            "socialLinks": [
                {"icon": "instagram", "url": "https://instagram.com/cafe"},
                {"icon": "", "url": "https://facebook.com/cafe"}
            ]
        });
        let update: ProfileUpdate = serde_json::from_value(body).unwrap();
        let patch = update.into_patch().unwrap();

        let texts: Vec<_> = patch.buttons.unwrap().into_iter().map(|b| b.text).collect();
        assert_eq!(texts, vec!["Order", "App"]);
        assert_eq!(patch.social_links.unwrap().len(), 1);
    }

    #[test]
    fn empty_strings_clear_optional_fields() {
        let update: ProfileUpdate = serde_json::from_value(json!({"reviewUrl": "", "logo": "https://l"})).unwrap();
        let patch = update.into_patch().unwrap();
        assert_eq!(patch.review_url, Some(None));
        assert_eq!(patch.logo, Some(Some("https://l".to_string())));
        assert_eq!(patch.banner_image, None);
    }

    #[test]
    fn owner_update_ignores_threshold() {
        let update: ProfileUpdate = serde_json::from_value(json!({"minimumRating": 5, "status": "inactive"})).unwrap();
        let patch = update.into_patch().unwrap();
        assert_eq!(patch.minimum_rating, None);
        assert_eq!(patch.status, None);
    }

    #[tokio::test]
    async fn public_profile_resolves_button_targets() {
        let service = service();
        let tenant = service.create(request("Cafe", "cafe@example.com"), None).await.unwrap();
        let update: ProfileUpdate = serde_json::from_value(json!({
            "buttons": [{
                "text": "Get the app",
                "deviceSpecific": true,
                "desktopUrl": "https://cafe.example.com",
                "androidUrl": "https://play.google.com/cafe"
            }]
        }))
        .unwrap();
        service.update(tenant.id, update.into_patch().unwrap()).await.unwrap();

        let android = service
            .public_profile(tenant.business_number.as_str(), Device::Android)
            .await
            .unwrap();
        assert_eq!(android.buttons[0].target_url.as_deref(), Some("https://play.google.com/cafe"));

        let ios = service.public_profile(tenant.business_number.as_str(), Device::Ios).await.unwrap();
        assert_eq!(ios.buttons[0].target_url.as_deref(), Some("https://cafe.example.com"));

        let json = serde_json::to_value(&ios).unwrap();
        assert_eq!(json["buttons"][0]["text"], "Get the app");
        assert_eq!(json["buttons"][0]["targetUrl"], "https://cafe.example.com");
        assert!(json.get("analytics").is_none());
    }

    #[tokio::test]
    async fn public_profile_rejects_bad_and_unknown_numbers() {
        let service = service();
        assert!(matches!(
            service.public_profile("BIS1", Device::Desktop).await,
            Err(TenantError::BusinessId(BusinessIdError::Malformed))
        ));
        assert!(matches!(
            service.public_profile("BIS00042", Device::Desktop).await,
            Err(TenantError::NotFound)
        ));
    }

    #[tokio::test]
    async fn owner_record_has_zero_state_analytics() {
        let service = service();
        let tenant = service.create(request("Cafe", "cafe@example.com"), None).await.unwrap();
        let record = service.owner_record(&tenant.business_number).await.unwrap();
        assert_eq!(record.analytics.unwrap().total_visits, 0);
    }

    #[tokio::test]
    async fn delete_is_hard_and_reports_missing() {
        let service = service();
        let tenant = service.create(request("Cafe", "cafe@example.com"), None).await.unwrap();
        service.delete(tenant.id).await.unwrap();
        assert!(matches!(service.get(tenant.id).await, Err(TenantError::NotFound)));
        assert!(matches!(service.delete(tenant.id).await, Err(TenantError::NotFound)));
    }
}
