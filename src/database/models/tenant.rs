use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analytics::Analytics;
use super::business_id::BusinessId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Active,
    Inactive,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "active" => TenantStatus::Active,
            _ => TenantStatus::Inactive,
        }
    }
}

/// Call-to-action button shown on the landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub device_specific: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desktop_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLink {
    pub icon: String,
    pub url: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

/// Requesting device class, used to pick a device-specific button target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Android,
    Ios,
    Desktop,
}

impl Device {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("android") {
            Device::Android
        } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
            Device::Ios
        } else {
            Device::Desktop
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ActionButton {
    /// A button survives a save only with text and somewhere to go
    pub fn is_complete(&self) -> bool {
        if self.text.trim().is_empty() {
            return false;
        }
        if self.device_specific {
            present(&self.desktop_url).is_some()
                || present(&self.android_url).is_some()
                || present(&self.ios_url).is_some()
        } else {
            present(&self.url).is_some()
        }
    }

    pub fn target_url(&self, device: Device) -> Option<&str> {
        let url = present(&self.url);
        if !self.device_specific {
            return url;
        }
        let desktop = present(&self.desktop_url);
        match device {
            Device::Android => present(&self.android_url).or(desktop).or(url),
            Device::Ios => present(&self.ios_url).or(desktop).or(url),
            Device::Desktop => desktop.or(url),
        }
    }
}

impl SocialLink {
    pub fn is_complete(&self) -> bool {
        !self.icon.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// Tenant record: one per business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub business_number: BusinessId,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub banner_image: Option<String>,
    pub logo: Option<String>,
    pub review_url: Option<String>,
    pub minimum_rating: u8,
    pub buttons: Vec<ActionButton>,
    pub social_links: Vec<SocialLink>,
    pub menu_pdf: Option<String>,
    pub hide_review_tab: bool,
    pub status: TenantStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub analytics: Option<Analytics>,
    #[serde(skip)]
    pub analytics_version: i64,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    /// Analytics block, zero-state when never initialized
    pub fn analytics_or_default(&self) -> Analytics {
        self.analytics.clone().unwrap_or_default()
    }
}

/// Fields supplied by an admin when creating a tenant
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub created_by: Option<String>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct TenantPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub banner_image: Option<Option<String>>,
    pub logo: Option<Option<String>>,
    pub review_url: Option<Option<String>>,
    pub minimum_rating: Option<u8>,
    pub buttons: Option<Vec<ActionButton>>,
    pub social_links: Option<Vec<SocialLink>>,
    pub menu_pdf: Option<Option<String>>,
    pub hide_review_tab: Option<bool>,
    pub status: Option<TenantStatus>,
}

impl TenantPatch {
    pub fn apply(self, tenant: &mut Tenant) {
        if let Some(v) = self.name {
            tenant.name = v;
        }
        if let Some(v) = self.email {
            tenant.email = v;
        }
        if let Some(v) = self.mobile_number {
            tenant.mobile_number = v;
        }
        if let Some(v) = self.banner_image {
            tenant.banner_image = v;
        }
        if let Some(v) = self.logo {
            tenant.logo = v;
        }
        if let Some(v) = self.review_url {
            tenant.review_url = v;
        }
        if let Some(v) = self.minimum_rating {
            tenant.minimum_rating = v;
        }
        if let Some(v) = self.buttons {
            tenant.buttons = v;
        }
        if let Some(v) = self.social_links {
            tenant.social_links = v;
        }
        if let Some(v) = self.menu_pdf {
            tenant.menu_pdf = v;
        }
        if let Some(v) = self.hide_review_tab {
            tenant.hide_review_tab = v;
        }
        if let Some(v) = self.status {
            tenant.status = v;
        }
    }
}

/// Narrowing applied by analytics queries
#[derive(Debug, Clone, Default)]
pub struct TenantFilter {
    pub id: Option<Uuid>,
    pub business_number: Option<BusinessId>,
}

impl TenantFilter {
    /// Id wins over business number when both are given
    pub fn matches(&self, tenant: &Tenant) -> bool {
        match (&self.id, &self.business_number) {
            (Some(id), _) => tenant.id == *id,
            (None, Some(bn)) => tenant.business_number == *bn,
            (None, None) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_button() -> ActionButton {
        ActionButton {
            text: "Order".into(),
            url: Some("https://example.com/order".into()),
            device_specific: true,
            desktop_url: Some("https://example.com/web".into()),
            android_url: Some("https://play.example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_device_specific_targets() {
        let button = device_button();
        assert_eq!(button.target_url(Device::Android), Some("https://play.example.com"));
        assert_eq!(button.target_url(Device::Ios), Some("https://example.com/web"));
        assert_eq!(button.target_url(Device::Desktop), Some("https://example.com/web"));
    }

    #[test]
    fn plain_buttons_ignore_device_urls() {
        let mut button = device_button();
        button.device_specific = false;
        assert_eq!(button.target_url(Device::Android), Some("https://example.com/order"));
    }

    #[test]
    fn button_completeness() {
        assert!(device_button().is_complete());

        let mut only_text = ActionButton { text: "Call".into(), ..Default::default() };
        assert!(!only_text.is_complete());
        only_text.url = Some("   ".into());
        assert!(!only_text.is_complete());
        only_text.url = Some("tel:123".into());
        assert!(only_text.is_complete());

        let device_without_urls = ActionButton {
            text: "App".into(),
            url: Some("https://example.com".into()),
            device_specific: true,
            ..Default::default()
        };
        assert!(!device_without_urls.is_complete());
    }

    #[test]
    fn detects_devices_from_user_agent() {
        assert_eq!(
            Device::from_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"),
            Device::Android
        );
        assert_eq!(
            Device::from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"),
            Device::Ios
        );
        assert_eq!(Device::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"), Device::Desktop);
    }

    #[test]
    fn button_enabled_defaults_to_true() {
        let button: ActionButton = serde_json::from_str(r#"{"text":"Menu","url":"/menu"}"#).unwrap();
        assert!(button.enabled);
        let link: SocialLink = serde_json::from_str(r#"{"icon":"instagram","url":"https://x"}"#).unwrap();
        assert!(link.enabled && link.is_complete());
    }
}
