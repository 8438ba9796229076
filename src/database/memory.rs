use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Analytics, BusinessId, NewTenant, Tenant, TenantPatch, TenantStatus};
use super::store::{StoreError, TenantStore};

/// Process-local tenant store for development and tests
#[derive(Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut tenants: Vec<Tenant>) -> Vec<Tenant> {
    tenants.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.business_number.cmp(&a.business_number))
    });
    tenants
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn create(&self, new: NewTenant) -> Result<Tenant, StoreError> {
        // Holding the write lock across allocation and insert serializes creations
        let mut tenants = self.tenants.write().await;
        let last = tenants.values().map(|t| &t.business_number).max();
        let business_number = BusinessId::next_after(last.map(BusinessId::as_str))?;

        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            business_number,
            name: new.name,
            email: new.email,
            mobile_number: new.mobile_number,
            banner_image: None,
            logo: None,
            review_url: None,
            minimum_rating: 0,
            buttons: Vec::new(),
            social_links: Vec::new(),
            menu_pdf: None,
            hide_review_tab: false,
            status: TenantStatus::Active,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
            analytics: None,
            analytics_version: 0,
        };
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn list(&self) -> Result<Vec<Tenant>, StoreError> {
        Ok(newest_first(self.tenants.read().await.values().cloned().collect()))
    }

    async fn list_active(&self) -> Result<Vec<Tenant>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(newest_first(tenants.values().filter(|t| t.is_active()).cloned().collect()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn find_active_by_business_id(&self, business_id: &BusinessId) -> Result<Option<Tenant>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|t| t.is_active() && t.business_number == *business_id)
            .cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Tenant>, StoreError> {
        let email = email.trim().to_lowercase();
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|t| t.is_active() && t.email.to_lowercase() == email)
            .cloned())
    }

    async fn last_business_id(&self) -> Result<Option<BusinessId>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.values().map(|t| t.business_number.clone()).max())
    }

    async fn update(&self, id: Uuid, patch: TenantPatch) -> Result<Option<Tenant>, StoreError> {
        let mut tenants = self.tenants.write().await;
        let Some(tenant) = tenants.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(tenant);
        tenant.updated_at = Utc::now();
        Ok(Some(tenant.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tenants.write().await.remove(&id).is_some())
    }

    async fn swap_analytics(&self, id: Uuid, expected_version: i64, analytics: &Analytics) -> Result<bool, StoreError> {
        let mut tenants = self.tenants.write().await;
        // Deleted underneath the caller: same answer as a lost race
        let Some(tenant) = tenants.get_mut(&id) else {
            return Ok(false);
        };
        if tenant.analytics_version != expected_version {
            return Ok(false);
        }
        tenant.analytics = Some(analytics.clone());
        tenant.analytics_version += 1;
        tenant.updated_at = Utc::now();
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> NewTenant {
        NewTenant {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            mobile_number: "+10000000000".to_string(),
            created_by: Some("admin@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn allocates_sequential_business_ids() {
        let store = MemoryTenantStore::new();
        let a = store.create(draft("Alpha")).await.unwrap();
        let b = store.create(draft("Beta")).await.unwrap();
        assert_eq!(a.business_number.as_str(), "BIS00001");
        assert_eq!(b.business_number.as_str(), "BIS00002");
        assert_eq!(store.last_business_id().await.unwrap(), Some(b.business_number));
    }

    #[tokio::test]
    async fn concurrent_creations_never_share_an_id() {
        let store = std::sync::Arc::new(MemoryTenantStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(draft(&format!("T{i}"))).await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().business_number);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn stale_analytics_swap_is_refused() {
        let store = MemoryTenantStore::new();
        let tenant = store.create(draft("Gamma")).await.unwrap();

        let mut analytics = Analytics::default();
        analytics.total_visits = 1;
        assert!(store.swap_analytics(tenant.id, 0, &analytics).await.unwrap());
        assert!(!store.swap_analytics(tenant.id, 0, &analytics).await.unwrap());

        let stored = store.get(tenant.id).await.unwrap().unwrap();
        assert_eq!(stored.analytics_version, 1);
    }

    #[tokio::test]
    async fn swap_on_deleted_tenant_is_refused_not_an_error() {
        let store = MemoryTenantStore::new();
        let tenant = store.create(draft("Foxtrot")).await.unwrap();
        store.delete(tenant.id).await.unwrap();

        let swapped = store.swap_analytics(tenant.id, 0, &Analytics::default()).await;
        assert!(matches!(swapped, Ok(false)));
    }

    #[tokio::test]
    async fn inactive_tenants_are_hidden_from_public_lookups() {
        let store = MemoryTenantStore::new();
        let tenant = store.create(draft("Delta")).await.unwrap();
        let patch = TenantPatch { status: Some(TenantStatus::Inactive), ..Default::default() };
        store.update(tenant.id, patch).await.unwrap();

        assert!(store.find_active_by_business_id(&tenant.business_number).await.unwrap().is_none());
        assert!(store.find_active_by_email("DELTA@example.com").await.unwrap().is_none());
        assert!(store.list_active().await.unwrap().is_empty());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_hard() {
        let store = MemoryTenantStore::new();
        let tenant = store.create(draft("Echo")).await.unwrap();
        assert!(store.delete(tenant.id).await.unwrap());
        assert!(!store.delete(tenant.id).await.unwrap());
        assert!(store.get(tenant.id).await.unwrap().is_none());
    }
}
