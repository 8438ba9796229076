use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::models::{
    ActionButton, Analytics, BusinessId, NewTenant, SocialLink, Tenant, TenantPatch, TenantStatus,
};
use super::store::{StoreError, TenantStore};

const TENANT_COLUMNS: &str = r#"
    id, business_number, name, email, mobile_number,
    banner_image, logo, review_url, minimum_rating,
    buttons, social_links, menu_pdf, hide_review_tab, status,
    created_by, created_at, updated_at, analytics, analytics_version
"#;

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    business_number: String,
    name: String,
    email: String,
    mobile_number: String,
    banner_image: Option<String>,
    logo: Option<String>,
    review_url: Option<String>,
    minimum_rating: i16,
    buttons: Json<Vec<ActionButton>>,
    social_links: Json<Vec<SocialLink>>,
    menu_pdf: Option<String>,
    hide_review_tab: bool,
    status: String,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    analytics: Option<Json<Analytics>>,
    analytics_version: i64,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = StoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let business_number = row.business_number.parse::<BusinessId>().map_err(|e| StoreError::Corrupt {
            id: row.id,
            reason: e.to_string(),
        })?;
        let minimum_rating = u8::try_from(row.minimum_rating).map_err(|_| StoreError::Corrupt {
            id: row.id,
            reason: format!("minimum_rating {} out of range", row.minimum_rating),
        })?;

        Ok(Tenant {
            id: row.id,
            business_number,
            name: row.name,
            email: row.email,
            mobile_number: row.mobile_number,
            banner_image: row.banner_image,
            logo: row.logo,
            review_url: row.review_url,
            minimum_rating,
            buttons: row.buttons.0,
            social_links: row.social_links.0,
            menu_pdf: row.menu_pdf,
            hide_review_tab: row.hide_review_tab,
            status: TenantStatus::parse(&row.status),
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            analytics: row.analytics.map(|a| a.0),
            analytics_version: row.analytics_version,
        })
    }
}

fn into_tenants(rows: Vec<TenantRow>) -> Result<Vec<Tenant>, StoreError> {
    rows.into_iter().map(Tenant::try_from).collect()
}

/// Tenant store backed by a single PostgreSQL `tenants` table
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, bind: &str) -> Result<Option<Tenant>, StoreError> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE {clause} LIMIT 1");
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tenant::try_from).transpose()
    }

    async fn lock_for_update(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        row.map(Tenant::try_from).transpose()
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what.to_string()),
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn create(&self, new: NewTenant) -> Result<Tenant, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Blocks other creators until commit; readers are unaffected
        sqlx::query("LOCK TABLE tenants IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let last: Option<String> =
            sqlx::query_scalar("SELECT business_number FROM tenants ORDER BY business_number DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?;
        let business_number = BusinessId::next_after(last.as_deref())?;

        let sql = format!(
            r#"
            INSERT INTO tenants (id, business_number, name, email, mobile_number, status, created_by)
            VALUES ($1, $2, $3, $4, $5, 'active', $6)
            RETURNING {TENANT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(business_number.as_str())
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.mobile_number)
            .bind(&new.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, business_number.as_str()))?;

        tx.commit().await?;
        Tenant::try_from(row)
    }

    async fn list(&self) -> Result<Vec<Tenant>, StoreError> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at DESC, business_number DESC");
        let rows = sqlx::query_as::<_, TenantRow>(&sql).fetch_all(&self.pool).await?;
        into_tenants(rows)
    }

    async fn list_active(&self) -> Result<Vec<Tenant>, StoreError> {
        let sql = format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE status = 'active' ORDER BY created_at DESC, business_number DESC"
        );
        let rows = sqlx::query_as::<_, TenantRow>(&sql).fetch_all(&self.pool).await?;
        into_tenants(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1");
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tenant::try_from).transpose()
    }

    async fn find_active_by_business_id(&self, business_id: &BusinessId) -> Result<Option<Tenant>, StoreError> {
        self.fetch_one_where("business_number = $1 AND status = 'active'", business_id.as_str())
            .await
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Tenant>, StoreError> {
        self.fetch_one_where("lower(email) = lower($1) AND status = 'active'", email.trim())
            .await
    }

    async fn last_business_id(&self) -> Result<Option<BusinessId>, StoreError> {
        let last: Option<String> =
            sqlx::query_scalar("SELECT business_number FROM tenants ORDER BY business_number DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(last.and_then(|s| s.parse().ok()))
    }

    async fn update(&self, id: Uuid, patch: TenantPatch) -> Result<Option<Tenant>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut tenant) = Self::lock_for_update(&mut tx, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut tenant);

        let sql = format!(
            r#"
            UPDATE tenants SET
                name = $2, email = $3, mobile_number = $4,
                banner_image = $5, logo = $6, review_url = $7, minimum_rating = $8,
                buttons = $9, social_links = $10, menu_pdf = $11, hide_review_tab = $12,
                status = $13, updated_at = now()
            WHERE id = $1
            RETURNING {TENANT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(id)
            .bind(&tenant.name)
            .bind(&tenant.email)
            .bind(&tenant.mobile_number)
            .bind(&tenant.banner_image)
            .bind(&tenant.logo)
            .bind(&tenant.review_url)
            .bind(i16::from(tenant.minimum_rating))
            .bind(Json(&tenant.buttons))
            .bind(Json(&tenant.social_links))
            .bind(&tenant.menu_pdf)
            .bind(tenant.hide_review_tab)
            .bind(tenant.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Tenant::try_from(row).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn swap_analytics(&self, id: Uuid, expected_version: i64, analytics: &Analytics) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET analytics = $3, analytics_version = analytics_version + 1, updated_at = now()
            WHERE id = $1 AND analytics_version = $2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(Json(analytics))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
