// Tenant management, SuperAdmin only

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DieselPool;
use crate::models::{
    CreateTenantRequest, ListQuery, PageMeta, SortDirection, Tenant, TenantSortKey,
    UpdateTenantRequest,
};
use crate::schema::tenants;
use crate::utils::service_error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct TenantService {
    pool: DieselPool,
}

impl TenantService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_tenant(&self, request: CreateTenantRequest) -> ServiceResult<Tenant> {
        request.validate()?;
        if request.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Tenant name cannot be empty".to_string(),
            ));
        }

        let mut conn = self.pool.get().await?;
        let tenant = Tenant::create(&mut conn, &request.into_new_tenant()).await?;
        info!("Created tenant {} ({})", tenant.name, tenant.id);
        Ok(tenant)
    }

    #[instrument(skip(self))]
    pub async fn get_tenant(&self, tenant_id: Uuid) -> ServiceResult<Tenant> {
        let mut conn = self.pool.get().await?;
        Ok(Tenant::find_by_id(&mut conn, tenant_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_tenants(&self, query: ListQuery) -> ServiceResult<(Vec<Tenant>, PageMeta)> {
        let page = query.pagination().map_err(ServiceError::ValidationError)?;
        let (key, direction) = query
            .sort::<TenantSortKey>()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;
        let total: i64 = tenants::table.count().get_result(&mut conn).await?;

        let query = tenants::table.into_boxed();
        let query = match (key, direction) {
            (TenantSortKey::CreatedDate, SortDirection::Asc) => query.order(tenants::created_date.asc()),
            (TenantSortKey::CreatedDate, SortDirection::Desc) => query.order(tenants::created_date.desc()),
            (TenantSortKey::Name, SortDirection::Asc) => query.order(tenants::name.asc()),
            (TenantSortKey::Name, SortDirection::Desc) => query.order(tenants::name.desc()),
        };

        let rows: Vec<Tenant> = query
            .then_order_by(tenants::id.asc())
            .limit(page.limit)
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((rows, page.meta(total)))
    }

    #[instrument(skip(self, request))]
    pub async fn update_tenant(
        &self,
        tenant_id: Uuid,
        request: UpdateTenantRequest,
    ) -> ServiceResult<Tenant> {
        request.validate()?;
        if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ServiceError::ValidationError(
                "Tenant name cannot be empty".to_string(),
            ));
        }

        let mut conn = self.pool.get().await?;
        let tenant = Tenant::update(&mut conn, tenant_id, &request.into_update()).await?;
        info!("Updated tenant {}", tenant.id);
        Ok(tenant)
    }

    /// Owned rows are never cascaded; a tenant that still owns data is refused
    #[instrument(skip(self))]
    pub async fn delete_tenant(&self, tenant_id: Uuid) -> ServiceResult<()> {
        let mut conn = self.pool.get().await?;
        Tenant::delete(&mut conn, tenant_id).await?;
        info!("Deleted tenant {}", tenant_id);
        Ok(())
    }
}
