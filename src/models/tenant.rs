// Tenant Database Model

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::tenants;

pub const DEFAULT_MEMBERSHIP: &str = "Basic";
pub const DEFAULT_TENANT_STATUS: &str = "Active";

/// Tenant database model
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub membership: String,
    pub status: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tenants)]
pub struct NewTenant {
    pub name: String,
    pub membership: String,
    pub status: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tenants)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub membership: Option<String>,
    pub status: Option<String>,
    pub updated_date: DateTime<Utc>,
}

/// Errors for tenant operations
#[derive(thiserror::Error, Debug)]
pub enum TenantError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Tenant not found")]
    NotFound,

    #[error("Tenant still owns users, guests, rooms or reservations")]
    StillReferenced,
}

impl Tenant {
    pub async fn find_by_id(conn: &mut AsyncPgConnection, tenant_id: Uuid) -> Result<Self, TenantError> {
        tenants::table
            .find(tenant_id)
            .first::<Tenant>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TenantError::NotFound,
                _ => TenantError::Database(e),
            })
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_tenant: &NewTenant) -> Result<Self, TenantError> {
        diesel::insert_into(tenants::table)
            .values(new_tenant)
            .get_result::<Tenant>(conn)
            .await
            .map_err(TenantError::Database)
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        tenant_id: Uuid,
        update: &TenantUpdate,
    ) -> Result<Self, TenantError> {
        diesel::update(tenants::table.find(tenant_id))
            .set(update)
            .get_result::<Tenant>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TenantError::NotFound,
                _ => TenantError::Database(e),
            })
    }

    /// Raw row removal; owned rows are not cleaned up and block the delete
    pub async fn delete(conn: &mut AsyncPgConnection, tenant_id: Uuid) -> Result<(), TenantError> {
        let deleted = diesel::delete(tenants::table.find(tenant_id))
            .execute(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => TenantError::StillReferenced,
                _ => TenantError::Database(e),
            })?;

        if deleted == 0 {
            return Err(TenantError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "Seaside Inn", "membership": "Premium"}))]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 255, message = "Tenant name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Membership must be 1-50 characters"))]
    pub membership: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Status must be 1-50 characters"))]
    pub status: Option<String>,
}

impl CreateTenantRequest {
    pub fn into_new_tenant(self) -> NewTenant {
        NewTenant {
            name: self.name.trim().to_string(),
            membership: self
                .membership
                .unwrap_or_else(|| DEFAULT_MEMBERSHIP.to_string()),
            status: self.status.unwrap_or_else(|| DEFAULT_TENANT_STATUS.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 255, message = "Tenant name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Membership must be 1-50 characters"))]
    pub membership: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Status must be 1-50 characters"))]
    pub status: Option<String>,
}

impl UpdateTenantRequest {
    pub fn into_update(self) -> TenantUpdate {
        TenantUpdate {
            name: self.name.map(|n| n.trim().to_string()),
            membership: self.membership,
            status: self.status,
            updated_date: Utc::now(),
        }
    }
}

/// Sort keys accepted by `GET /tenants`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TenantSortKey {
    #[default]
    CreatedDate,
    Name,
}

impl FromStr for TenantSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_date" => Ok(TenantSortKey::CreatedDate),
            "name" => Ok(TenantSortKey::Name),
            _ => Err(format!("Invalid sort key for tenants: {}", s)),
        }
    }
}
