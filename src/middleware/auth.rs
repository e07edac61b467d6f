// Authenticated identity attached to every protected request

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::permissions::{Action, PermissionConfig, Resource};
use crate::models::auth::AccessTokenClaims;
use crate::models::user::Role;
use crate::utils::service_error::{ServiceError, ServiceResult};

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub token_id: String,
    pub exp: u64,
}

impl TryFrom<AccessTokenClaims> for AuthenticatedUser {
    type Error = ServiceError;

    fn try_from(claims: AccessTokenClaims) -> Result<Self, Self::Error> {
        let invalid = |_| ServiceError::Unauthorized("Invalid or expired token".to_string());
        Ok(Self {
            user_id: claims.user_id().map_err(invalid)?,
            tenant_id: claims.tenant_uuid().map_err(invalid)?,
            role: claims.role,
            token_id: claims.jti,
            exp: claims.exp,
        })
    }
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Forbidden unless the role may perform `action` on `resource`
    pub fn require(&self, resource: Resource, action: Action) -> ServiceResult<()> {
        if PermissionConfig::is_allowed(self.role, resource, action) {
            Ok(())
        } else {
            tracing::warn!(
                "User {} ({}) denied {:?} on {:?}",
                self.user_id,
                self.role,
                action,
                resource
            );
            Err(ServiceError::forbidden())
        }
    }

    /// Tenant a request acts on: an explicit tenant is only honoured for
    /// SuperAdmins; anyone else naming a foreign tenant is refused
    pub fn effective_tenant(&self, requested: Option<Uuid>) -> ServiceResult<Uuid> {
        match requested {
            None => Ok(self.tenant_id),
            Some(tenant) if tenant == self.tenant_id => Ok(tenant),
            Some(tenant) if self.is_super_admin() => Ok(tenant),
            Some(_) => Err(ServiceError::Forbidden(
                "You cannot act on another tenant".to_string(),
            )),
        }
    }

    /// Self, an admin of the same tenant, or any SuperAdmin
    pub fn can_manage_user(&self, user_id: Uuid, user_tenant: Uuid) -> bool {
        self.user_id == user_id
            || self.is_super_admin()
            || (self.is_admin() && self.tenant_id == user_tenant)
    }
}
