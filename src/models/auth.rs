// Authentication models
// Claims carried by every access token issued at login

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::user::Role;

/// Access token claims structure
/// Identifies the user, the tenant scope and the role used for authorization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// Tenant the user belongs to
    pub tenant_id: String,

    /// Role at the time the token was issued
    pub role: Role,

    /// JWT ID (UUID format)
    pub jti: String,

    /// Audience (aud)
    pub aud: String,

    /// Issuer (iss)
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

impl AccessTokenClaims {
    /// Create new access token claims
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        tenant_id: Uuid,
        role: Role,
        audience: String,
        issuer: String,
        issued_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            aud: audience,
            iss: issuer,
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Parse the tenant scope
    pub fn tenant_uuid(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.tenant_id)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.exp <= now
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({"username": "frontdesk1", "password": "correct-horse-battery"}))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
}

/// Body of `PUT /password/reset/{token}`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}
