use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{error, info, instrument, warn};

use crate::{
    app_config::SecurityConfig,
    db::DieselPool,
    models::{User, UserError, UserStatus, UserUpdate},
    services::{email::EmailService, jwt::JwtService},
    utils::{
        password::hash_password,
        service_error::{ServiceError, ServiceResult},
        validation::normalize_email,
    },
};

pub const INVALID_TOKEN_MESSAGE: &str = "Reset password token is invalid or has been expired";

/// A one-time token: the raw value goes to the user, only the hash is stored
#[derive(Debug)]
pub struct TokenInfo {
    pub token: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a cryptographically secure token valid for `ttl`
pub fn generate_token(ttl: Duration) -> TokenInfo {
    // 256 bits of entropy
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token_bytes);

    let token = BASE64_URL_SAFE_NO_PAD.encode(token_bytes);
    let token_hash = hash_token(&token);

    TokenInfo {
        token,
        token_hash,
        expires_at: Utc::now() + ttl,
    }
}

/// SHA-256 hex of a raw token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time lookup of the user holding an unexpired token
pub async fn find_user_by_token(
    conn: &mut AsyncPgConnection,
    token: &str,
) -> Result<Option<User>, UserError> {
    let provided_hash = hash_token(token);
    let candidates = User::with_pending_tokens(conn).await?;

    let mut found = None;
    for user in candidates {
        let Some(stored) = user.reset_password_token.as_deref() else {
            continue;
        };
        if bool::from(provided_hash.as_bytes().ct_eq(stored.as_bytes())) && found.is_none() {
            found = Some(user);
        }
    }
    Ok(found)
}

#[derive(Clone)]
pub struct PasswordResetService {
    pool: DieselPool,
    email_service: EmailService,
    jwt_service: Arc<JwtService>,
    security: SecurityConfig,
}

impl PasswordResetService {
    pub fn new(
        pool: DieselPool,
        email_service: EmailService,
        jwt_service: Arc<JwtService>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            pool,
            email_service,
            jwt_service,
            security,
        }
    }

    /// Store a fresh reset token for the account and email the link
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> ServiceResult<()> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::ValidationError("Email is required".to_string()));
        }

        let ttl_minutes = self.security.reset_token_ttl_minutes;
        let token_info = generate_token(Duration::minutes(i64::from(ttl_minutes)));
        let token_update = UserUpdate::with_token(token_info.token_hash.clone(), token_info.expires_at);

        let mut conn = self.pool.get().await?;
        let user = match User::find_by_email(&mut conn, &email).await {
            Ok(user) => user,
            Err(UserError::NotFound) => {
                info!("Password reset requested for unknown email {}", email);
                return Err(ServiceError::NotFound("User not found".to_string()));
            },
            Err(e) => return Err(e.into()),
        };

        User::update(&mut conn, user.id, &token_update).await?;

        if let Err(e) = self
            .email_service
            .send_password_reset_email(&user.email, &user.full_name(), &token_info.token, ttl_minutes)
            .await
        {
            error!("Failed to send password reset email to user {}: {}", user.id, e);

            // The link never arrived, so the token must not stay usable
            User::update(&mut conn, user.id, &UserUpdate::clear_token()).await?;
            return Err(e.into());
        }

        info!("Password reset token issued for user {}", user.id);
        Ok(())
    }

    /// Set a new password from a reset token and return a login token
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> ServiceResult<String> {
        if password != confirm_password {
            return Err(ServiceError::ValidationError(
                "Password does not match".to_string(),
            ));
        }
        if password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = hash_password(password, self.security.bcrypt_cost)?;
        let mut conn = self.pool.get().await?;
        let password_hash = &password_hash;

        let user = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let user = find_user_by_token(conn, token).await?.ok_or_else(|| {
                        warn!("Password reset attempted with an invalid or expired token");
                        ServiceError::ValidationError(INVALID_TOKEN_MESSAGE.to_string())
                    })?;

                    let update = UserUpdate {
                        password_hash: Some(Some(password_hash.clone())),
                        status: Some(UserStatus::Active),
                        ..UserUpdate::clear_token()
                    };
                    Ok(User::update(conn, user.id, &update).await?)
                })
            })
            .await?;

        info!("Password reset completed for user {}", user.id);
        Ok(self
            .jwt_service
            .generate_access_token(user.id, user.tenant_id, user.role)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let info = generate_token(Duration::minutes(30));

        // 32 bytes base64url without padding
        assert_eq!(info.token.len(), 43);
        assert!(!info.token.contains('='));
        assert!(!info.token.contains('+'));
        assert!(!info.token.contains('/'));

        assert_eq!(info.token_hash.len(), 64);
        assert_eq!(info.token_hash, hash_token(&info.token));
        assert!(info.expires_at > Utc::now() + Duration::minutes(29));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token(Duration::minutes(1));
        let b = generate_token(Duration::minutes(1));
        assert_ne!(a.token, b.token);
        assert_ne!(a.token_hash, b.token_hash);
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
