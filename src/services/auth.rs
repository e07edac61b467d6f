// Login with username and password
// Every credential failure produces the same message so usernames cannot be probed

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::db::DieselPool;
use crate::models::{LoginRequest, User, UserError, UserResponse, UserStatus};
use crate::services::jwt::JwtService;
use crate::utils::password::verify_password;
use crate::utils::service_error::{ServiceError, ServiceResult};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Token plus the user it was issued for
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Clone)]
pub struct AuthService {
    pool: DieselPool,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(pool: DieselPool, jwt_service: Arc<JwtService>) -> Self {
        Self { pool, jwt_service }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginOutcome> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(ServiceError::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        let mut conn = self.pool.get().await?;
        let user = match User::find_by_username(&mut conn, username).await {
            Ok(user) => user,
            Err(UserError::NotFound) => {
                info!("Login attempt for unknown username");
                return Err(invalid_credentials());
            },
            Err(e) => return Err(e.into()),
        };

        // Invited users have no password yet
        let Some(hash) = user.password_hash.as_deref() else {
            info!("Login attempt for user {} before registration", user.id);
            return Err(invalid_credentials());
        };

        if !verify_password(&request.password, hash)? {
            warn!("Failed login for user {}", user.id);
            return Err(invalid_credentials());
        }

        if user.status == UserStatus::Disabled {
            warn!("Login attempt for disabled user {}", user.id);
            return Err(ServiceError::Forbidden("Account is disabled".to_string()));
        }

        let token = self.issue_token(&user)?;
        info!("User {} logged in", user.id);
        Ok(LoginOutcome {
            token,
            user: user.into(),
        })
    }

    pub fn issue_token(&self, user: &User) -> ServiceResult<String> {
        Ok(self
            .jwt_service
            .generate_access_token(user.id, user.tenant_id, user.role)?)
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string())
}
