// Staff accounts
// Users are invited without a password and finish registration through an
// emailed, time-limited token

use chrono::{Duration, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app_config::SecurityConfig;
use crate::db::{DieselConn, DieselPool};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CompleteRegistrationRequest, CreateUserRequest, ListQuery, NewUser, PageMeta, SortDirection,
    Tenant, UpdateProfilePictureRequest, UpdateUserRequest, User, UserResponse, UserSortKey,
    UserStatus, UserUpdate,
};
use crate::schema::users;
use crate::services::email::EmailService;
use crate::services::password_reset::{find_user_by_token, generate_token, INVALID_TOKEN_MESSAGE};
use crate::utils::password::hash_password;
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::{normalize_email, normalize_optional, trim_required};

fn sorted(
    query: users::BoxedQuery<'static, Pg>,
    key: UserSortKey,
    direction: SortDirection,
) -> users::BoxedQuery<'static, Pg> {
    use SortDirection::{Asc, Desc};

    let query = match (key, direction) {
        (UserSortKey::CreatedDate, Asc) => query.order(users::created_date.asc()),
        (UserSortKey::CreatedDate, Desc) => query.order(users::created_date.desc()),
        (UserSortKey::Username, Asc) => query.order(users::username.asc()),
        (UserSortKey::Username, Desc) => query.order(users::username.desc()),
        (UserSortKey::LastName, Asc) => query.order(users::last_name.asc()),
        (UserSortKey::LastName, Desc) => query.order(users::last_name.desc()),
    };
    query.then_order_by(users::id.asc())
}

#[derive(Clone)]
pub struct UserService {
    pool: DieselPool,
    email_service: EmailService,
    security: SecurityConfig,
}

impl UserService {
    pub fn new(pool: DieselPool, email_service: EmailService, security: SecurityConfig) -> Self {
        Self {
            pool,
            email_service,
            security,
        }
    }

    /// Invite a staff member; the account stays `Invited` until registration completes
    #[instrument(skip(self, actor, request), fields(actor = %actor.user_id))]
    pub async fn create_user(
        &self,
        actor: &AuthenticatedUser,
        request: CreateUserRequest,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;

        if !actor.is_admin() {
            return Err(ServiceError::forbidden());
        }
        if !actor.role.can_assign(request.role) {
            warn!("User {} tried to create a {}", actor.user_id, request.role);
            return Err(ServiceError::Forbidden(format!(
                "You cannot create users with role {}",
                request.role
            )));
        }

        let tenant = actor.effective_tenant(request.tenant_id)?;
        let username = trim_required(&request.username, "Username").map_err(ServiceError::ValidationError)?;
        let email = normalize_email(&request.email);

        let mut conn = self.pool.get().await?;
        Tenant::find_by_id(&mut conn, tenant).await?;

        if User::username_or_email_taken(&mut conn, &username, &email).await? {
            return Err(ServiceError::Conflict(
                "Username or email already in use".to_string(),
            ));
        }

        let ttl_hours = self.security.invitation_ttl_hours;
        let invitation = generate_token(Duration::hours(i64::from(ttl_hours)));

        let user = User::create(
            &mut conn,
            &NewUser {
                tenant_id: tenant,
                username,
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                role: request.role,
                email,
                phone_number: normalize_optional(request.phone_number),
                preferences: None,
                status: UserStatus::Invited,
                reset_password_token: Some(invitation.token_hash.clone()),
                reset_password_expires: Some(invitation.expires_at),
            },
        )
        .await?;

        if let Err(e) = self
            .email_service
            .send_invitation_email(
                &user.email,
                &user.full_name(),
                &user.username,
                &invitation.token,
                ttl_hours,
            )
            .await
        {
            // The account exists either way; an admin can re-invite later
            error!("Failed to send invitation email to user {}: {}", user.id, e);
        }

        info!("Invited user {} ({}) to tenant {}", user.username, user.id, tenant);
        Ok(user.into())
    }

    /// Set the password of an invited user from the registration token
    #[instrument(skip_all)]
    pub async fn complete_registration(
        &self,
        token: &str,
        request: CompleteRegistrationRequest,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;

        let password_hash = hash_password(&request.password, self.security.bcrypt_cost)?;
        let mut conn = self.pool.get().await?;
        let password_hash = &password_hash;
        let request = &request;

        let user = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let user = find_user_by_token(conn, token).await?.ok_or_else(|| {
                        warn!("Registration attempted with an invalid or expired token");
                        ServiceError::ValidationError(INVALID_TOKEN_MESSAGE.to_string())
                    })?;

                    if user.status == UserStatus::Disabled {
                        return Err(ServiceError::Forbidden("Account is disabled".to_string()));
                    }

                    let update = UserUpdate {
                        password_hash: Some(Some(password_hash.clone())),
                        status: Some(UserStatus::Active),
                        phone_number: normalize_optional(request.phone_number.clone()).map(Some),
                        preferences: request.preferences.clone().map(Some),
                        ..UserUpdate::clear_token()
                    };
                    Ok(User::update(conn, user.id, &update).await?)
                })
            })
            .await?;

        info!("User {} completed registration", user.id);
        Ok(user.into())
    }

    async fn load_managed(
        &self,
        actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> ServiceResult<(User, DieselConn<'_>)> {
        let mut conn = self.pool.get().await?;
        let user = User::find_by_id(&mut conn, user_id).await?;

        // Users of other tenants are invisible rather than forbidden
        if !actor.is_super_admin() && user.tenant_id != actor.tenant_id {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        if !actor.can_manage_user(user.id, user.tenant_id) {
            return Err(ServiceError::forbidden());
        }
        Ok((user, conn))
    }

    #[instrument(skip(self, actor))]
    pub async fn get_user(&self, actor: &AuthenticatedUser, user_id: Uuid) -> ServiceResult<UserResponse> {
        let (user, _) = self.load_managed(actor, user_id).await?;
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        tenant: Uuid,
        query: ListQuery,
    ) -> ServiceResult<(Vec<UserResponse>, PageMeta)> {
        let page = query.pagination().map_err(ServiceError::ValidationError)?;
        let (key, direction) = query
            .sort::<UserSortKey>()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;

        let total: i64 = users::table
            .filter(users::tenant_id.eq(tenant))
            .count()
            .get_result(&mut conn)
            .await?;

        let base = users::table.filter(users::tenant_id.eq(tenant)).into_boxed();
        let rows: Vec<User> = sorted(base, key, direction)
            .limit(page.limit)
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((rows.into_iter().map(UserResponse::from).collect(), page.meta(total)))
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;

        if request.touches_admin_fields() && !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only admins can change role or status".to_string(),
            ));
        }
        if let Some(role) = request.role {
            if !actor.role.can_assign(role) {
                return Err(ServiceError::Forbidden(format!(
                    "You cannot assign role {}",
                    role
                )));
            }
        }

        let (user, mut conn) = self.load_managed(actor, user_id).await?;

        let email = request.email.as_deref().map(normalize_email);
        if let Some(email) = email.as_deref() {
            if email != user.email && User::email_taken(&mut conn, email, Some(user.id)).await? {
                return Err(ServiceError::Conflict("Email already in use".to_string()));
            }
        }

        let update = UserUpdate {
            first_name: request.first_name.map(|n| n.trim().to_string()),
            last_name: request.last_name.map(|n| n.trim().to_string()),
            role: request.role,
            email,
            phone_number: request.phone_number.map(|p| normalize_optional(Some(p))),
            preferences: request.preferences.map(Some),
            status: request.status,
            updated_date: Some(Utc::now()),
            ..Default::default()
        };

        let updated = User::update(&mut conn, user.id, &update).await?;
        info!("User {} updated by {}", updated.id, actor.user_id);
        Ok(updated.into())
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update_profile_picture(
        &self,
        actor: &AuthenticatedUser,
        user_id: Uuid,
        request: UpdateProfilePictureRequest,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;
        let (user, mut conn) = self.load_managed(actor, user_id).await?;

        let update = UserUpdate {
            profile_image: Some(Some(request.profile_image.trim().to_string())),
            updated_date: Some(Utc::now()),
            ..Default::default()
        };
        let updated = User::update(&mut conn, user.id, &update).await?;
        Ok(updated.into())
    }
}
