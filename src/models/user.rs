// User Database Model
// Staff accounts: invited by an admin, activated through a registration token

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::users;

/// Role enumeration used for route authorization
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum Role {
    SuperAdmin,
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        }
    }

    /// Admins and super admins manage staff
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Whether a holder of this role may hand out `other`
    pub fn can_assign(&self, other: Role) -> bool {
        match self {
            Role::SuperAdmin => true,
            Role::Admin => other != Role::SuperAdmin,
            Role::Employee => false,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SuperAdmin" => Ok(Role::SuperAdmin),
            "Admin" => Ok(Role::Admin),
            "Employee" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

text_column_enum!(Role);

/// Account lifecycle
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum UserStatus {
    Invited,
    Active,
    Disabled,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Invited => "Invited",
            UserStatus::Active => "Active",
            UserStatus::Disabled => "Disabled",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Invited" => Ok(UserStatus::Invited),
            "Active" => Ok(UserStatus::Active),
            "Disabled" => Ok(UserStatus::Disabled),
            _ => Err(format!("Invalid user status: {}", s)),
        }
    }
}

text_column_enum!(UserStatus);

/// User database model - queryable from database
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub email: String,
    pub phone_number: Option<String>,
    pub preferences: Option<serde_json::Value>,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
    pub status: UserStatus,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub tenant_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub email: String,
    pub phone_number: Option<String>,
    pub preferences: Option<serde_json::Value>,
    pub status: UserStatus,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTime<Utc>>,
}

/// User update struct
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub preferences: Option<Option<serde_json::Value>>,
    pub password_hash: Option<Option<String>>,
    pub profile_image: Option<Option<String>>,
    pub status: Option<UserStatus>,
    pub reset_password_token: Option<Option<String>>,
    pub reset_password_expires: Option<Option<DateTime<Utc>>>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl UserUpdate {
    /// Changeset that stores a new token hash and expiry
    pub fn with_token(hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            reset_password_token: Some(Some(hash)),
            reset_password_expires: Some(Some(expires_at)),
            updated_date: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Changeset that clears any outstanding token
    pub fn clear_token() -> Self {
        Self {
            reset_password_token: Some(None),
            reset_password_expires: Some(None),
            updated_date: Some(Utc::now()),
            ..Default::default()
        }
    }
}

/// Errors for user operations
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("User not found")]
    NotFound,

    #[error("Username or email already in use")]
    Duplicate,
}

fn map_user_error(e: diesel::result::Error) -> UserError {
    match e {
        diesel::result::Error::NotFound => UserError::NotFound,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => UserError::Duplicate,
        _ => UserError::Database(e),
    }
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(conn: &mut AsyncPgConnection, user_id: Uuid) -> Result<Self, UserError> {
        users::table
            .find(user_id)
            .first::<User>(conn)
            .await
            .map_err(map_user_error)
    }

    pub async fn find_by_username(
        conn: &mut AsyncPgConnection,
        username: &str,
    ) -> Result<Self, UserError> {
        users::table
            .filter(users::username.eq(username))
            .first::<User>(conn)
            .await
            .map_err(map_user_error)
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(conn: &mut AsyncPgConnection, email: &str) -> Result<Self, UserError> {
        use diesel::PgTextExpressionMethods;

        users::table
            .filter(users::email.ilike(email))
            .first::<User>(conn)
            .await
            .map_err(map_user_error)
    }

    pub async fn username_or_email_taken(
        conn: &mut AsyncPgConnection,
        username: &str,
        email: &str,
    ) -> Result<bool, UserError> {
        let count: i64 = users::table
            .filter(users::username.eq(username).or(users::email.eq(email)))
            .count()
            .get_result(conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn email_taken(
        conn: &mut AsyncPgConnection,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<bool, UserError> {
        let mut query = users::table.filter(users::email.eq(email)).into_boxed();
        if let Some(user_id) = except {
            query = query.filter(users::id.ne(user_id));
        }

        let count: i64 = query.count().get_result(conn).await?;
        Ok(count > 0)
    }

    /// Users holding an unexpired reset or registration token
    pub async fn with_pending_tokens(conn: &mut AsyncPgConnection) -> Result<Vec<Self>, UserError> {
        users::table
            .filter(users::reset_password_token.is_not_null())
            .filter(users::reset_password_expires.gt(Utc::now()))
            .load::<User>(conn)
            .await
            .map_err(UserError::Database)
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_user: &NewUser) -> Result<Self, UserError> {
        diesel::insert_into(users::table)
            .values(new_user)
            .get_result::<User>(conn)
            .await
            .map_err(map_user_error)
    }

    /// Update user
    pub async fn update(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        update: &UserUpdate,
    ) -> Result<Self, UserError> {
        diesel::update(users::table.find(user_id))
            .set(update)
            .get_result::<User>(conn)
            .await
            .map_err(map_user_error)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()-]{5,50}$").unwrap();
}

/// Public view of a user, without secrets
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub email: String,
    pub phone_number: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
    pub profile_image: Option<String>,
    pub status: UserStatus,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            email: user.email,
            phone_number: user.phone_number,
            preferences: user.preferences,
            profile_image: user.profile_image,
            status: user.status,
            created_date: user.created_date,
            updated_date: user.updated_date,
        }
    }
}

/// Request to invite a staff member
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "username": "frontdesk1",
    "first_name": "Sam",
    "last_name": "Rivera",
    "email": "sam@seaside.example",
    "role": "Employee"
}))]
pub struct CreateUserRequest {
    /// Only honoured for SuperAdmin callers
    pub tenant_id: Option<Uuid>,

    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    #[validate(regex(
        path = "USERNAME_REGEX",
        message = "Username can only contain letters, numbers, dots, hyphens and underscores"
    ))]
    pub username: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: Role,

    #[validate(regex(path = "PHONE_REGEX", message = "Invalid phone number"))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CompleteRegistrationRequest {
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(regex(path = "PHONE_REGEX", message = "Invalid phone number"))]
    pub phone_number: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = "PHONE_REGEX", message = "Invalid phone number"))]
    pub phone_number: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,

    /// Admin only
    pub role: Option<Role>,

    /// Admin only
    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    pub fn touches_admin_fields(&self) -> bool {
        self.role.is_some() || self.status.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePictureRequest {
    #[validate(url(message = "Profile image must be a valid URL"))]
    #[validate(length(max = 2048, message = "Profile image URL must be less than 2048 characters"))]
    pub profile_image: String,
}

/// Sort keys accepted by `GET /users`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortKey {
    #[default]
    CreatedDate,
    Username,
    LastName,
}

impl FromStr for UserSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_date" => Ok(UserSortKey::CreatedDate),
            "username" => Ok(UserSortKey::Username),
            "last_name" => Ok(UserSortKey::LastName),
            _ => Err(format!("Invalid sort key for users: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(Role::SuperAdmin.as_str(), "SuperAdmin");
        assert_eq!(Role::from_str("Admin"), Ok(Role::Admin));
        assert_eq!(Role::from_str("Employee"), Ok(Role::Employee));
        assert!(Role::from_str("admin").is_err());
        assert_eq!(Role::Employee.to_string(), "Employee");
    }

    #[test]
    fn test_role_assignment_rules() {
        assert!(Role::SuperAdmin.can_assign(Role::SuperAdmin));
        assert!(Role::Admin.can_assign(Role::Employee));
        assert!(Role::Admin.can_assign(Role::Admin));
        assert!(!Role::Admin.can_assign(Role::SuperAdmin));
        assert!(!Role::Employee.can_assign(Role::Employee));
    }

    #[test]
    fn test_user_status_conversion() {
        assert_eq!(UserStatus::from_str("Invited"), Ok(UserStatus::Invited));
        assert_eq!(UserStatus::Active.as_str(), "Active");
        assert!(UserStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_create_user_validation() {
        let mut request = CreateUserRequest {
            tenant_id: None,
            username: "frontdesk1".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Rivera".to_string(),
            email: "sam@seaside.example".to_string(),
            role: Role::Employee,
            phone_number: Some("+1 (555) 010-0100".to_string()),
        };
        assert!(request.validate().is_ok());

        request.username = "bad name!".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_token_changesets() {
        let expires = Utc::now();
        let set = UserUpdate::with_token("abc".to_string(), expires);
        assert_eq!(set.reset_password_token, Some(Some("abc".to_string())));
        assert_eq!(set.reset_password_expires, Some(Some(expires)));

        let cleared = UserUpdate::clear_token();
        assert_eq!(cleared.reset_password_token, Some(None));
        assert_eq!(cleared.reset_password_expires, Some(None));
        assert!(cleared.password_hash.is_none());
    }
}
