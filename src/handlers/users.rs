// Staff user handlers

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    config::{Action, Resource},
    handlers::response::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::{CreateUserRequest, ListQuery, UpdateProfilePictureRequest, UpdateUserRequest},
    utils::service_error::ServiceError,
};

/// Invite a user to the caller's tenant
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User invited", body = UserResponse),
        (status = 403, description = "Admins only, or role not assignable"),
        (status = 409, description = "Username or email already in use")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Users, Action::Create)?;
    let user = state.user_service.create_user(&auth_user, request).await?;
    Ok(ApiResponse::created(user))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(ListQuery),
    responses(
        (status = 200, description = "Users of the tenant", body = [UserResponse]),
        (status = 403, description = "Admins only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Users, Action::List)?;
    let (users, meta) = state
        .user_service
        .list_users(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::paged(users, meta))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Neither self nor admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Users, Action::Read)?;
    let user = state.user_service.get_user(&auth_user, id).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Neither self nor admin, or role/status change by non-admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Users, Action::Update)?;
    let user = state.user_service.update_user(&auth_user, id, request).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    put,
    path = "/users/profile-picture/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateProfilePictureRequest,
    responses(
        (status = 200, description = "Profile picture updated", body = UserResponse),
        (status = 400, description = "Not a valid URL"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_profile_picture(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfilePictureRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Users, Action::Update)?;
    let user = state
        .user_service
        .update_profile_picture(&auth_user, id, request)
        .await?;
    Ok(ApiResponse::ok(user))
}
