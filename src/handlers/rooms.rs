// Room inventory handlers

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    app::AppState,
    config::{Action, Resource},
    handlers::response::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::{CreateRoomRequest, ListQuery, UpdateRoomRequest},
    utils::service_error::ServiceError,
};

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "Rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 409, description = "Room number already exists")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_room(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Rooms, Action::Create)?;
    let tenant = auth_user.effective_tenant(request.tenant_id)?;
    let room = state.room_service.create_room(tenant, request).await?;
    Ok(ApiResponse::created(room))
}

#[utoipa::path(
    get,
    path = "/rooms",
    tag = "Rooms",
    params(ListQuery),
    responses((status = 200, description = "Rooms of the tenant", body = [Room])),
    security(("bearerAuth" = []))
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Rooms, Action::List)?;
    let (rooms, meta) = state
        .room_service
        .list_rooms(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::paged(rooms, meta))
}

#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room", body = Room),
        (status = 404, description = "Room not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_room(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Rooms, Action::Read)?;
    let room = state.room_service.get_room(auth_user.tenant_id, id).await?;
    Ok(ApiResponse::ok(room))
}

#[utoipa::path(
    put,
    path = "/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room number already exists")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_room(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Rooms, Action::Update)?;
    let room = state
        .room_service
        .update_room(auth_user.tenant_id, id, request)
        .await?;
    Ok(ApiResponse::ok(room))
}

#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room deleted"),
        (status = 404, description = "Room not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_room(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Rooms, Action::Delete)?;
    state.room_service.delete_room(auth_user.tenant_id, id).await?;
    Ok(ApiResponse::ok(json!({ "id": id })))
}
