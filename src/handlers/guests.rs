// Guest registry handlers

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
    models::{CreateGuestRequest, ListQuery, SearchGuestsQuery},
    utils::service_error::ServiceError,
};

/// Create a guest, or update the tenant's guest with the same email
#[utoipa::path(
    post,
    path = "/guests",
    tag = "Guests",
    request_body = CreateGuestRequest,
    responses(
        (status = 200, description = "Guest created or updated", body = Guest),
        (status = 400, description = "Missing email or invalid fields"),
        (status = 403, description = "Foreign tenant")
    ),
    security(("bearerAuth" = []))
)]
pub async fn upsert_guest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<CreateGuestRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::Create)?;
    let tenant = auth_user.effective_tenant(request.tenant_id)?;
    let guest = state.guest_service.upsert_guest(tenant, request).await?;
    Ok(ApiResponse::ok(guest))
}

#[utoipa::path(
    get,
    path = "/guests",
    tag = "Guests",
    params(ListQuery),
    responses((status = 200, description = "Guests with their reservations", body = [GuestWithReservations])),
    security(("bearerAuth" = []))
)]
pub async fn list_guests(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::List)?;
    let (guests, meta) = state
        .guest_service
        .list_guests(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::paged(guests, meta))
}

#[utoipa::path(
    get,
    path = "/guests/search",
    tag = "Guests",
    params(SearchGuestsQuery),
    responses(
        (status = 200, description = "Matching guests, first name descending", body = [Guest]),
        (status = 400, description = "Missing search query")
    ),
    security(("bearerAuth" = []))
)]
pub async fn search_guests(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<SearchGuestsQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::List)?;
    let guests = state
        .guest_service
        .search_guests(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::ok(guests))
}

/// Guests on active reservations, one row per guest
#[utoipa::path(
    get,
    path = "/guests/current",
    tag = "Guests",
    params(ListQuery),
    responses((status = 200, description = "Current guests", body = [CurrentGuest])),
    security(("bearerAuth" = []))
)]
pub async fn current_guests(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::List)?;
    let (guests, meta) = state
        .reservation_service
        .current_guests(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::paged(guests, meta))
}

#[utoipa::path(
    get,
    path = "/guests/{id}",
    tag = "Guests",
    params(("id" = Uuid, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "Guest", body = Guest),
        (status = 404, description = "Guest not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_guest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::Read)?;
    let guest = state.guest_service.get_guest(auth_user.tenant_id, id).await?;
    Ok(ApiResponse::ok(guest))
}

/// Upcoming and current stays of a guest
#[utoipa::path(
    get,
    path = "/guests/{id}/reservations",
    tag = "Guests",
    params(("id" = Uuid, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "Guest with reservations that have not checked out", body = GuestWithReservations),
        (status = 404, description = "Guest not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn guest_reservations(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::Read)?;
    let guest = state
        .guest_service
        .guest_with_reservations(auth_user.tenant_id, id)
        .await?;
    Ok(ApiResponse::ok(guest))
}

/// Delete a guest and its reservation links; reservations stay
#[utoipa::path(
    delete,
    path = "/guests/{id}",
    tag = "Guests",
    params(("id" = Uuid, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "Guest deleted"),
        (status = 404, description = "Guest not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_guest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Guests, Action::Delete)?;
    state
        .guest_service
        .delete_guest(auth_user.tenant_id, id)
        .await?;
    Ok(ApiResponse::ok(json!({ "id": id })))
}
