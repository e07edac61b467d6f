// Reservation engine handlers

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
    models::{AnalyticsQuery, CalendarQuery, CreateReservationRequest, ListQuery},
    utils::service_error::ServiceError,
};

/// Book rooms for a primary guest and any additional guests
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetail),
        (status = 400, description = "Invalid dates, amount or rooms"),
        (status = 404, description = "Primary guest, additional guest or room not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<CreateReservationRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Reservations, Action::Create)?;
    let reservation = state
        .reservation_service
        .create_reservation(auth_user.tenant_id, request)
        .await?;
    Ok(ApiResponse::created(reservation))
}

#[utoipa::path(
    get,
    path = "/reservations",
    tag = "Reservations",
    params(ListQuery),
    responses((status = 200, description = "Reservations of the tenant", body = [Reservation])),
    security(("bearerAuth" = []))
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Reservations, Action::List)?;
    let (reservations, meta) = state
        .reservation_service
        .list_reservations(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::paged(reservations, meta))
}

#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation with its guests", body = ReservationDetail),
        (status = 404, description = "Reservation not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Reservations, Action::Read)?;
    let reservation = state
        .reservation_service
        .get_reservation(auth_user.tenant_id, id)
        .await?;
    Ok(ApiResponse::ok(reservation))
}

/// Reservations checking in during a month of the business calendar
#[utoipa::path(
    get,
    path = "/reservations/calendar",
    tag = "Reservations",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Reservations with additional guests", body = [ReservationWithGuests]),
        (status = 400, description = "Invalid month or year")
    ),
    security(("bearerAuth" = []))
)]
pub async fn calendar(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Reservations, Action::List)?;
    let reservations = state
        .reservation_service
        .calendar(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::ok(reservations))
}

/// Weekly occupancy around a reference date
#[utoipa::path(
    get,
    path = "/reservations/analytics",
    tag = "Reservations",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Weekly buckets and the raw list", body = ReservationAnalytics),
        (status = 400, description = "Unknown sort key or order")
    ),
    security(("bearerAuth" = []))
)]
pub async fn analytics(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Reservations, Action::List)?;
    let analytics = state
        .reservation_service
        .analytics(auth_user.tenant_id, query)
        .await?;
    Ok(ApiResponse::ok(analytics))
}
