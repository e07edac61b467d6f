// API documentation
// The OpenAPI document is derived from the handler annotations

pub mod swagger_ui;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::{auth, guests, reservations, rooms, tenants, users};
use crate::models;
use crate::services::analytics;

pub use swagger_ui::serve_swagger_ui;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Innkeep Backend API",
        description = "Multi-tenant property management API: guests, rooms, reservations and staff accounts",
        version = "1.0.0"
    ),
    paths(
        crate::health_check,
        auth::login,
        auth::logout,
        auth::forgot_password,
        auth::reset_password,
        auth::complete_registration,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::update_profile_picture,
        tenants::create_tenant,
        tenants::list_tenants,
        tenants::get_tenant,
        tenants::update_tenant,
        tenants::delete_tenant,
        guests::upsert_guest,
        guests::list_guests,
        guests::search_guests,
        guests::current_guests,
        guests::get_guest,
        guests::guest_reservations,
        guests::delete_guest,
        rooms::create_room,
        rooms::list_rooms,
        rooms::get_room,
        rooms::update_room,
        rooms::delete_room,
        reservations::create_reservation,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::calendar,
        reservations::analytics,
    ),
    components(schemas(
        models::LoginRequest,
        models::ForgotPasswordRequest,
        models::ResetPasswordRequest,
        models::Role,
        models::UserStatus,
        models::UserResponse,
        models::CreateUserRequest,
        models::CompleteRegistrationRequest,
        models::UpdateUserRequest,
        models::UpdateProfilePictureRequest,
        models::Tenant,
        models::CreateTenantRequest,
        models::UpdateTenantRequest,
        models::Guest,
        models::CreateGuestRequest,
        models::GuestRef,
        models::Room,
        models::CreateRoomRequest,
        models::UpdateRoomRequest,
        models::GuestStatus,
        models::PaymentStatus,
        models::Reservation,
        models::CreateReservationRequest,
        models::ReservationDetail,
        models::ReservationWithGuests,
        models::GuestWithReservations,
        models::CurrentGuest,
        models::PageMeta,
        models::SortDirection,
        analytics::AnalyticsReservation,
        analytics::WeekBucket,
        analytics::ReservationAnalytics,
        auth::LoginData,
        auth::TokenData,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Authentication", description = "Login, logout, password reset and registration"),
        (name = "Users", description = "Staff accounts"),
        (name = "Tenants", description = "Properties, SuperAdmin only"),
        (name = "Guests", description = "Guest records and lookups"),
        (name = "Rooms", description = "Room inventory"),
        (name = "Reservations", description = "Bookings, calendar and analytics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document at /docs/openapi.json
pub async fn serve_openapi_spec() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize OpenAPI document: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = ApiDoc::openapi();

        for path in [
            "/login",
            "/guests",
            "/guests/current",
            "/reservations/{id}",
            "/reservations/analytics",
            "/users/profile-picture/{id}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
        assert!(components.schemas.contains_key("ReservationDetail"));
    }
}
