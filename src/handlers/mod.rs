// HTTP handlers and route tables

pub mod auth;
pub mod docs;
pub mod guests;
pub mod reservations;
pub mod response;
pub mod rooms;
pub mod tenants;
pub mod users;

use crate::app::AppState;
use crate::middleware::auth_middleware;
use axum::{
    routing::{get, post, put},
    Router,
};

pub use response::ApiResponse;

// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/password/forgot", post(auth::forgot_password))
        .route("/password/reset/{token}", put(auth::reset_password))
        .route(
            "/complete-registration/{token}",
            put(auth::complete_registration),
        )
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user).get(users::list_users))
        .route(
            "/profile-picture/{id}",
            put(users::update_profile_picture),
        )
        .route("/{id}", get(users::get_user).put(users::update_user))
}

pub fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(tenants::create_tenant).get(tenants::list_tenants))
        .route(
            "/{id}",
            get(tenants::get_tenant)
                .put(tenants::update_tenant)
                .delete(tenants::delete_tenant),
        )
}

pub fn guest_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(guests::upsert_guest).get(guests::list_guests))
        .route("/search", get(guests::search_guests))
        .route("/current", get(guests::current_guests))
        .route("/{id}", get(guests::get_guest).delete(guests::delete_guest))
        .route("/{id}/reservations", get(guests::guest_reservations))
}

pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(rooms::create_room).get(rooms::list_rooms))
        .route(
            "/{id}",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
}

pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(reservations::create_reservation).get(reservations::list_reservations),
        )
        .route("/calendar", get(reservations::calendar))
        .route("/analytics", get(reservations::analytics))
        .route("/{id}", get(reservations::get_reservation))
}

/// Every resource route behind the token check
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .nest("/users", user_routes())
        .nest("/tenants", tenant_routes())
        .nest("/guests", guest_routes())
        .nest("/rooms", room_routes())
        .nest("/reservations", reservation_routes())
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .route("/docs", get(docs::serve_swagger_ui))
        .route("/docs/openapi.json", get(docs::serve_openapi_spec))
}
