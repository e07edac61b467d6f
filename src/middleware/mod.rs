// Request middleware: bearer authentication and CORS

pub mod auth;
pub mod auth_middleware;
pub mod cors;

pub use auth::AuthenticatedUser;
pub use auth_middleware::{auth_middleware, TOKEN_COOKIE};
pub use cors::cors_layer;
