// Library exports for the Innkeep backend
// The binary and the integration tests both build the router from here

pub mod app;
pub mod app_config;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use db::{DieselPool, DieselDatabaseConfig};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use models::auth::AccessTokenClaims;
pub use services::{EmailService, JwtService};
pub use utils::service_error::{ServiceError, ServiceResult};

/// Assemble the full HTTP surface for a prepared state
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(handlers::public_routes())
        .merge(handlers::protected_routes(state.clone()));

    if state.config.features.enable_api_docs {
        router = router.merge(handlers::docs_routes());
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer(&state.config))
        .with_state(state)
}

/// Connect the pool, apply migrations and wire every service
pub async fn initialize_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    info!(
        "Initializing database pool for {}",
        db::mask_connection_string(&config.database.url)
    );
    let diesel_pool = db::create_diesel_pool(DieselDatabaseConfig::from(&config.database))
        .await
        .context("Database initialization failed")?;

    migrations::run_all_migrations(config, &diesel_pool)
        .await
        .context("Migration failed")?;

    let jwt_service = Arc::new(JwtService::from_settings(&config.jwt)?);
    let email_service = EmailService::new(config.email.clone())?;

    Ok(AppState::new(
        Arc::new(config.clone()),
        diesel_pool,
        jwt_service,
        email_service,
    ))
}

/// Liveness plus a database round trip
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are healthy"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (healthy, postgres) = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(()) => (
            true,
            serde_json::json!({
                "status": "healthy",
                "max_connections": state.config.database.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "innkeep-backend",
        "timestamp": timestamp,
        "components": { "postgresql": postgres }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
