// Tenant handlers, SuperAdmin only

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
    models::{CreateTenantRequest, ListQuery, UpdateTenantRequest},
    utils::service_error::ServiceError,
};

#[utoipa::path(
    post,
    path = "/tenants",
    tag = "Tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = Tenant),
        (status = 403, description = "SuperAdmin only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<CreateTenantRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Tenants, Action::Create)?;
    let tenant = state.tenant_service.create_tenant(request).await?;
    Ok(ApiResponse::created(tenant))
}

#[utoipa::path(
    get,
    path = "/tenants",
    tag = "Tenants",
    params(ListQuery),
    responses(
        (status = 200, description = "All tenants", body = [Tenant]),
        (status = 403, description = "SuperAdmin only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Tenants, Action::List)?;
    let (tenants, meta) = state.tenant_service.list_tenants(query).await?;
    Ok(ApiResponse::paged(tenants, meta))
}

#[utoipa::path(
    get,
    path = "/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant", body = Tenant),
        (status = 404, description = "Tenant not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Tenants, Action::Read)?;
    let tenant = state.tenant_service.get_tenant(id).await?;
    Ok(ApiResponse::ok(tenant))
}

#[utoipa::path(
    put,
    path = "/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Tenant updated", body = Tenant),
        (status = 404, description = "Tenant not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_tenant(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Tenants, Action::Update)?;
    let tenant = state.tenant_service.update_tenant(id, request).await?;
    Ok(ApiResponse::ok(tenant))
}

#[utoipa::path(
    delete,
    path = "/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant deleted"),
        (status = 404, description = "Tenant not found"),
        (status = 409, description = "Tenant still owns data")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_tenant(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    auth_user.require(Resource::Tenants, Action::Delete)?;
    state.tenant_service.delete_tenant(id).await?;
    Ok(ApiResponse::ok(json!({ "id": id })))
}
