// Authentication handlers
// Login, logout, password reset and invitation completion

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use serde_json::json;
use time::Duration;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    app_config::AppConfig,
    handlers::response::ApiResponse,
    middleware::{auth::AuthenticatedUser, TOKEN_COOKIE},
    models::{
        CompleteRegistrationRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
        UserResponse,
    },
    utils::service_error::ServiceError,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginData {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenData {
    pub token: String,
}

fn token_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Strict)
        .max_age(Duration::days(i64::from(config.security.cookie_expiry_days)))
        .build()
}

fn expired_token_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(0))
        .build()
}

/// Exchange username and password for an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; token also set as cookie", body = LoginData),
        (status = 401, description = "Invalid username or password"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ServiceError> {
    let outcome = state.auth_service.login(request).await?;
    let jar = jar.add(token_cookie(outcome.token.clone(), &state.config));

    Ok((
        jar,
        ApiResponse::ok(LoginData {
            token: outcome.token,
            user: outcome.user,
        }),
    )
        .into_response())
}

/// Clear the login cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses((status = 200, description = "Logged out")),
    security(("bearerAuth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    jar: CookieJar,
) -> Response {
    tracing::info!("User {} logged out", auth_user.user_id);
    let jar = jar.add(expired_token_cookie(&state.config));
    (jar, ApiResponse::ok(json!({ "message": "Logged out successfully" }))).into_response()
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/password/forgot",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Email could not be sent")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Response, ServiceError> {
    request.validate()?;
    state.password_reset_service.request_reset(&request.email).await?;

    Ok(ApiResponse::ok(json!({
        "message": format!("Email sent to {}", request.email.trim())
    })))
}

/// Set a new password from an emailed token
#[utoipa::path(
    put,
    path = "/password/reset/{token}",
    tag = "Authentication",
    params(("token" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed; returns a login token", body = TokenData),
        (status = 400, description = "Passwords differ, or the token is invalid or expired")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    jar: CookieJar,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, ServiceError> {
    let token = state
        .password_reset_service
        .reset_password(&token, &request.password, &request.confirm_password)
        .await?;

    let jar = jar.add(token_cookie(token.clone(), &state.config));
    Ok((jar, ApiResponse::ok(TokenData { token })).into_response())
}

/// Finish an invitation by choosing a password
#[utoipa::path(
    put,
    path = "/complete-registration/{token}",
    tag = "Authentication",
    params(("token" = String, Path, description = "Token from the invitation email")),
    request_body = CompleteRegistrationRequest,
    responses(
        (status = 200, description = "Registration complete", body = UserResponse),
        (status = 400, description = "Invalid input, or the token is invalid or expired")
    )
)]
pub async fn complete_registration(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<CompleteRegistrationRequest>,
) -> Result<Response, ServiceError> {
    let user = state
        .user_service
        .complete_registration(&token, request)
        .await?;
    Ok(ApiResponse::ok(user))
}
