// Service error type shared by every handler
// Renders the `{success: false, message, status}` envelope
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::{GuestError, ReservationError, RoomError, TenantError, UserError};
use crate::services::email::EmailError;
use crate::services::jwt::JwtError;
use crate::utils::password::PasswordError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Message shown to the caller
    pub fn message(&self) -> String {
        match self {
            ServiceError::ValidationError(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::InternalError(msg) => msg.clone(),
            ServiceError::DatabaseError(msg) => format!("Database error: {}", msg),
        }
    }

    pub fn forbidden() -> Self {
        ServiceError::Forbidden("You do not have permission to perform this action".to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Conversion from various error types
impl From<diesel::result::Error> for ServiceError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match error {
            Error::NotFound => ServiceError::NotFound("Resource not found".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ServiceError::Conflict(info.message().to_string())
            },
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                ServiceError::Conflict(info.message().to_string())
            },
            _ => ServiceError::DatabaseError(error.to_string()),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for ServiceError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        ServiceError::DatabaseError(format!("Database connection failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(error.to_string())
    }
}

impl From<GuestError> for ServiceError {
    fn from(error: GuestError) -> Self {
        match error {
            GuestError::NotFound => ServiceError::NotFound("Guest not found".to_string()),
            GuestError::Unresolvable(reference) => {
                ServiceError::NotFound(format!("Guest could not be resolved: {}", reference))
            },
            GuestError::Database(e) => e.into(),
        }
    }
}

impl From<RoomError> for ServiceError {
    fn from(error: RoomError) -> Self {
        match error {
            RoomError::NotFound => ServiceError::NotFound("Room not found".to_string()),
            RoomError::DuplicateNumber(number) => {
                ServiceError::Conflict(format!("Room number {} already exists", number))
            },
            e @ RoomError::UnknownNumbers(_) => ServiceError::NotFound(e.to_string()),
            RoomError::Database(e) => e.into(),
        }
    }
}

impl From<ReservationError> for ServiceError {
    fn from(error: ReservationError) -> Self {
        match error {
            ReservationError::NotFound => {
                ServiceError::NotFound("Reservation not found".to_string())
            },
            ReservationError::Database(e) => e.into(),
        }
    }
}

impl From<TenantError> for ServiceError {
    fn from(error: TenantError) -> Self {
        match error {
            TenantError::NotFound => ServiceError::NotFound("Tenant not found".to_string()),
            e @ TenantError::StillReferenced => ServiceError::Conflict(e.to_string()),
            TenantError::Database(e) => e.into(),
        }
    }
}

impl From<UserError> for ServiceError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound => ServiceError::NotFound("User not found".to_string()),
            e @ UserError::Duplicate => ServiceError::Conflict(e.to_string()),
            UserError::Database(e) => e.into(),
        }
    }
}

impl From<JwtError> for ServiceError {
    fn from(error: JwtError) -> Self {
        match error {
            JwtError::TokenCreation(msg) | JwtError::Configuration(msg) => {
                ServiceError::InternalError(msg)
            },
            e => ServiceError::Unauthorized(e.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(error: PasswordError) -> Self {
        ServiceError::InternalError(error.to_string())
    }
}

impl From<EmailError> for ServiceError {
    fn from(_: EmailError) -> Self {
        ServiceError::InternalError("Email could not be sent".to_string())
    }
}
