// Utility modules

pub mod password;
pub mod service_error;
pub mod validation;

pub use password::{hash_password, verify_password, PasswordError};
pub use service_error::{ServiceError, ServiceResult};
pub use validation::{contains_pattern, normalize_email, normalize_optional, trim_required};
