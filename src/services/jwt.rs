// JWT token service
// Issues and validates HS256 access tokens carrying the user, tenant and role

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::JwtSettings;
use crate::models::auth::AccessTokenClaims;
use crate::models::user::Role;

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token could not be created: {0}")]
    TokenCreation(String),

    #[error("JWT configuration error: {0}")]
    Configuration(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::InvalidToken,
        }
    }
}

// JWT Configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Token lifetime in seconds
    pub token_expiry: u64,
    pub algorithm: Algorithm,
    pub audience: String,
    pub issuer: String,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry", &self.token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    fn build_from_params(secret: &str, expiry: u64, audience: String, issuer: String) -> Self {
        JwtConfig {
            token_expiry: expiry,
            algorithm: Algorithm::HS256,
            audience,
            issuer,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Build from the loaded application settings
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, JwtError> {
        if settings.secret.is_empty() {
            return Err(JwtError::Configuration("JWT secret is empty".to_string()));
        }
        if settings.expiry == 0 {
            return Err(JwtError::Configuration(
                "JWT expiry must be greater than zero".to_string(),
            ));
        }

        Ok(Self::build_from_params(
            &settings.secret,
            settings.expiry,
            settings.audience.clone(),
            settings.issuer.clone(),
        ))
    }

    /// Deterministic config for tests
    pub fn for_test() -> Self {
        Self::build_from_params(
            "test-secret-hs256-at-least-32-characters",
            3600,
            "test.innkeep".to_string(),
            "test.innkeep".to_string(),
        )
    }
}

/// Stateless JWT service; tokens are never stored
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn from_settings(settings: &JwtSettings) -> Result<Self, JwtError> {
        Ok(Self::new(JwtConfig::from_settings(settings)?))
    }

    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }

    fn now() -> Result<u64, JwtError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| JwtError::TokenCreation(e.to_string()))
    }

    /// Generate access token
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = Self::now()?;
        let claims = AccessTokenClaims::new(
            user_id,
            tenant_id,
            role,
            self.config.audience.clone(),
            self.config.issuer.clone(),
            now,
            now + self.config.token_expiry,
        );

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.config.encoding_key,
        )
        .map_err(|e| JwtError::TokenCreation(e.to_string()))
    }

    /// Validates an access token and returns the decoded claims
    ///
    /// Expiry is checked with zero leeway; audience and issuer must match.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(token, &self.config.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}
