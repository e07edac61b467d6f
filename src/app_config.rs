// Centralized configuration management for the Innkeep backend
// Every environment variable is read once at startup

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub environment: Environment,
    pub rust_log: String,

    pub database: DatabaseConfig,
    pub jwt: JwtSettings,
    pub security: SecurityConfig,
    pub business: BusinessConfig,
    pub email: EmailConfig,
    pub features: FeatureConfig,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
}

/// JWT signing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
    /// Access token lifetime in seconds
    pub expiry: u64,
    pub audience: String,
    pub issuer: String,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
    pub cookie_expiry_days: u32,
    pub reset_token_ttl_minutes: u32,
    pub invitation_ttl_hours: u32,
    pub cors_allowed_origins: Vec<String>,
}

/// Property-level settings used by reservation status and calendar queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    pub timezone: Tz,
    /// Hour of the check-out day after which a stay is over
    pub checkout_cutoff_hour: u32,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            checkout_cutoff_hour: 15,
        }
    }
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub from_email: String,
    pub from_name: String,
    /// Frontend base URL used in reset and invitation links
    pub client_url: String,
}

/// Feature flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub enable_api_docs: bool,
    pub disable_embedded_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get required env var
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // Helper function to parse env var with default
        let parse_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));
        let rust_log = get_or_default("RUST_LOG", "info");

        let database = DatabaseConfig {
            url: get_required("DATABASE_URL")?,
            max_connections: parse_or_default("DATABASE_MAX_CONNECTIONS", "20")?,
            min_connections: parse_or_default("DATABASE_MIN_CONNECTIONS", "2")?,
            connect_timeout: parse_u64_or_default("DATABASE_CONNECT_TIMEOUT", "30")?,
            idle_timeout: parse_u64_or_default("DATABASE_IDLE_TIMEOUT", "600")?,
            max_lifetime: parse_u64_or_default("DATABASE_MAX_LIFETIME", "1800")?,
        };

        // JWT secret validation
        let jwt_secret = get_required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET".to_string(),
                "Secret must be at least 32 characters long".to_string(),
            ));
        }

        let jwt = JwtSettings {
            secret: jwt_secret,
            expiry: parse_u64_or_default("JWT_EXPIRY", "86400")?,
            audience: get_or_default("JWT_AUDIENCE", "innkeep"),
            issuer: get_or_default("JWT_ISSUER", "innkeep"),
        };

        let bcrypt_cost = parse_or_default("BCRYPT_COST", "10")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "BCRYPT_COST".to_string(),
                "must be between 4 and 31".to_string(),
            ));
        }

        let security = SecurityConfig {
            bcrypt_cost,
            cookie_expiry_days: parse_or_default("COOKIE_EXPIRY_DAYS", "1")?,
            reset_token_ttl_minutes: parse_or_default("RESET_TOKEN_TTL_MINUTES", "30")?,
            invitation_ttl_hours: parse_or_default("INVITATION_TTL_HOURS", "72")?,
            cors_allowed_origins: get_or_default("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        let timezone_name = get_or_default("BUSINESS_TIMEZONE", "America/New_York");
        let timezone: Tz = timezone_name.parse().map_err(|_| {
            ConfigError::InvalidValue(
                "BUSINESS_TIMEZONE".to_string(),
                format!("unknown IANA time zone '{}'", timezone_name),
            )
        })?;

        let checkout_cutoff_hour = parse_or_default("CHECKOUT_CUTOFF_HOUR", "15")?;
        if checkout_cutoff_hour > 23 {
            return Err(ConfigError::InvalidValue(
                "CHECKOUT_CUTOFF_HOUR".to_string(),
                "must be between 0 and 23".to_string(),
            ));
        }

        let business = BusinessConfig {
            timezone,
            checkout_cutoff_hour,
        };

        // Fallback client URL depends on the environment
        let client_url = env::var("CLIENT_URL").unwrap_or_else(|_| match environment {
            Environment::Production => "https://app.innkeep.io".to_string(),
            _ => "http://localhost:3000".to_string(),
        });

        let email = EmailConfig {
            from_email: get_or_default("EMAIL_FROM", "noreply@innkeep.io"),
            from_name: get_or_default("EMAIL_FROM_NAME", "Innkeep"),
            client_url: client_url.trim_end_matches('/').to_string(),
        };

        let features = FeatureConfig {
            enable_api_docs: parse_bool_or_default("ENABLE_API_DOCS", "false"),
            disable_embedded_migrations: parse_bool_or_default(
                "DISABLE_EMBEDDED_MIGRATIONS",
                "false",
            ),
        };

        Ok(Self {
            bind_address,
            environment,
            rust_log,
            database,
            jwt,
            security,
            business,
            email,
            features,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Get the global configuration instance
pub fn config() -> &'static AppConfig {
    &CONFIG
}
