// CORS layer built from the configured origin list
// A `*` entry reflects the caller's origin outside production so cookies still work

use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};

use crate::app_config::AppConfig;

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_allowed_origins;
    let has_wildcard = origins.iter().any(|o| o == "*");

    let base = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .max_age(Duration::from_secs(3600));

    if has_wildcard && config.is_production() {
        // Credentials cannot be combined with a literal wildcard
        warn!("CORS wildcard in production; credentials are disabled");
        return base.allow_origin(Any).allow_headers(Any);
    }

    let base = base.allow_credentials(true).allow_headers([
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::ACCEPT,
        header::ORIGIN,
    ]);

    if has_wildcard {
        debug!("CORS: reflecting request origin");
        return base.allow_origin(AllowOrigin::mirror_request());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            },
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
}
