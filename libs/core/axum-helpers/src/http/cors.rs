use axum::http::{HeaderValue, Method, header};
use core_config::Environment;
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Creates a CORS layer with common settings for API services.
///
/// - Allowed origins as given
/// - Methods GET, POST, PUT, DELETE, PATCH, OPTIONS
/// - Headers Content-Type, Authorization, Accept
/// - 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer for development.
///
/// Allows any origin - **DO NOT USE IN PRODUCTION**.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN` (comma-separated).
///
/// Unset falls back to a permissive layer in development and is an error in
/// production.
pub fn cors_layer_from_env(environment: &Environment) -> io::Result<CorsLayer> {
    match std::env::var("CORS_ALLOWED_ORIGIN") {
        Ok(origins) => {
            let allowed = parse_origins(&origins)?;
            info!("CORS configured with allowed origins: {}", origins);
            Ok(create_cors_layer(allowed))
        }
        Err(_) if environment.is_development() => {
            warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin in development");
            Ok(create_permissive_cors_layer())
        }
        Err(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN environment variable is required in production. Example: CORS_ALLOWED_ORIGIN=https://example.com",
        )),
    }
}

fn parse_origins(origins: &str) -> io::Result<Vec<HeaderValue>> {
    let allowed = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    if allowed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(allowed)
}
