//! CORS middleware.
//!
//! The editor is served by the host on another port, so browser calls are
//! cross-origin by default.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderName, HeaderValue, Method};
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Create CORS layer from gateway config.
///
/// A disabled section yields the fully permissive layer.
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::very_permissive();
    }

    let origin: AllowOrigin = if is_wildcard(&config.allowed_origins) {
        Any.into()
    } else {
        parse_all::<HeaderValue>(&config.allowed_origins, "origin").into()
    };

    let headers: AllowHeaders = if is_wildcard(&config.allowed_headers) {
        Any.into()
    } else {
        parse_all::<HeaderName>(&config.allowed_headers, "header").into()
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(parse_all::<Method>(&config.allowed_methods, "method"))
        .allow_headers(headers)
        .max_age(Duration::from_secs(config.max_age))
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

/// Parse every entry, skipping (and logging) the ones that don't parse
fn parse_all<T: FromStr>(values: &[String], what: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| match v.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(value = %v, kind = what, "Ignoring unparseable CORS entry");
                None
            }
        })
        .collect()
}
