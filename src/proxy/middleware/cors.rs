use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::auth::{QUOTA_LIMIT_HEADER, QUOTA_REMAINING_HEADER};
use super::request_context::REQUEST_ID_HEADER;
use crate::proxy::config::{CorsConfig, CorsMode};

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([
            QUOTA_LIMIT_HEADER,
            QUOTA_REMAINING_HEADER,
            header::RETRY_AFTER,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_credentials(false)
        .max_age(std::time::Duration::from_secs(3600));

    if matches!(config.mode, CorsMode::Permissive) {
        return base.allow_origin(Any);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("Strict CORS without allowed origins, cross-origin requests are refused");
        base
    } else {
        base.allow_origin(AllowOrigin::list(allowed_origins))
    }
}
