mod admin;

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::proxy::config::ProxyConfig;
use crate::proxy::handlers::{content, errors::ApiError, usage};
use crate::proxy::middleware::{
    cors_layer, identity_middleware, quota_middleware, request_context_middleware,
};
use crate::proxy::state::AppState;
use crate::proxy::{docs, health};

pub use admin::build_admin_routes;

/// Routes that charge one quota unit per call.
pub fn build_content_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(content::handle_generate))
        .route("/api/rewrite", post(content::handle_rewrite))
        .route("/api/translate", post(content::handle_translate))
        .layer(axum::middleware::from_fn_with_state(state, quota_middleware))
}

pub fn build_account_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/usage", get(usage::handle_usage))
        .layer(axum::middleware::from_fn_with_state(
            state,
            identity_middleware,
        ))
}

pub fn build_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health_check_handler))
        .route("/healthz", get(health::health_check_handler))
        .route("/docs", get(docs::docs_page))
        .route("/openapi.json", get(docs::openapi_json))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

fn with_static_frontend(router: Router, static_dir: Option<&str>) -> Router {
    let Some(dir) = static_dir.map(Path::new) else {
        return router;
    };
    if !dir.is_dir() {
        tracing::info!("Static directory {} not found, frontend disabled", dir.display());
        return router;
    }

    tracing::info!("Serving frontend from {}", dir.display());
    router
        .route_service("/", ServeFile::new(dir.join("index.html")))
        .nest_service("/static", ServeDir::new(dir))
}

pub fn build_router(state: AppState, config: &ProxyConfig) -> Router {
    let api = Router::new()
        .merge(build_content_routes(state.clone()))
        .merge(build_account_routes(state.clone()))
        .merge(build_admin_routes(state.clone()))
        .merge(build_public_routes())
        .fallback(not_found)
        .with_state(state);

    with_static_frontend(api, config.static_dir.as_deref())
        .layer(axum::middleware::from_fn(request_context_middleware))
        .layer(cors_layer(&config.cors))
        .layer(DefaultBodyLimit::max(config.max_body_size))
}
