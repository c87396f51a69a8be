use axum::{
    routing::{get, post},
    Router,
};

use crate::proxy::handlers::admin_tokens;
use crate::proxy::middleware::admin_auth_middleware;
use crate::proxy::state::AppState;

const ADMIN_PATH_TOKENS: &str = "/api/admin/tokens";
const ADMIN_PATH_TOKEN: &str = "/api/admin/tokens/:token";
const ADMIN_PATH_TOKEN_RESET: &str = "/api/admin/tokens/:token/reset";

pub fn build_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            ADMIN_PATH_TOKENS,
            get(admin_tokens::admin_list_tokens).post(admin_tokens::admin_create_token),
        )
        .route(
            ADMIN_PATH_TOKEN,
            axum::routing::delete(admin_tokens::admin_delete_token),
        )
        .route(ADMIN_PATH_TOKEN_RESET, post(admin_tokens::admin_reset_token))
        .layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}
