use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::errors::{ApiError, ErrorBody};
use crate::modules::persistence::token_store::{TokenStore, UsageSnapshot};
use crate::proxy::middleware::CallerIdentity;

/// Quota state of the calling token. Does not count against the quota.
#[utoipa::path(
    get,
    path = "/api/usage",
    tag = "account",
    responses(
        (status = 200, description = "Usage for today", body = UsageSnapshot),
        (status = 400, description = "Called with the master key", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn handle_usage(
    State(tokens): State<Arc<TokenStore>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<UsageSnapshot>, ApiError> {
    let token = identity.token().ok_or_else(|| {
        ApiError::BadRequest("The master key is not subject to a quota.".to_string())
    })?;
    tokens
        .usage(token)
        .map(Json)
        .ok_or(ApiError::Unauthorized("Invalid access token."))
}
