use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use super::content::json_body;
use super::errors::{ApiError, ErrorBody};
use crate::models::{Tier, TokenRecord};
use crate::proxy::state::{AppState, CoreServices};

const MAX_TOKEN_LEN: usize = 128;
const MAX_LABEL_LEN: usize = 100;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTokenRequest {
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub label: Option<String>,
    /// Generated when omitted.
    #[serde(default)]
    pub token: Option<String>,
}

fn generate_token() -> String {
    format!("wf_{}", uuid::Uuid::new_v4().simple())
}

fn validate_create(
    payload: CreateTokenRequest,
    master_api_key: &str,
) -> Result<(String, Tier, Option<String>), ApiError> {
    let token = match payload.token.map(|t| t.trim().to_string()) {
        None => generate_token(),
        Some(t) if t.is_empty() => generate_token(),
        Some(t) => {
            if t.len() > MAX_TOKEN_LEN || !t.chars().all(|c| c.is_ascii_graphic()) {
                return Err(ApiError::BadRequest(format!(
                    "token must be at most {} visible ASCII characters",
                    MAX_TOKEN_LEN
                )));
            }
            if t == master_api_key {
                return Err(ApiError::BadRequest(
                    "token must differ from the master key".to_string(),
                ));
            }
            t
        }
    };

    let label = payload
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    if label.as_ref().is_some_and(|l| l.chars().count() > MAX_LABEL_LEN) {
        return Err(ApiError::BadRequest(format!(
            "label must be at most {} characters",
            MAX_LABEL_LEN
        )));
    }

    Ok((token, payload.tier, label))
}

#[utoipa::path(
    get,
    path = "/api/admin/tokens",
    tag = "admin",
    responses(
        (status = 200, description = "All provisioned tokens", body = Vec<TokenRecord>),
        (status = 401, description = "Master key required", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn admin_list_tokens(State(core): State<Arc<CoreServices>>) -> Json<Vec<TokenRecord>> {
    Json(core.tokens.list())
}

#[utoipa::path(
    post,
    path = "/api/admin/tokens",
    tag = "admin",
    request_body = CreateTokenRequest,
    responses(
        (status = 201, description = "Token provisioned", body = TokenRecord),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Master key required", body = ErrorBody),
        (status = 409, description = "Token already exists", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn admin_create_token(
    State(state): State<AppState>,
    payload: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let (token, tier, label) =
        validate_create(json_body(payload)?, &state.security.master_api_key)?;
    let record = state.core.tokens.provision(&token, tier, label)?;
    tracing::info!("Provisioned {} token via admin API", record.tier);
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tokens/{token}",
    tag = "admin",
    params(("token" = String, Path, description = "Access token")),
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Master key required", body = ErrorBody),
        (status = 404, description = "Unknown token", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn admin_delete_token(
    State(core): State<Arc<CoreServices>>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    let record = core.tokens.remove(&token)?;
    core.burst.forget(&token);
    tracing::info!("Revoked {} token via admin API", record.tier);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/tokens/{token}/reset",
    tag = "admin",
    params(("token" = String, Path, description = "Access token")),
    responses(
        (status = 200, description = "Daily counter cleared", body = TokenRecord),
        (status = 401, description = "Master key required", body = ErrorBody),
        (status = 404, description = "Unknown token", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn admin_reset_token(
    State(core): State<Arc<CoreServices>>,
    Path(token): Path<String>,
) -> Result<Json<TokenRecord>, ApiError> {
    let record = core.tokens.reset_usage(&token)?;
    core.burst.forget(&token);
    Ok(Json(record))
}
