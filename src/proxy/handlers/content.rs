use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use super::errors::{ApiError, ErrorBody};
use crate::proxy::mappers::{
    build_generate_prompt, build_rewrite_prompt, build_translate_prompt, GenerateRequest,
    RewriteRequest, TranslateRequest,
};
use crate::proxy::middleware::CallerIdentity;
use crate::proxy::state::CoreServices;
use crate::proxy::upstream::{Completion, CompletionRequest};

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn complete(
    core: &CoreServices,
    identity: &CallerIdentity,
    operation: &'static str,
    request: CompletionRequest,
) -> Result<Json<Completion>, ApiError> {
    let started = Instant::now();
    let completion = core.provider.complete(request).await.map_err(|e| {
        tracing::error!(
            "{} failed after {}ms: {}",
            operation,
            started.elapsed().as_millis(),
            e
        );
        ApiError::from(e)
    })?;

    if let Some(token) = identity.token() {
        core.tokens.record_usage(token, completion.usage.total_tokens);
    }
    tracing::info!(
        "✓ {} completed | Model: {} | Tokens: {} | {}ms",
        operation,
        completion.model,
        completion.usage.total_tokens,
        started.elapsed().as_millis()
    );
    Ok(Json(completion))
}

/// Generate a blog post, product description, email or social post.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "content",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated content", body = Completion),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 429, description = "Quota or rate limit reached", body = ErrorBody),
        (status = 502, description = "Provider failure", body = ErrorBody),
        (status = 504, description = "Provider timeout", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn handle_generate(
    State(core): State<Arc<CoreServices>>,
    Extension(identity): Extension<CallerIdentity>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Completion>, ApiError> {
    let valid = json_body(payload)?
        .validate()
        .map_err(ApiError::BadRequest)?;
    tracing::debug!("Generate | Type: {:?}", valid.content_type);
    complete(&core, &identity, "generate", build_generate_prompt(&valid)).await
}

/// Rewrite text in one of the supported styles.
#[utoipa::path(
    post,
    path = "/api/rewrite",
    tag = "content",
    request_body = RewriteRequest,
    responses(
        (status = 200, description = "Rewritten text", body = Completion),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 429, description = "Quota or rate limit reached", body = ErrorBody),
        (status = 502, description = "Provider failure", body = ErrorBody),
        (status = 504, description = "Provider timeout", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn handle_rewrite(
    State(core): State<Arc<CoreServices>>,
    Extension(identity): Extension<CallerIdentity>,
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Json<Completion>, ApiError> {
    let valid = json_body(payload)?
        .validate()
        .map_err(ApiError::BadRequest)?;
    tracing::debug!("Rewrite | Style: {:?}", valid.style);
    complete(&core, &identity, "rewrite", build_rewrite_prompt(&valid)).await
}

/// Translate text, auto-detecting the source language when none is given.
#[utoipa::path(
    post,
    path = "/api/translate",
    tag = "content",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translated text", body = Completion),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 429, description = "Quota or rate limit reached", body = ErrorBody),
        (status = 502, description = "Provider failure", body = ErrorBody),
        (status = 504, description = "Provider timeout", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn handle_translate(
    State(core): State<Arc<CoreServices>>,
    Extension(identity): Extension<CallerIdentity>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<Completion>, ApiError> {
    let valid = json_body(payload)?
        .validate()
        .map_err(ApiError::BadRequest)?;
    tracing::debug!(
        "Translate | {} -> {}",
        valid.source_lang.as_deref().unwrap_or("auto"),
        valid.target_lang.as_deref().unwrap_or("auto")
    );
    complete(&core, &identity, "translate", build_translate_prompt(&valid)).await
}
