use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::modules::persistence::token_store::TokenStoreError;
use crate::proxy::upstream::UpstreamError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str),
    BadRequest(String),
    QuotaExceeded { limit: u32 },
    BurstLimited { retry_after_secs: u64 },
    ProviderRateLimited,
    Upstream,
    UpstreamTimeout,
    NotFound(String),
    Conflict(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::QuotaExceeded { .. }
            | ApiError::BurstLimited { .. }
            | ApiError::ProviderRateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
            ApiError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::QuotaExceeded { .. } | ApiError::BurstLimited { .. } => "rate_limited",
            ApiError::ProviderRateLimited => "upstream_rate_limited",
            ApiError::Upstream | ApiError::UpstreamTimeout => "upstream_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg) => msg.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                msg.clone()
            }
            ApiError::QuotaExceeded { limit } => format!(
                "Daily quota of {} requests reached. Quota resets at 00:00 UTC.",
                limit
            ),
            ApiError::BurstLimited { .. } => {
                "Rate limit exceeded. Please wait before making more requests.".to_string()
            }
            ApiError::ProviderRateLimited => {
                "Model provider rate limit reached. Please try again shortly.".to_string()
            }
            ApiError::Upstream => "Model provider request failed.".to_string(),
            ApiError::UpstreamTimeout => "Model provider did not respond in time.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            ApiError::BurstLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.message(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::RateLimited => ApiError::ProviderRateLimited,
            UpstreamError::Timeout => ApiError::UpstreamTimeout,
            UpstreamError::Status { .. }
            | UpstreamError::Transport(_)
            | UpstreamError::InvalidResponse(_) => ApiError::Upstream,
        }
    }
}

impl From<TokenStoreError> for ApiError {
    fn from(e: TokenStoreError) -> Self {
        match e {
            TokenStoreError::AlreadyExists => ApiError::Conflict(e.to_string()),
            TokenStoreError::NotFound => ApiError::NotFound(e.to_string()),
        }
    }
}
