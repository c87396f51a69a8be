pub mod client;
pub mod models;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub use client::UpstreamClient;

/// One system/user prompt pair sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Provider output, returned to callers as the response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Completion {
    pub content: String,
    pub usage: Usage,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("provider request timed out")]
    Timeout,
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("provider unreachable: {0}")]
    Transport(String),
    #[error("provider response could not be decoded: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::InvalidResponse(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// The hosted model behind the gateway.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, UpstreamError>;
}
