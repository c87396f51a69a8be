// Upstream client for the OpenAI-compatible chat completions endpoint

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tokio::time::Duration;

use super::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ErrorEnvelope};
use super::{Completion, CompletionProvider, CompletionRequest, UpstreamError, Usage};
use crate::modules::system::request_context::current_request_id;
use crate::proxy::config::ProviderConfig;
use crate::proxy::middleware::request_context::REQUEST_ID_HEADER;

pub struct UpstreamClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl UpstreamClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(crate::constants::USER_AGENT.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint: Self::build_url(&config.base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_url(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }

    async fn error_from_response(resp: reqwest::Response) -> UpstreamError {
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return UpstreamError::RateLimited;
        }
        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
            return UpstreamError::Timeout;
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        UpstreamError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl CompletionProvider for UpstreamClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, UpstreamError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key);
        if let Some(request_id) = current_request_id() {
            builder = builder.header(REQUEST_ID_HEADER, request_id);
        }

        let resp = builder.json(&payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let err = Self::error_from_response(resp).await;
            tracing::warn!("Upstream request failed | Status: {} | {}", status, err);
            return Err(err);
        }

        let parsed: ChatCompletionResponse = resp.json().await?;
        let usage = parsed.usage.unwrap_or_default();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        tracing::debug!(
            "✓ Upstream request succeeded | Tokens: {} | Status: {}",
            usage.total_tokens,
            status
        );

        Ok(Completion {
            content,
            usage: Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}
