pub mod api_flow;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::models::AppConfig;
use crate::modules::persistence::token_store::TokenStore;
use crate::proxy::rate_limit::BurstLimiter;
use crate::proxy::routes::build_router;
use crate::proxy::state::AppState;
use crate::proxy::upstream::{
    Completion, CompletionProvider, CompletionRequest, UpstreamError, Usage,
};

pub(crate) const FAKE_MODEL: &str = "fake-model";

/// In-process provider that records every prompt it receives.
pub(crate) struct FakeProvider {
    reply: Result<String, fn() -> UpstreamError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(make_error: fn() -> UpstreamError) -> Self {
        Self {
            reply: Err(make_error),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, UpstreamError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);

        match &self.reply {
            Ok(text) => Ok(Completion {
                content: text.clone(),
                usage: Usage {
                    prompt_tokens: 12,
                    completion_tokens: 30,
                    total_tokens: 42,
                },
                model: FAKE_MODEL.to_string(),
            }),
            Err(make_error) => Err(make_error()),
        }
    }
}

pub(crate) struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenStore>,
    pub burst: Arc<BurstLimiter>,
    pub provider: Arc<FakeProvider>,
}

pub(crate) fn test_app_with(config: &AppConfig, provider: FakeProvider) -> TestApp {
    let tokens = Arc::new(TokenStore::from_config(&config.quota));
    let burst = Arc::new(BurstLimiter::new(config.quota.burst_limit_per_minute));
    let provider = Arc::new(provider);
    let state = AppState::new(
        tokens.clone(),
        burst.clone(),
        provider.clone(),
        &config.proxy.master_api_key,
    );
    TestApp {
        router: build_router(state, &config.proxy),
        tokens,
        burst,
        provider,
    }
}

pub(crate) fn test_app() -> TestApp {
    test_app_with(
        &crate::test_utils::test_app_config(),
        FakeProvider::replying("Generated text"),
    )
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn error_type(&self) -> &str {
        self.body["error"]["type"].as_str().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub(crate) async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub(crate) async fn post_json(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> TestResponse {
    send(router, Method::POST, uri, token, Some(body)).await
}
