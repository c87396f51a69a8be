use std::sync::Arc;

use crate::modules::persistence::token_store::TokenStore;
use crate::proxy::rate_limit::BurstLimiter;
use crate::proxy::upstream::CompletionProvider;

#[derive(Clone)]
pub struct CoreServices {
    pub tokens: Arc<TokenStore>,
    pub burst: Arc<BurstLimiter>,
    pub provider: Arc<dyn CompletionProvider>,
}

#[derive(Clone)]
pub struct SecurityState {
    pub master_api_key: Arc<str>,
}

// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<CoreServices>,
    pub security: SecurityState,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenStore>,
        burst: Arc<BurstLimiter>,
        provider: Arc<dyn CompletionProvider>,
        master_api_key: &str,
    ) -> Self {
        Self {
            core: Arc::new(CoreServices {
                tokens,
                burst,
                provider,
            }),
            security: SecurityState {
                master_api_key: Arc::from(master_api_key),
            },
        }
    }
}

impl axum::extract::FromRef<AppState> for Arc<CoreServices> {
    fn from_ref(state: &AppState) -> Self {
        state.core.clone()
    }
}

impl axum::extract::FromRef<AppState> for SecurityState {
    fn from_ref(state: &AppState) -> Self {
        state.security.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<TokenStore> {
    fn from_ref(state: &AppState) -> Self {
        state.core.tokens.clone()
    }
}
