use serde::{Deserialize, Serialize};

pub const DEFAULT_MASTER_API_KEY: &str = "wf_live_master_key_change_me";
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CorsMode {
    #[default]
    Permissive,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub mode: CorsMode,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub port: u16,
    #[serde(default = "default_true")]
    pub allow_lan_access: bool,
    pub master_api_key: String,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl ProxyConfig {
    pub fn bind_host(&self) -> &'static str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            allow_lan_access: true,
            master_api_key: DEFAULT_MASTER_API_KEY.to_string(),
            cors: CorsConfig::default(),
            max_body_size: default_max_body_size(),
            static_dir: Some("static".to_string()),
        }
    }
}

/// Settings of the hosted model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Seconds.
    pub request_timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            request_timeout: 120,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_body_size() -> usize {
    1024 * 1024
}
