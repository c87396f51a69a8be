use crate::models::Tier;
use crate::proxy::config::{ProviderConfig, ProxyConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLimits {
    pub free: u32,
    pub pro: u32,
    pub business: u32,
}

impl TierLimits {
    pub fn daily_limit(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Free => self.free,
            Tier::Pro => self.pro,
            Tier::Business => self.business,
        }
    }
}

impl Default for TierLimits {
    fn default() -> Self {
        Self {
            free: 20,
            pro: 500,
            business: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default)]
    pub tier_limits: TierLimits,
    /// Accepted requests per sliding minute for one token. Zero disables the check.
    #[serde(default = "default_burst_limit")]
    pub burst_limit_per_minute: u32,
    /// Tokens provisioned at startup.
    #[serde(default)]
    pub access_tokens: Vec<AccessTokenEntry>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            tier_limits: TierLimits::default(),
            burst_limit_per_minute: default_burst_limit(),
            access_tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenEntry {
    pub token: String,
    pub tier: Tier,
}

fn default_burst_limit() -> u32 {
    20
}
