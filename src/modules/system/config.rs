use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

use crate::models::{AccessTokenEntry, AppConfig, Tier};
use crate::proxy::config::{CorsMode, DEFAULT_MASTER_API_KEY};

/// Loads `.env` into the process environment when one exists.
pub fn load_env_file() -> Result<Option<PathBuf>, String> {
    match dotenv::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(format!("failed_to_load_env_file: {}", e)),
    }
}

/// Log directory from `LOG_DIR`, read before the rest of the config so the logger can start first.
pub fn log_dir_from_env() -> Option<String> {
    env_non_empty("LOG_DIR")
}

/// Builds the configuration from defaults and the process environment.
pub fn load_app_config() -> AppConfig {
    let mut config = AppConfig::new();
    apply_env_overrides(&mut config);
    config
}

pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(key) = env_non_empty("OPENAI_API_KEY") {
        config.provider.api_key = key;
    }
    if let Some(key) = env_non_empty("MASTER_API_KEY") {
        config.proxy.master_api_key = key;
    }
    if config.proxy.master_api_key == DEFAULT_MASTER_API_KEY {
        warn!("MASTER_API_KEY is not set; the placeholder admin key is active");
    }
    if let Some(model) = env_non_empty("OPENAI_MODEL") {
        config.provider.model = model;
    }
    if let Some(base_url) = env_non_empty("OPENAI_BASE_URL") {
        config.provider.base_url = base_url.trim_end_matches('/').to_string();
    }

    override_parsed("MAX_TOKENS", &mut config.provider.max_tokens);
    override_parsed("OPENAI_TEMPERATURE", &mut config.provider.temperature);
    override_parsed("REQUEST_TIMEOUT", &mut config.provider.request_timeout);
    override_parsed("PORT", &mut config.proxy.port);
    override_parsed("MAX_BODY_SIZE", &mut config.proxy.max_body_size);
    override_parsed("FREE_DAILY_LIMIT", &mut config.quota.tier_limits.free);
    override_parsed("PRO_DAILY_LIMIT", &mut config.quota.tier_limits.pro);
    override_parsed(
        "BUSINESS_DAILY_LIMIT",
        &mut config.quota.tier_limits.business,
    );
    override_parsed(
        "BURST_LIMIT_PER_MINUTE",
        &mut config.quota.burst_limit_per_minute,
    );

    if let Some(raw) = env_non_empty("ALLOW_LAN_ACCESS") {
        match parse_env_bool(&raw) {
            Some(parsed) => config.proxy.allow_lan_access = parsed,
            None => warn!("Ignoring invalid ALLOW_LAN_ACCESS value: {}", raw),
        }
    }

    if let Some(raw) = env_non_empty("CORS_ALLOWED_ORIGINS") {
        config.proxy.cors.mode = CorsMode::Strict;
        config.proxy.cors.allowed_origins = split_list(&raw);
        info!(
            "CORS restricted to {} origin(s)",
            config.proxy.cors.allowed_origins.len()
        );
    }

    if let Some(dir) = env_non_empty("STATIC_DIR") {
        config.proxy.static_dir = Some(dir);
    }

    if let Some(raw) = env_non_empty("ACCESS_TOKENS") {
        config.quota.access_tokens = parse_access_tokens(&raw);
        info!(
            "Provisioning {} access token(s) from environment",
            config.quota.access_tokens.len()
        );
    }
}

pub(crate) fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `token[:tier]` entries separated by commas. Entries with an unknown tier are skipped.
pub(crate) fn parse_access_tokens(raw: &str) -> Vec<AccessTokenEntry> {
    let mut entries = Vec::new();
    for item in split_list(raw) {
        let (token, tier) = match item.rsplit_once(':') {
            Some((token, tier_raw)) => match Tier::parse(tier_raw) {
                Some(tier) => (token.trim().to_string(), tier),
                None => {
                    warn!("Ignoring access token entry with unknown tier: {}", tier_raw);
                    continue;
                }
            },
            None => (item, Tier::Free),
        };
        if token.is_empty() {
            continue;
        }
        entries.push(AccessTokenEntry { token, tier });
    }
    entries
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn override_parsed<T: FromStr>(key: &str, target: &mut T) {
    if let Some(raw) = env_non_empty(key) {
        match raw.parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => warn!("Ignoring invalid {} value: {}", key, raw),
        }
    }
}
