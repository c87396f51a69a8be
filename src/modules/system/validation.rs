use crate::models::{AppConfig, QuotaConfig};
use crate::proxy::config::{CorsConfig, CorsMode, ProviderConfig, ProxyConfig};
use std::fmt;
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub actual_value: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual_value {
            Some(val) => write!(f, "  • {}: {} (got: {})", self.field, self.message, val),
            None => write!(f, "  • {}: {}", self.field, self.message),
        }
    }
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: None,
        }
    }

    fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: Some(value.to_string()),
        }
    }
}

/// Collects every configuration problem instead of stopping at the first one.
pub fn validate_app_config(config: &AppConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    validate_proxy_config(&config.proxy, &mut errors);
    validate_provider_config(&config.provider, &mut errors);
    validate_quota_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_proxy_config(config: &ProxyConfig, errors: &mut Vec<ConfigError>) {
    if config.port == 0 {
        errors.push(ConfigError::with_value(
            "proxy.port",
            "must be between 1 and 65535",
            config.port,
        ));
    }
    if config.master_api_key.trim().is_empty() {
        errors.push(ConfigError::new("proxy.master_api_key", "must not be empty"));
    }
    if config.max_body_size == 0 {
        errors.push(ConfigError::with_value(
            "proxy.max_body_size",
            "must be greater than 0",
            config.max_body_size,
        ));
    }
    validate_cors_config(&config.cors, errors);
}

fn validate_provider_config(config: &ProviderConfig, errors: &mut Vec<ConfigError>) {
    if config.api_key.trim().is_empty() {
        errors.push(ConfigError::new(
            "provider.api_key",
            "must not be empty (set OPENAI_API_KEY)",
        ));
    }
    if config.model.trim().is_empty() {
        errors.push(ConfigError::new("provider.model", "must not be empty"));
    }
    if config.max_tokens == 0 {
        errors.push(ConfigError::with_value(
            "provider.max_tokens",
            "must be greater than 0",
            config.max_tokens,
        ));
    }
    if !(0.0..=2.0).contains(&config.temperature) {
        errors.push(ConfigError::with_value(
            "provider.temperature",
            "must be between 0.0 and 2.0",
            config.temperature,
        ));
    }
    if config.request_timeout == 0 {
        errors.push(ConfigError::with_value(
            "provider.request_timeout",
            "must be greater than 0",
            config.request_timeout,
        ));
    } else if config.request_timeout > 600 {
        errors.push(ConfigError::with_value(
            "provider.request_timeout",
            "should not exceed 600 seconds (10 minutes)",
            config.request_timeout,
        ));
    }

    match url::Url::parse(&config.base_url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => errors.push(ConfigError::with_value(
            "provider.base_url",
            "scheme must be http or https",
            parsed.scheme(),
        )),
        Err(_) => errors.push(ConfigError::with_value(
            "provider.base_url",
            "must be a valid absolute URL",
            &config.base_url,
        )),
    }
}

fn validate_quota_config(config: &AppConfig, errors: &mut Vec<ConfigError>) {
    let QuotaConfig {
        tier_limits,
        access_tokens,
        ..
    } = &config.quota;

    for (name, limit) in [
        ("free", tier_limits.free),
        ("pro", tier_limits.pro),
        ("business", tier_limits.business),
    ] {
        if limit == 0 {
            errors.push(ConfigError::with_value(
                format!("quota.tier_limits.{}", name),
                "must be greater than 0",
                limit,
            ));
        }
    }

    for (index, entry) in access_tokens.iter().enumerate() {
        if entry.token == config.proxy.master_api_key {
            errors.push(ConfigError::new(
                format!("quota.access_tokens[{}]", index),
                "must differ from the master key",
            ));
        }
        if access_tokens[..index].iter().any(|e| e.token == entry.token) {
            errors.push(ConfigError::new(
                format!("quota.access_tokens[{}]", index),
                "duplicate token",
            ));
        }
    }
}

fn validate_cors_config(config: &CorsConfig, errors: &mut Vec<ConfigError>) {
    if matches!(config.mode, CorsMode::Permissive) {
        return;
    }

    for (index, raw_origin) in config.allowed_origins.iter().enumerate() {
        let origin = raw_origin.trim();
        let parsed = match url::Url::parse(origin) {
            Ok(url) => url,
            Err(_) => {
                errors.push(ConfigError::with_value(
                    format!("proxy.cors.allowed_origins[{}]", index),
                    "must be a valid absolute HTTP(S) origin",
                    origin,
                ));
                continue;
            }
        };

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            errors.push(ConfigError::with_value(
                format!("proxy.cors.allowed_origins[{}]", index),
                "origin scheme must be http or https",
                origin,
            ));
        }
    }
}
