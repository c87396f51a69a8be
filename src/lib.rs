pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod proxy;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use error::{AppError, AppResult};
use modules::persistence::TokenStore;
use modules::system::{config, logger, validation};
use proxy::rate_limit::BurstLimiter;
use proxy::upstream::UpstreamClient;
use proxy::{AppState, AxumServer};
use tracing::{error, info, warn};

async fn start_runtime(config: models::AppConfig) -> AppResult<()> {
    validation::validate_app_config(&config).map_err(|errors| {
        AppError::Config(format!(
            "validation failed:\n{}",
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        ))
    })?;

    let tokens = Arc::new(TokenStore::from_config(&config.quota));
    if tokens.is_empty() {
        warn!("No access tokens provisioned; only the master key can call the API");
    } else {
        info!("{} access token(s) provisioned", tokens.len());
    }

    let burst = Arc::new(BurstLimiter::new(config.quota.burst_limit_per_minute));
    if !burst.is_enabled() {
        info!("Burst limiting disabled");
    }

    let provider = UpstreamClient::new(&config.provider)?;
    info!(
        "Provider: {} | Model: {}",
        config.provider.base_url, config.provider.model
    );

    if config.proxy.allow_lan_access {
        warn!("LAN access is enabled (bind address will be 0.0.0.0)");
    } else {
        info!("LAN access is disabled (bind address will be 127.0.0.1)");
    }

    let state = AppState::new(
        tokens,
        burst,
        Arc::new(provider),
        &config.proxy.master_api_key,
    );
    AxumServer::start(&config.proxy, state).await?;
    Ok(())
}

pub fn run() {
    let env_file = config::load_env_file();
    let log_dir = config::log_dir_from_env();
    let _log_guard = logger::init_logger(log_dir.as_deref());

    match env_file {
        Ok(Some(path)) => info!("Loaded environment file {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
    let app_config = config::load_app_config();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = start_runtime(app_config).await {
            error!("{}", e);
            std::process::exit(1);
        }

        info!("WriteFlow is running. Press Ctrl+C to exit.");
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down WriteFlow");
    });
}
