use std::net::SocketAddr;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::proxy::config::ProxyConfig;
use crate::proxy::routes::build_router;
use crate::proxy::state::AppState;

pub struct AxumServer {
    pub local_addr: SocketAddr,
}

impl AxumServer {
    /// Binds the listener and spawns the accept loop.
    pub async fn start(config: &ProxyConfig, state: AppState) -> AppResult<(Self, JoinHandle<()>)> {
        let app = build_router(state, config);
        tracing::info!(
            "Request body size limit: {} KB",
            config.max_body_size / 1024
        );

        let addr = format!("{}:{}", config.bind_host(), config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Server(format!("Address {} binding failed: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;
        tracing::info!("WriteFlow API listening on http://{}", local_addr);

        let handle = tokio::spawn(serve(listener, app));
        Ok((Self { local_addr }, handle))
    }
}

async fn serve(listener: TcpListener, app: Router) {
    loop {
        match listener.accept().await {
            Ok((stream, remote_addr)) => {
                let io = TokioIo::new(stream);
                let service = TowerToHyperService::new(app.clone());

                tokio::task::spawn(async move {
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        debug!(
                            "Connection from {} ended or failed: {:?}",
                            remote_addr, err
                        );
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {:?}", e);
            }
        }
    }
}
