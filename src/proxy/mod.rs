pub mod config;
pub mod docs;
pub mod handlers;
pub mod health;
pub mod mappers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod state;
pub mod upstream;

pub use config::{CorsConfig, CorsMode, ProviderConfig, ProxyConfig};
pub use server::AxumServer;
pub use state::AppState;

#[cfg(test)]
pub mod tests;
