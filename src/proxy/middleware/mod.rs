pub mod auth;
pub mod cors;
pub mod request_context;

pub use auth::{admin_auth_middleware, identity_middleware, quota_middleware, CallerIdentity};
pub use cors::cors_layer;
pub use request_context::request_context_middleware;
