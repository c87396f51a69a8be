pub mod config;
pub mod token;

pub use config::{AccessTokenEntry, AppConfig, QuotaConfig, TierLimits};
pub use token::{Tier, TokenRecord};
