#![cfg(test)]

use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::models::{AccessTokenEntry, AppConfig, Tier};

fn global_env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Serializes tests that touch the process environment and restores every
/// variable it changed when dropped.
pub(crate) struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub(crate) fn acquire() -> Self {
        let lock = global_env_lock()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    pub(crate) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.remember(key);
        std::env::set_var(key, value);
        self
    }

    pub(crate) fn unset(&mut self, key: &'static str) -> &mut Self {
        self.remember(key);
        std::env::remove_var(key);
        self
    }

    fn remember(&mut self, key: &'static str) {
        if !self.saved.iter().any(|(k, _)| *k == key) {
            self.saved.push((key, std::env::var(key).ok()));
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.saved.drain(..).rev() {
            match original {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

pub(crate) const TEST_MASTER_KEY: &str = "wf-test-master";
pub(crate) const TEST_FREE_TOKEN: &str = "wf-test-free";
pub(crate) const TEST_PRO_TOKEN: &str = "wf-test-pro";

/// Valid configuration with two provisioned tokens and small ceilings.
pub(crate) fn test_app_config() -> AppConfig {
    let mut config = AppConfig::new();
    config.provider.api_key = "sk-test".to_string();
    config.proxy.master_api_key = TEST_MASTER_KEY.to_string();
    config.proxy.static_dir = None;
    config.quota.tier_limits.free = 2;
    config.quota.tier_limits.pro = 5;
    config.quota.burst_limit_per_minute = 0;
    config.quota.access_tokens = vec![
        AccessTokenEntry {
            token: TEST_FREE_TOKEN.to_string(),
            tier: Tier::Free,
        },
        AccessTokenEntry {
            token: TEST_PRO_TOKEN.to_string(),
            tier: Tier::Pro,
        },
    ];
    config
}
