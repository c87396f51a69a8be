//! In-memory registry of access tokens and their daily call counters.
//!
//! Every quota decision for one token runs while holding that token's map
//! entry exclusively, so concurrent requests cannot both take the last slot.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{QuotaConfig, Tier, TierLimits, TokenRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenStoreError {
    #[error("token already exists")]
    AlreadyExists,
    #[error("token not found")]
    NotFound,
}

/// Quota state of one token right after a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UsageSnapshot {
    pub tier: Tier,
    pub used_today: u32,
    pub daily_limit: u32,
    pub remaining: u32,
    pub resets_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Granted(UsageSnapshot),
    Exhausted(UsageSnapshot),
    UnknownToken,
}

pub struct TokenStore {
    tokens: DashMap<String, TokenRecord>,
    limits: TierLimits,
}

impl TokenStore {
    pub fn new(limits: TierLimits) -> Self {
        Self {
            tokens: DashMap::new(),
            limits,
        }
    }

    pub fn from_config(config: &QuotaConfig) -> Self {
        let store = Self::new(config.tier_limits.clone());
        for entry in &config.access_tokens {
            if store.provision(&entry.token, entry.tier, None).is_err() {
                tracing::warn!("Skipping duplicate access token entry");
            }
        }
        store
    }

    pub fn daily_limit(&self, tier: Tier) -> u32 {
        self.limits.daily_limit(tier)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn provision(
        &self,
        token: &str,
        tier: Tier,
        label: Option<String>,
    ) -> Result<TokenRecord, TokenStoreError> {
        self.provision_at(token, tier, label, Utc::now())
    }

    pub fn provision_at(
        &self,
        token: &str,
        tier: Tier,
        label: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord, TokenStoreError> {
        match self.tokens.entry(token.to_string()) {
            Entry::Occupied(_) => Err(TokenStoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let record = TokenRecord::new(token, tier, label, now);
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<TokenRecord> {
        self.tokens.get(token).map(|r| r.value().clone())
    }

    /// All records, oldest first.
    pub fn list(&self) -> Vec<TokenRecord> {
        let mut records: Vec<TokenRecord> = self.tokens.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.token.cmp(&b.token)));
        records
    }

    pub fn remove(&self, token: &str) -> Result<TokenRecord, TokenStoreError> {
        self.tokens
            .remove(token)
            .map(|(_, record)| record)
            .ok_or(TokenStoreError::NotFound)
    }

    pub fn reset_usage(&self, token: &str) -> Result<TokenRecord, TokenStoreError> {
        let mut record = self
            .tokens
            .get_mut(token)
            .ok_or(TokenStoreError::NotFound)?;
        record.daily_count = 0;
        Ok(record.value().clone())
    }

    pub fn try_acquire(&self, token: &str) -> QuotaDecision {
        self.try_acquire_at(token, Utc::now())
    }

    /// Rolls the counter over on a new UTC day, then takes one slot if the tier
    /// ceiling has not been reached.
    pub fn try_acquire_at(&self, token: &str, now: DateTime<Utc>) -> QuotaDecision {
        let Some(mut record) = self.tokens.get_mut(token) else {
            return QuotaDecision::UnknownToken;
        };
        record.roll_day(now);

        let limit = self.limits.daily_limit(record.tier);
        if record.daily_count >= limit {
            return QuotaDecision::Exhausted(self.snapshot_of(&record, limit));
        }

        record.daily_count += 1;
        record.total_requests += 1;
        record.last_used_at = Some(now);
        QuotaDecision::Granted(self.snapshot_of(&record, limit))
    }

    pub fn record_usage(&self, token: &str, total_tokens: u64) {
        if let Some(mut record) = self.tokens.get_mut(token) {
            record.total_tokens_used = record.total_tokens_used.saturating_add(total_tokens);
        }
    }

    pub fn usage(&self, token: &str) -> Option<UsageSnapshot> {
        self.usage_at(token, Utc::now())
    }

    pub fn usage_at(&self, token: &str, now: DateTime<Utc>) -> Option<UsageSnapshot> {
        let mut record = self.tokens.get_mut(token)?;
        record.roll_day(now);
        let limit = self.limits.daily_limit(record.tier);
        Some(self.snapshot_of(&record, limit))
    }

    fn snapshot_of(&self, record: &TokenRecord, limit: u32) -> UsageSnapshot {
        UsageSnapshot {
            tier: record.tier,
            used_today: record.daily_count,
            daily_limit: limit,
            remaining: limit.saturating_sub(record.daily_count),
            resets_at: record.next_reset(),
        }
    }
}
