use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Usage class deciding the daily call ceiling of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Business,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Business => "business",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Tier::Free),
            "pro" => Some(Tier::Pro),
            "business" => Some(Tier::Business),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRecord {
    pub token: String,
    pub tier: Tier,
    pub label: Option<String>,
    pub daily_count: u32,
    /// Start of the UTC day the counter belongs to.
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub total_requests: u64,
    pub total_tokens_used: u64,
}

impl TokenRecord {
    pub fn new(token: impl Into<String>, tier: Tier, label: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            tier,
            label,
            daily_count: 0,
            last_reset: start_of_day(now.date_naive()),
            created_at: now,
            last_used_at: None,
            total_requests: 0,
            total_tokens_used: 0,
        }
    }

    /// Zeroes the daily counter when `now` falls on a later UTC day than the last reset.
    pub fn roll_day(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if self.last_reset.date_naive() < today {
            self.daily_count = 0;
            self.last_reset = start_of_day(today);
            true
        } else {
            false
        }
    }

    pub fn next_reset(&self) -> DateTime<Utc> {
        let day = self.last_reset.date_naive();
        start_of_day(day.succ_opt().unwrap_or(day))
    }
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}
