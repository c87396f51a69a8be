use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding one-minute window of accepted requests per token.
pub struct BurstLimiter {
    max_per_window: u32,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl BurstLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            hits: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_per_window > 0
    }

    pub fn check(&self, token: &str) -> Result<Instant, u64> {
        self.check_at(token, Instant::now())
    }

    /// Records a hit and returns its timestamp, or returns the seconds until
    /// the oldest hit leaves the window.
    pub fn check_at(&self, token: &str, now: Instant) -> Result<Instant, u64> {
        if !self.is_enabled() {
            return Ok(now);
        }

        let mut hits = self.hits.entry(token.to_string()).or_default();
        while let Some(oldest) = hits.front() {
            if now.saturating_duration_since(*oldest) >= WINDOW {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.max_per_window as usize {
            let retry_after = hits
                .front()
                .map(|oldest| WINDOW.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(WINDOW);
            return Err(retry_after.as_secs().max(1));
        }

        hits.push_back(now);
        Ok(now)
    }

    /// Gives back a hit recorded by `check` for a request that was not accepted.
    pub fn release(&self, token: &str, hit: Instant) {
        if let Some(mut hits) = self.hits.get_mut(token) {
            if let Some(pos) = hits.iter().rposition(|at| *at == hit) {
                hits.remove(pos);
            }
        }
    }

    pub fn forget(&self, token: &str) {
        self.hits.remove(token);
    }
}
