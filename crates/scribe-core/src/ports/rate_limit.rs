//! Throttling of public form submissions (share and comment).

use async_trait::async_trait;
use std::time::Duration;

/// Per-client submission budget.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Spend one unit of `client`'s budget, reporting whether the submission may proceed.
    async fn check(&self, client: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Outcome of spending one unit of budget.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Submissions left in the current window.
    pub remaining: u32,
    /// Time until the budget refills.
    pub reset_after: Duration,
}

impl RateLimitResult {
    /// Whole seconds a rejected client should wait, at least one.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_after.as_secs_f64().ceil().max(1.0) as u64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter unavailable: {0}")]
    Backend(String),
}
