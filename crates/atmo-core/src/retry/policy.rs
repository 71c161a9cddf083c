use std::time::Duration;

use crate::config::RetryConfig;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; the item is exhausted (or the run was killed).
    NoRetry,
    /// Retry after the given delay (zero means immediately).
    RetryAfter(Duration),
}

/// Whole-item retry policy.
///
/// The default retries immediately: attempts are bounded and I/O-bound, so a
/// hot retry loop is fine. A fixed `backoff` can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per item (including the first). At least 1.
    pub max_attempts: u32,
    /// Delay between a failed attempt and the next one.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::ZERO,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            backoff: Duration::from_millis(cfg.backoff_ms),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Decide what to do after attempt `attempt` (1-based) failed.
    /// A kill request always stops retrying.
    pub fn decide(&self, attempt: u32, killed: bool) -> RetryDecision {
        if killed || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff)
    }
}
