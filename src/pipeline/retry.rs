//! Retry policy for the network phases.
//!
//! Failures are classified into a tagged enum and a pure function maps
//! (attempt number, failure kind) to a decision. The phases drive it with
//! an explicit loop — no control flow through exceptions, no shared
//! mutable retry counters.

use crate::config::RetryPolicy;
use std::time::Duration;
use thiserror::Error;

/// One failed attempt, classified for the retry policy.
#[derive(Debug, Clone, Error)]
pub enum AttemptError {
    /// HTTP 429 — the server asked us to slow down.
    #[error("rate limited (HTTP 429)")]
    RateLimited,
    /// Connection, DNS, or timeout failure.
    #[error("network error: {0}")]
    Network(String),
    /// Any other non-200 status. 404 and 500 are equally terminal here.
    #[error("permanent failure (HTTP {0})")]
    Status(u16),
}

impl AttemptError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, AttemptError::Status(_))
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep this long, then try again.
    RetryAfter(Duration),
    /// Stop; the item yields no result for this run.
    GiveUp,
}

/// Decide what happens after failed attempt number `attempt` (zero-based).
///
/// Transient failures back off exponentially, with a flat extra delay on
/// rate limits. Permanent failures and retry-budget exhaustion give up.
pub fn decide(policy: &RetryPolicy, attempt: u32, error: &AttemptError) -> RetryDecision {
    if !error.is_transient() {
        return RetryDecision::GiveUp;
    }
    if attempt + 1 >= policy.max_attempts {
        return RetryDecision::GiveUp;
    }
    let backoff = policy.base * 2u32.pow(attempt);
    match error {
        AttemptError::RateLimited => RetryDecision::RetryAfter(backoff + policy.rate_limit_extra),
        _ => RetryDecision::RetryAfter(backoff),
    }
}
