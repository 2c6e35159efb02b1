//! Retry policy — bounded exponential backoff with full jitter.
//!
//! Every outbound call is wrapped explicitly at the call site:
//!
//! ```
//! use geovec::{RetryPolicy, ServiceError};
//!
//! let policy = RetryPolicy::default();
//! let table = policy.run(|| fetch_product("countries"))?;
//! # fn fetch_product(_: &str) -> Result<String, ServiceError> { Ok(String::new()) }
//! # Ok::<(), ServiceError>(())
//! ```
//!
//! Only transient failures are retried: redirect and server classifications,
//! plus (by default) transport-level failures. Client and generic errors
//! propagate on first occurrence. Each call owns its own attempt counter;
//! concurrent operations never share retry state.

use std::time::Duration;

use crate::ServiceError;

/// Default maximum attempt count.
///
/// Historically this oscillated between 3 and 10 across client revisions;
/// it is now a single named default, overridable per policy.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Retry configuration for one class of outbound operation.
///
/// The delay before retry `n` (1-based) is `base_delay * 2^(n-1)`, capped at
/// `max_delay`, then full-jittered: the actual sleep is drawn uniformly from
/// zero to the computed delay so concurrent clients spread out instead of
/// synchronizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. Treated as at
    /// least 1.
    pub max_tries: u32,
    /// Delay before the first retry, doubled each attempt.
    pub base_delay: Duration,
    /// Upper bound on the pre-jitter delay.
    pub max_delay: Duration,
    /// Whether transport-level failures (no status code) are retried.
    /// Classified redirect/server errors always are.
    pub retry_transport: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retry_transport: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retry. For operations that must fail fast.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_tries: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            retry_transport: false,
        }
    }

    /// Whether this policy retries the given error.
    #[must_use]
    pub fn should_retry(&self, error: &ServiceError) -> bool {
        match error {
            ServiceError::Redirect { .. } | ServiceError::Server { .. } => true,
            ServiceError::Transport { .. } => self.retry_transport,
            ServiceError::Client { .. } | ServiceError::Generic { .. } => false,
        }
    }

    /// Pre-jitter delay before retry `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let base_ms = self.base_delay.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        let delay_ms = base_ms
            .saturating_mul(factor)
            .min(self.max_delay.as_millis() as u64);
        Duration::from_millis(delay_ms)
    }

    /// Run `op`, retrying transient failures up to `max_tries` attempts.
    ///
    /// Returns the first success, or the last observed error once attempts
    /// are exhausted. Non-transient errors are returned immediately without
    /// consuming further attempts.
    ///
    /// # Errors
    ///
    /// The error from the final attempt, or the first non-retryable error.
    pub fn run<T, F>(&self, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Result<T, ServiceError>,
    {
        let max_tries = self.max_tries.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= max_tries || !self.should_retry(&error) {
                        return Err(error);
                    }
                    std::thread::sleep(jittered(self.delay_for(attempt)));
                    attempt += 1;
                }
            }
        }
    }
}

/// Full jitter: uniform over `[0, delay]`.
fn jittered(delay: Duration) -> Duration {
    let delay_ms = delay.as_millis() as u64;
    if delay_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(fastrand::u64(0..=delay_ms))
}
