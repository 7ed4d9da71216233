//! Bounded-retry executor for write conflicts
//!
//! This module provides the `RetryPolicy`, which wraps a unit of work and
//! re-runs it when it signals a concurrency conflict. Retries use exponential
//! backoff without jitter: 100ms, 200ms, 400ms for the default policy.
//!
//! Only [`LedgerError::ConcurrencyConflict`] is retried. Validation,
//! not-found, and business-rule failures propagate immediately: retrying a
//! spend that failed for insufficient balance would not make the points
//! appear.

use crate::types::LedgerError;
use log::debug;
use std::time::Duration;

/// Retry configuration for conflict-prone units of work
///
/// The default matches the documented policy: one initial attempt plus up to
/// three retries, with delay `base_delay * 2^attempt` between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom bounds
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (0-indexed)
    ///
    /// Exponential backoff: `base_delay * 2^attempt`. The shift is capped to
    /// keep the multiplication from overflowing under absurd attempt counts.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    /// Run a unit of work, retrying on concurrency conflicts
    ///
    /// The closure is re-invoked from scratch on each attempt, so it must
    /// re-read any state it compares against (a stale read would just
    /// conflict again). Non-conflict errors propagate unmodified on the
    /// attempt that produced them.
    ///
    /// After `max_retries` retries the conflict surfaces as
    /// [`LedgerError::RetriesExhausted`] carrying the total attempt count.
    pub async fn run<T, F>(&self, mut unit_of_work: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Result<T, LedgerError>,
    {
        let mut attempt = 0;
        loop {
            match unit_of_work() {
                Err(err) if err.is_conflict() => {
                    if attempt >= self.max_retries {
                        return Err(LedgerError::RetriesExhausted {
                            attempts: attempt + 1,
                        });
                    }
                    let delay = self.delay_for_attempt(attempt);
                    debug!(
                        "write conflict on attempt {}, retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountId;
    use rstest::rstest;
    use std::cell::Cell;

    fn conflict() -> LedgerError {
        LedgerError::ConcurrencyConflict {
            account: AccountId::nil(),
        }
    }

    #[rstest]
    #[case(0, Duration::from_millis(100))]
    #[case(1, Duration::from_millis(200))]
    #[case(2, Duration::from_millis(400))]
    #[case(3, Duration::from_millis(800))]
    fn test_delay_doubles_per_attempt(#[case] attempt: u32, #[case] expected: Duration) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(attempt), expected);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt_runs_once() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                Ok(42)
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_every_attempt_fails_after_four_attempts() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                Err(conflict())
            })
            .await;

        assert_eq!(result, Err(LedgerError::RetriesExhausted { attempts: 4 }));
        assert_eq!(calls.get(), 4);
        // Cumulative backoff: 100 + 200 + 400 = 700ms
        assert!(started.elapsed() >= Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_resolving_mid_flight_succeeds() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(conflict())
                } else {
                    Ok("applied")
                }
            })
            .await;

        assert_eq!(result, Ok("applied"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_business_error_is_never_retried() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result: Result<(), _> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                Err(LedgerError::validation("amount must be non-zero"))
            })
            .await;

        assert_eq!(result, Err(LedgerError::validation("amount must be non-zero")));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_never_retried() {
        let policy = RetryPolicy::default();
        let account = AccountId::new_v4();
        let calls = Cell::new(0u32);

        let result: Result<(), _> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                Err(LedgerError::AccountNotFound { account })
            })
            .await;

        assert_eq!(result, Err(LedgerError::AccountNotFound { account }));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_fails_after_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100));
        let calls = Cell::new(0u32);

        let result: Result<(), _> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                Err(conflict())
            })
            .await;

        assert_eq!(result, Err(LedgerError::RetriesExhausted { attempts: 1 }));
        assert_eq!(calls.get(), 1);
    }
}
