use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::Result;

/// Default delay between two polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default wall-clock budget for a poll loop
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(180);

/// Fixed-interval polling budget.
///
/// The loop ends when `timeout` has elapsed or, if set, after `max_attempts`
/// fetches, whichever comes first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT)
    }
}

/// Result of a poll loop that did not fail
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The check passed on the last fetched value.
    Ready(T),
    /// The budget ran out; holds the last fetched value.
    Exhausted { last: T, attempts: u32 },
}

/// Fetches a value until `check` accepts it or the policy's budget is spent.
///
/// A fetch error ends the loop immediately and is returned as is. There is
/// no sleep after an accepted value or after the final attempt.
pub async fn poll_until<T, F, Fut, C>(
    policy: &PollPolicy,
    mut fetch: F,
    mut check: C,
) -> Result<PollOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: FnMut(&T) -> bool,
{
    let deadline = Instant::now() + policy.timeout;
    let mut attempts = 0u32;

    loop {
        let value = fetch().await?;
        attempts += 1;

        if check(&value) {
            return Ok(PollOutcome::Ready(value));
        }

        let attempts_spent = policy.max_attempts.is_some_and(|max| attempts >= max);
        if attempts_spent || Instant::now() + policy.interval > deadline {
            debug!("poll budget spent after {} attempts", attempts);
            return Ok(PollOutcome::Exhausted {
                last: value,
                attempts,
            });
        }

        tokio::time::sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fast(max_attempts: u32) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(1), Duration::from_secs(10))
            .with_max_attempts(max_attempts)
    }

    #[tokio::test]
    async fn test_returns_as_soon_as_check_passes() {
        let mut calls = 0;
        let outcome = poll_until(
            &fast(10),
            || {
                calls += 1;
                let n = calls;
                async move { Ok(n) }
            },
            |n| *n == 3,
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Ready(3));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempt_cap() {
        let mut calls = 0;
        let outcome = poll_until(
            &fast(4),
            || {
                calls += 1;
                async { Ok(()) }
            },
            |_| false,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Exhausted {
                last: (),
                attempts: 4
            }
        );
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_exhausts_deadline() {
        let policy = PollPolicy::new(Duration::from_millis(5), Duration::from_millis(30));
        let started = Instant::now();
        let outcome = poll_until(&policy, || async { Ok(0) }, |_| false)
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Exhausted { .. }));
        assert!(started.elapsed() <= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_timeout_fetches_once() {
        let policy = PollPolicy::new(Duration::from_secs(1), Duration::ZERO);
        let mut calls = 0;
        let outcome = poll_until(
            &policy,
            || {
                calls += 1;
                async { Ok(()) }
            },
            |_| false,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, PollOutcome::Exhausted { attempts: 1, .. }));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_without_retry() {
        let mut calls = 0;
        let result: Result<PollOutcome<()>> = poll_until(
            &fast(10),
            || {
                calls += 1;
                async { Err(Error::Stream("boom".to_string())) }
            },
            |_| false,
        )
        .await;

        assert!(matches!(result, Err(Error::Stream(_))));
        assert_eq!(calls, 1);
    }
}
