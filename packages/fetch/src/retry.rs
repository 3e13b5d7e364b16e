//! Bounded retry with linear backoff.
//!
//! Any non-success status and any transport failure counts as a failed
//! attempt. After failed attempt `n` (1-based) the loop sleeps
//! `base_delay × n` before trying again; there is no sleep after the
//! final attempt. Each call is independent: no state is carried between
//! calls and there is no circuit breaking.

use std::time::Duration;

use crate::{FetchError, Transport, Url};

/// Default number of attempts per request.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default base delay; attempt `n` waits `n ×` this value.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(800);

/// How many times to try a request and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Multiplied by the 1-based attempt index to get the wait.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and base delay.
    #[must_use]
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// A policy that retries without waiting.
    #[must_use]
    pub const fn immediate(attempts: u32) -> Self {
        Self::new(attempts, Duration::ZERO)
    }

    /// Wait applied after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Core retry loop behind [`crate::Fetcher::fetch`].
pub(crate) async fn send_with_retry(
    transport: &dyn Transport,
    url: &Url,
    policy: RetryPolicy,
) -> Result<String, FetchError> {
    let mut last_error: Option<FetchError> = None;

    for attempt in 1..=policy.attempts {
        match transport.get(url).await {
            Ok(response) if response.is_success() => return Ok(response.body),
            Ok(response) => {
                log::warn!(
                    "  HTTP {} from {url} (attempt {attempt}/{})",
                    response.status,
                    policy.attempts
                );
                last_error = Some(FetchError::Status {
                    status: response.status,
                    url: url.to_string(),
                });
            }
            Err(e) => {
                log::warn!("  transport error: {e} (attempt {attempt}/{})", policy.attempts);
                last_error = Some(e);
            }
        }

        if attempt < policy.attempts {
            let delay = policy.delay_after(attempt);
            log::debug!("  retry {attempt}/{} in {delay:?}...", policy.attempts - 1);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| FetchError::Exhausted {
        url: url.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::{Fetcher, build_url};

    fn url() -> Url {
        build_url("https://registry.example/wfs", &[]).unwrap()
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(800));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1600));
        assert_eq!(policy.delay_after(3), Duration::from_millis(2400));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_exactly_n_attempts_with_growing_waits() {
        let transport = Arc::new(ScriptedTransport::new().respond("registry.example", 503, ""));
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::default());

        let err = fetcher.fetch(&url()).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        let times = transport.request_times();
        assert_eq!(times.len(), 3);
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(first_gap >= Duration::from_millis(800));
        assert!(second_gap >= Duration::from_millis(1600));
        assert!(second_gap > first_gap);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_first_success() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("registry.example", 500, "")
                .then(200, "payload")
                .then(200, "second payload"),
        );
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::default());

        let body = fetcher.fetch(&url()).await.unwrap();

        assert_eq!(body, "payload");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn returns_last_transport_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("registry.example", 502, "")
                .then_fail("connection reset"),
        );
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::immediate(2));

        let err = fetcher.fetch(&url()).await.unwrap_err();

        assert!(
            matches!(&err, FetchError::Transport { message } if message == "connection reset"),
            "unexpected error: {err}"
        );
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_reports_synthetic_failure() {
        let transport = Arc::new(ScriptedTransport::new());
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::immediate(0));

        let err = fetcher.fetch(&url()).await.unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { .. }));
        assert_eq!(transport.request_count(), 0);
    }
}
