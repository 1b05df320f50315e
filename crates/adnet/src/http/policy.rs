//! Declarative retry and pacing policies attached to adapters.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::RawResponse;
use crate::error::AdapterError;

/// Refresh-then-retry on a specific HTTP status.
///
/// Only the trigger status is retried; transport errors and every other
/// status are returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub trigger_status: u16,
}

impl RetryPolicy {
    /// One refresh and one retry after an HTTP 401.
    pub const REFRESH_ON_UNAUTHORIZED: Self = Self {
        max_attempts: 2,
        trigger_status: 401,
    };

    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            trigger_status: 0,
        }
    }

    /// Run `send` until it returns something other than the trigger status or
    /// attempts are exhausted, calling `refresh` between attempts.
    ///
    /// `send` receives the 0-based attempt number.
    pub async fn run<S, SFut, R, RFut>(
        &self,
        mut send: S,
        mut refresh: R,
    ) -> Result<RawResponse, AdapterError>
    where
        S: FnMut(u32) -> SFut,
        SFut: Future<Output = Result<RawResponse, AdapterError>>,
        R: FnMut() -> RFut,
        RFut: Future<Output = Result<(), AdapterError>>,
    {
        let mut attempt = 0;
        loop {
            let response = send(attempt).await?;
            attempt += 1;

            if response.status != self.trigger_status || attempt >= self.max_attempts {
                return Ok(response);
            }

            warn!(
                attempt,
                max = self.max_attempts,
                status = response.status,
                "Upstream rejected credentials; refreshing and retrying"
            );
            refresh().await?;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Pacing applied before a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitPolicy {
    #[default]
    None,
    FixedDelay(Duration),
}

impl RateLimitPolicy {
    pub async fn wait(&self) {
        if let Self::FixedDelay(delay) = self {
            debug!(delay_ms = delay.as_millis() as u64, "Pacing request");
            tokio::time::sleep(*delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_no_retry_on_success() {
        let sends = AtomicU32::new(0);
        let refreshes = AtomicU32::new(0);
        let response = RetryPolicy::REFRESH_ON_UNAUTHORIZED
            .run(
                |_| {
                    sends.fetch_add(1, Ordering::Relaxed);
                    async { Ok(RawResponse::new(200, "{}")) }
                },
                || {
                    refreshes.fetch_add(1, Ordering::Relaxed);
                    async { Ok(()) }
                },
            )
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(sends.load(Ordering::Relaxed), 1);
        assert_eq!(refreshes.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_single_refresh_and_retry() {
        let sends = AtomicU32::new(0);
        let refreshes = AtomicU32::new(0);
        let response = RetryPolicy::REFRESH_ON_UNAUTHORIZED
            .run(
                |_| {
                    sends.fetch_add(1, Ordering::Relaxed);
                    async { Ok(RawResponse::new(401, "")) }
                },
                || {
                    refreshes.fetch_add(1, Ordering::Relaxed);
                    async { Ok(()) }
                },
            )
            .await
            .unwrap();
        // Still 401 after the retry: returned for normalization, not retried again.
        assert_eq!(response.status, 401);
        assert_eq!(sends.load(Ordering::Relaxed), 2);
        assert_eq!(refreshes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds() {
        let response = RetryPolicy::REFRESH_ON_UNAUTHORIZED
            .run(
                |attempt| async move {
                    if attempt == 0 {
                        Ok(RawResponse::new(401, ""))
                    } else {
                        Ok(RawResponse::new(200, "[]"))
                    }
                },
                || async { Ok(()) },
            )
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_refresh_failure_aborts() {
        let sends = AtomicU32::new(0);
        let result = RetryPolicy::REFRESH_ON_UNAUTHORIZED
            .run(
                |_| {
                    sends.fetch_add(1, Ordering::Relaxed);
                    async { Ok(RawResponse::new(401, "")) }
                },
                || async { Err(AdapterError::Auth("refresh failed".to_string())) },
            )
            .await;
        assert!(matches!(result, Err(AdapterError::Auth(_))));
        assert_eq!(sends.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_none_policy_never_retries() {
        let sends = AtomicU32::new(0);
        let response = RetryPolicy::none()
            .run(
                |_| {
                    sends.fetch_add(1, Ordering::Relaxed);
                    async { Ok(RawResponse::new(401, "")) }
                },
                || async { Ok(()) },
            )
            .await
            .unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(sends.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_waits() {
        let start = tokio::time::Instant::now();
        RateLimitPolicy::FixedDelay(Duration::from_millis(500))
            .wait()
            .await;
        assert!(start.elapsed() >= Duration::from_millis(500));

        let start = tokio::time::Instant::now();
        RateLimitPolicy::None.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
