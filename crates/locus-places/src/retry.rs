//! Retry policy for provider calls.
//!
//! Only [`PlacesError::RateLimited`] is retried. Everything else, including
//! timeouts and 5xx responses, is returned on the first failure so a bad
//! record costs one request, not three.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`PlacesError::RateLimited`]: HTTP 429; the provider asked us to back off.
///
/// **Not retriable:**
/// - [`PlacesError::Http`]: network failure or timeout.
/// - [`PlacesError::Upstream`]: any other non-2xx status.
/// - [`PlacesError::Deserialize`]: malformed response; retrying won't fix it.
/// - [`PlacesError::InvalidBaseUrl`]: configuration error.
#[must_use]
pub fn is_retriable(err: &PlacesError) -> bool {
    matches!(err, PlacesError::RateLimited { .. })
}

/// Bounded exponential back-off.
///
/// The wait after the n-th failed attempt (1-based) is
/// `multiplier * 2^(n-1)` seconds, clamped to `[initial_wait, max_wait]`.
///
/// | Failed attempt | Raw wait | Clamped (defaults) |
/// |----------------|----------|--------------------|
/// | 1              | 1 s      | 5 s                |
/// | 2              | 2 s      | 5 s                |
/// | 3              | -        | error surfaced     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_wait: Duration,
    pub max_wait: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_wait: Duration::from_secs(5),
            max_wait: Duration::from_secs(10),
            multiplier: 1.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries `max_attempts` times without sleeping. Used by
    /// tests that count attempts against a mock server.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
            multiplier: 0.0,
        }
    }

    /// Wait before the attempt following failed attempt number `attempt`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1).min(30)).unwrap_or(30);
        let raw = self.multiplier * 2f64.powi(exponent);
        let computed = Duration::try_from_secs_f64(raw).unwrap_or(self.max_wait);
        computed.max(self.initial_wait).min(self.max_wait)
    }

    /// Runs `call` until it succeeds, fails with a non-retriable error, or
    /// `max_attempts` attempts have been made.
    ///
    /// On exhaustion the last [`PlacesError::RateLimited`] is returned with
    /// its `attempts` field set to the number of requests made.
    ///
    /// # Errors
    ///
    /// Returns the first non-retriable error, or the last retriable one once
    /// attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, PlacesError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PlacesError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if !is_retriable(&err) => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    tracing::error!(
                        operation,
                        attempts = attempt,
                        error = %err,
                        "rate limit retries exhausted"
                    );
                    return Err(match err {
                        PlacesError::RateLimited { operation, .. } => PlacesError::RateLimited {
                            operation,
                            attempts: attempt,
                        },
                        other => other,
                    });
                }
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    #[allow(clippy::cast_possible_truncation)]
                    let delay_ms = delay.as_millis() as u64;
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms,
                        error = %err,
                        "rate limited, retrying after back-off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
