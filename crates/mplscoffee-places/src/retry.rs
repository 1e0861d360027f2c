//! Retry with exponential back-off and jitter for provider calls.
//!
//! Only transport failures are retried. Provider status errors, malformed
//! bodies and missing payloads come back on the first attempt: retrying
//! them would burn quota without changing the answer.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

const MAX_DELAY_MS: u64 = 60_000;

/// Bounded retry policy injected into [`crate::PlacesClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits `backoff_base_ms * 2^(n-1)` ± 25 %.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    pub const NONE: Self = Self {
        max_retries: 0,
        backoff_base_ms: 0,
    };

    #[must_use]
    pub const fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1_000)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx and 429.
///
/// **Not retriable:** provider status errors, deserialization failures,
/// missing detail payloads, pagination guard trips, bad base URLs.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
        }
        PlacesError::Api { .. }
        | PlacesError::Deserialize { .. }
        | PlacesError::MissingDetail { .. }
        | PlacesError::PaginationLimit { .. }
        | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt    |
/// |---------|------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter  |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter  |
/// | 3       | 1 000 ms × 2² ± 25 % jitter  |
///
/// Delay is capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    endpoint: &'static str,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    endpoint,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "places transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
