//! Retry with exponential back-off and jitter for provider calls.
//!
//! Only transport-level failures and 5xx responses are retried. A 429 is
//! returned to the caller on the first occurrence: the engine reports rate
//! limiting instead of waiting it out, and the next request tries again.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 10_000;

/// Returns `true` for errors that are worth retrying after a delay.
///
/// **Retriable:** connect failures, timeouts, HTTP 5xx.
///
/// **Not retriable:** [`ScraperError::RateLimited`], 4xx statuses, provider
/// error envelopes, and malformed bodies.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => e.is_timeout() || e.is_connect(),
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::RateLimited { .. }
        | ScraperError::ApiError(_)
        | ScraperError::Deserialize { .. }
        | ScraperError::InvalidProductUrl { .. }
        | ScraperError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The wait before retry `n` (1-based) is `backoff_base_ms * 2^(n-1)`,
/// scaled by a random factor in `[0.75, 1.25)` and capped at 10 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient product API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}
