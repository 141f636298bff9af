//! Retry with exponential backoff and jitter for page requests.
//!
//! Network failures, 429 and 5xx responses are retried. Everything else,
//! including 404 and unparseable bodies, is returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a single backoff sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` if `err` is transient and worth another attempt.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. }
        | ScraperError::Deserialize { .. }
        | ScraperError::MissingEndpoint => false,
    }
}

/// Delay before retry `attempt` (1-based), before jitter.
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// The sleep before retry `n` is `backoff_base_ms * 2^(n-1)` milliseconds,
/// capped at 60 s, scaled by a random factor in `[0.75, 1.25)`. With
/// `max_retries = 3` the operation runs at most 4 times.
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
                let capped = backoff_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
