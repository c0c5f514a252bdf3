//! Retry with exponential back-off and jitter for page fetches.
//!
//! Timeouts and network failures are retried. A [`FetchError::Blocked`]
//! response is returned immediately: hammering a bot wall only makes it worse.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

const MAX_DELAY_MS: u64 = 30_000;

fn is_retriable(err: &FetchError) -> bool {
    matches!(err, FetchError::Timeout { .. } | FetchError::Network { .. })
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` milliseconds, capped at
/// 30 s and scaled by a random factor in `[0.75, 1.25)`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
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
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
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
                    kind = err.kind(),
                    error = %err,
                    "transient fetch error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
