//! Retry with exponential back-off and jitter for media fetches.
//!
//! Every failure of a single fetch is treated as transient except a request
//! that could not even be built (a malformed URL will never succeed).
//! Intermediate failures are not logged; the caller sees only the final
//! outcome.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => !e.is_builder(),
        ScraperError::UnexpectedStatus { .. } => true,
        _ => false,
    }
}

/// Runs `operation` up to `max_attempts` times in total.
///
/// | Failed attempt | Sleep before the next one        |
/// |----------------|----------------------------------|
/// | 1              | `backoff_base_ms` × 2⁰ ± 25 %    |
/// | 2              | `backoff_base_ms` × 2¹ ± 25 %    |
/// | 3              | `backoff_base_ms` × 2² ± 25 %    |
///
/// Delay is capped at 60 s. `max_attempts = 0` behaves like 1. When every
/// attempt fails the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !is_retriable(&err) || attempt >= max_attempts {
                    return Err(err);
                }
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
