/// Deadline-bounded retry with exponential backoff and jitter
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::deadline::Deadline;
use crate::metrics::RetryMetrics;

/// Label used in timeout messages for rebalance-classified retries.
pub const REBALANCE: &str = "Kafka Connect rebalance";

/// Lowercase fragments that mark a Kafka Connect rebalance window.
const REBALANCE_MARKERS: &[&str] = &[
    "rebalance",
    "rebalance is expected",
    "conflicting operation",
    "409",
];

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Backoff before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for the backoff (jitter is added on top)
    pub max_backoff: Duration,
    /// Backoff multiplier applied after every retryable failure
    pub backoff_multiplier: f64,
    /// Add random jitter in `[0, backoff/2)` to each sleep
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Non-retryable error, returned on the attempt that produced it
    #[error("{0}")]
    Fatal(E),
    /// Deadline passed while only retryable errors were seen
    #[error("timed out waiting for {what} to finish: {last}")]
    TimedOut { what: &'static str, last: E },
}

impl<E> RetryError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::TimedOut { .. })
    }

    /// The underlying error of the last attempt
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Fatal(e) => e,
            RetryError::TimedOut { last, .. } => last,
        }
    }
}

/// Returns true when the message looks like a Kafka Connect rebalance or
/// conflict response. Matching is case-insensitive.
pub fn is_rebalance_message(message: &str) -> bool {
    let message = message.to_lowercase();
    REBALANCE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

pub fn is_rebalance_error<E: Display>(err: &E) -> bool {
    is_rebalance_message(&err.to_string())
}

/// Execute `f` until it succeeds, fails with an error `is_retryable` rejects,
/// or `deadline` passes.
///
/// The deadline is checked after each failed attempt and before sleeping, so
/// an operation always gets at least one attempt. On expiry the last error is
/// carried inside [`RetryError::TimedOut`].
pub async fn with_retry<F, Fut, T, E, C>(
    config: &RetryConfig,
    deadline: Deadline,
    what: &'static str,
    is_retryable: C,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    C: Fn(&E) -> bool,
{
    let mut attempt: u32 = 0;
    let mut backoff = config.initial_backoff;

    loop {
        attempt += 1;
        match f().await {
            Ok(result) => {
                RetryMetrics::record_attempts("success", attempt);
                return Ok(result);
            }
            Err(e) => {
                if !is_retryable(&e) {
                    RetryMetrics::record_attempts("fatal", attempt);
                    return Err(RetryError::Fatal(e));
                }

                if deadline.is_expired() {
                    warn!(attempt, error = %e, "Timed out waiting for {} to finish", what);
                    RetryMetrics::record_attempts("timeout", attempt);
                    return Err(RetryError::TimedOut { what, last: e });
                }

                let delay = calculate_backoff(backoff, config.jitter);

                info!(
                    attempt,
                    remaining_secs = deadline.remaining().as_secs_f64(),
                    "{} in progress; retrying after {:.2}s ... ({})",
                    what,
                    delay.as_secs_f64(),
                    e
                );

                tokio::time::sleep(delay).await;

                backoff = next_backoff(backoff, config);
            }
        }
    }
}

/// [`with_retry`] classified by [`is_rebalance_error`], with a deadline
/// `timeout` from now.
pub async fn with_rebalance_retry<F, Fut, T, E>(
    config: &RetryConfig,
    timeout: Duration,
    f: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry(
        config,
        Deadline::after(timeout),
        REBALANCE,
        is_rebalance_error::<E>,
        f,
    )
    .await
}

fn next_backoff(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.backoff_multiplier)
        .min(config.max_backoff.as_millis() as f64);
    Duration::from_millis(next_ms as u64)
}

fn calculate_backoff(base: Duration, jitter: bool) -> Duration {
    let half = (base / 2).as_nanos() as u64;
    if !jitter || half == 0 {
        return base;
    }
    let mut rng = rand::thread_rng();
    base + Duration::from_nanos(rng.gen_range(0..half))
}
