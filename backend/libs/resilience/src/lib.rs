/// Retry primitives for talking to a Kafka Connect cluster
///
/// Kafka Connect answers with 409 / "rebalance" errors while its worker group
/// reassigns connectors. Those windows clear on their own, so callers wrap
/// remote operations in a deadline-bounded retry loop:
/// - **Retry**: Exponential backoff (250ms doubling to 5s) with jitter
/// - **Classification**: Rebalance/conflict errors retry, everything else fails fast
/// - **Deadline**: Absolute cut-off checked after every failed attempt
///
/// # Example
///
/// ```rust,no_run
/// use resilience::{with_rebalance_retry, RetryConfig};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let result = with_rebalance_retry(&RetryConfig::default(), Duration::from_secs(60), || async {
///         // Your Kafka Connect call here
///         Ok::<_, String>(())
///     })
///     .await;
/// }
/// ```

pub mod deadline;
pub mod metrics;
pub mod retry;

// Re-export main types for convenience
pub use deadline::Deadline;
pub use retry::{
    is_rebalance_error, is_rebalance_message, with_rebalance_retry, with_retry, RetryConfig,
    RetryError, REBALANCE,
};
