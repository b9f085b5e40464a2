/// Absolute deadlines for retry loops
use std::time::Duration;
use tokio::time::Instant;

/// A point in time after which a retry loop gives up.
///
/// Built on `tokio::time::Instant`, so paused test clocks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    /// True once `now` is strictly past the deadline
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}
