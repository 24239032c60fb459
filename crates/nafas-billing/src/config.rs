//! Polling configuration.

use std::time::Duration;

/// Budget for one payment-confirmation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total status checks, including the immediate first one.
    pub max_attempts: u32,
    /// Delay between consecutive checks.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(2),
        }
    }
}

impl PollConfig {
    /// Returns a copy with out-of-range values clamped to safe bounds.
    pub fn validated(self) -> Self {
        Self {
            max_attempts: self.max_attempts.max(1),
            interval: self.interval.max(Duration::from_millis(100)),
        }
    }
}
