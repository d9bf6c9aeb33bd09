//! Bounded exponential backoff for the polling loop.

use std::time::Duration;

/// Delay schedule after consecutive failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay after the first failure
    pub initial: Duration,

    /// Upper bound for any delay
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after `failures` consecutive failures
    ///
    /// Doubles per failure starting at `initial`, capped at `max`.
    /// `failures == 0` means no wait.
    pub fn delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}
