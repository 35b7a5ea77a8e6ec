// Reconnect scheduling
// Exponential backoff with a hard attempt cap

use std::time::Duration;

use crate::constants::{MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_MS, RECONNECT_MAX_DELAY_MS};

/// Exponential reconnect policy.
///
/// `delay = min(base * 2^attempts, max_delay)`; once `attempts` reaches
/// `max_attempts` no further delay is handed out until [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base: Duration,
    max_delay: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        ReconnectPolicy {
            base,
            max_delay,
            max_attempts,
            attempts: 0,
        }
    }

    /// Attempts scheduled since the last successful connection
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Delay before the next attempt, or None once the cap is reached.
    /// Counts the attempt.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        let factor = 1u32.checked_shl(self.attempts).unwrap_or(u32::MAX);
        let delay = self.base.saturating_mul(factor).min(self.max_delay);
        self.attempts += 1;
        Some(delay)
    }

    /// Called after a successful open
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::new(
            Duration::from_millis(RECONNECT_BASE_MS),
            Duration::from_millis(RECONNECT_MAX_DELAY_MS),
            MAX_RECONNECT_ATTEMPTS,
        )
    }
}
