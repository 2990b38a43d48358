//! Backoff settings for manifest loads. Invocations never retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded exponential backoff, loadable from the `[toolbox.retry]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Fail on the first error.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether a failed load may try again after `failures` earlier retries.
    pub fn allows(&self, failures: u32) -> bool {
        failures < self.max_retries
    }

    /// Sleep before retry number `failures` (0-based), capped at `max_backoff_ms`.
    pub fn delay(&self, failures: u32) -> Duration {
        if self.backoff_ms == 0 {
            return Duration::ZERO;
        }
        let factor = self.backoff_multiplier.max(1.0).powi(failures.min(i32::MAX as u32) as i32);
        let ms = (self.backoff_ms as f64 * factor).min(self.max_backoff_ms as f64);
        Duration::from_millis(ms as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_ms: 200,
            backoff_multiplier: 2.0,
            max_backoff_ms: 2_000,
        }
    }
}
