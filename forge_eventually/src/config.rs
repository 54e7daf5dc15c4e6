//! Retry budget and polling cadence.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default pause between attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest pause the driver will take between attempts.
///
/// Keeps the loop from spinning, and lets a paused tokio clock advance.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default retry budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the retry driver.
///
/// The polling interval is fixed: there is no backoff and no jitter. Missing
/// fields fall back to their defaults when deserializing.
///
/// # Example
///
/// ```
/// use forge_eventually::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::from_millis(500).with_poll_interval(Duration::from_millis(20));
/// assert_eq!(config.timeout, Duration::from_millis(500));
/// assert_eq!(config.poll_interval, Duration::from_millis(20));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total wall-clock budget for retrying
    pub timeout: Duration,
    /// Pause between consecutive attempts
    pub poll_interval: Duration,
}

impl RetryConfig {
    /// Creates a config with the given budget and the default polling interval.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Creates a config with a budget in milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Creates a config with a budget in seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Overrides the polling interval.
    ///
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }
}

impl Default for RetryConfig {
    /// One second budget, polled every 100ms.
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
