use crate::pipeline::constants::{
    DEFAULT_ALERT_THRESHOLD, DEFAULT_ALERT_WINDOW, DEFAULT_AVERAGE_WINDOW, DEFAULT_BUCKET_WIDTH,
    DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_POLL_INTERVAL, DEFAULT_QUEUE_CAPACITY,
    STANDARD_PATTERN,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resolved monitor configuration.
///
/// Every key is optional in the config file; missing keys fall back to the defaults
/// in [`crate::pipeline::constants`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Width of one aggregation window, in milliseconds.
    pub bucket_width_ms: u64,

    /// Average hits per bucket that must be crossed to raise (and cleared to clear) an alert.
    pub alert_threshold: f64,

    /// Number of trailing buckets averaged for alerting.
    pub alert_window: usize,

    /// Number of trailing buckets averaged for the averages view.
    pub display_average_window: usize,

    /// Capacity of the producer -> aggregator hand-off queue.
    pub queue_capacity: usize,

    /// How often the file follower checks for new data, in milliseconds.
    pub poll_interval_ms: u64,

    /// Extraction regex with the named groups
    /// address, timestamp, method, path, protocol, status, bytes, referer, user_agent.
    pub pattern: String,

    pub display: DisplayConfig,
}

/// Fallback terminal size used when the environment does not report one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bucket_width_ms: DEFAULT_BUCKET_WIDTH.as_millis() as u64,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            alert_window: DEFAULT_ALERT_WINDOW,
            display_average_window: DEFAULT_AVERAGE_WINDOW,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            pattern: STANDARD_PATTERN.to_string(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_DISPLAY_WIDTH,
            height: DEFAULT_DISPLAY_HEIGHT,
        }
    }
}

impl MonitorConfig {
    pub fn bucket_width(&self) -> Duration {
        Duration::from_millis(self.bucket_width_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
