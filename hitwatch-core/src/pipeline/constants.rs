use std::time::Duration;

pub const DEFAULT_BUCKET_WIDTH: Duration = Duration::from_secs(2);
pub const DEFAULT_ALERT_THRESHOLD: f64 = 400.0;
pub const DEFAULT_ALERT_WINDOW: usize = 60; // 60 * 2s = 2m
pub const DEFAULT_AVERAGE_WINDOW: usize = 30; // 30 * 2s = 1m
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_DISPLAY_WIDTH: u16 = 120;
pub const DEFAULT_DISPLAY_HEIGHT: u16 = 40;

/// Combined log format as written by Apache and NGINX.
pub const STANDARD_PATTERN: &str = r#"^(?P<address>\S+) \S+ \S+ \[(?P<timestamp>[^\]]*)\] "(?P<method>\S+) (?P<path>\S+) (?P<protocol>[^"]*)" (?P<status>\d+) (?P<bytes>\d+) "(?P<referer>[^"]*)" "(?P<user_agent>[^"]*)""#;

/// Timestamp layout used inside the brackets of the common log format.
pub const CLF_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Named groups every extraction pattern must define.
pub const REQUIRED_GROUPS: [&str; 9] = [
    "address",
    "timestamp",
    "method",
    "path",
    "protocol",
    "status",
    "bytes",
    "referer",
    "user_agent",
];
