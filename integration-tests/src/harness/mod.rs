pub mod monitor;
pub mod tracing;

pub use monitor::TestMonitor;
pub use tracing::{CapturedEvent, events_named, init_test_tracing};
