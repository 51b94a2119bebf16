//! `hitwatch watch`: follow a log and display live window summaries.
//!
//! The pipeline runs on a multi-threaded Tokio runtime. The display is just
//! another task consuming the dispatcher's subscriber queues, either redrawing a
//! terminal dashboard or writing one JSON object per view.

mod dashboard;
mod json;
mod run;
mod sparkline;

pub use dashboard::{Screen, render_screen, run_dashboard, terminal_limits};
pub use json::{ViewRecord, run_json};
pub use run::{SHUTDOWN_GRACE, WatchArgs, run_to_completion, run_watch, watch_log};
pub use sparkline::sparkline;
