use std::io::{self, IsTerminal};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

/// Where diagnostic logs go. The dashboard owns stdout, so logs never do.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Initialize the logging system with JSON formatting and environment-based filtering
///
/// This function sets up the logging infrastructure using tracing-subscriber:
/// - Uses environment variables for log level filtering (defaults to "info" if not set)
/// - Configures JSON output format for structured logging
/// - Flattens event fields for cleaner log output
/// - Writes to a file through a non-blocking appender when one is given
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_normal_logging(target: LogTarget<'_>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Stderr => {
            fmt()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_writer(io::stderr)
                .init();
            None
        }
        LogTarget::File(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "hitwatch.log".into());

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            fmt()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
    }
}

pub fn init_logging(target: LogTarget<'_>) -> Option<WorkerGuard> {
    // If tokio-console is enabled, DO NOT install the normal subscriber
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        init_console_logging();
        None
    } else {
        init_normal_logging(target)
    }
}

fn init_console_logging() {
    console_subscriber::init();
}

pub fn default_display_mode() -> DisplayMode {
    if io::stdout().is_terminal() {
        DisplayMode::Dashboard
    } else {
        DisplayMode::Json
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Dashboard,
    Json,
}
