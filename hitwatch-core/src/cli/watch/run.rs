use crate::cli::watch::dashboard::{restore_terminal, run_dashboard, terminal_limits};
use crate::cli::watch::json::run_json;
use crate::conf::{ConfigOverrides, MonitorConfig, load_config};
use crate::ingest::{FileFollower, LineSource, StdinSource};
use crate::logging::{DisplayMode, LogTarget, default_display_mode, init_logging};
use crate::pipeline::{RunningPipeline, spawn_pipeline};
use anyhow::{Context, Result};
use clap::Args;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Access log to follow, or "-" to read stdin until EOF
    pub path: PathBuf,

    /// Path to an HCL config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit one JSON object per view instead of the dashboard
    #[arg(long, conflicts_with = "dashboard")]
    pub json: bool,

    /// Force the dashboard even when stdout is not a terminal
    #[arg(long)]
    pub dashboard: bool,

    /// Read the existing contents of the file before following it
    #[arg(long)]
    pub from_start: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

pub fn run_watch(args: WatchArgs) -> Result<()> {
    let target = match &args.log_file {
        Some(path) => LogTarget::File(path.as_path()),
        None => LogTarget::Stderr,
    };
    let _log_guard = init_logging(target);

    // Configuration errors are fatal before any task starts.
    let cfg = load_config(args.config.as_deref(), &args.overrides)?;

    let mode = if args.json {
        DisplayMode::Json
    } else if args.dashboard {
        DisplayMode::Dashboard
    } else {
        default_display_mode()
    };

    run_to_completion(watch_log(cfg, &args.path, args.from_start, mode))?
}

/// Drive `future` on a fresh multi-thread runtime, then shut it down without
/// waiting on blocking threads for longer than [`SHUTDOWN_GRACE`].
///
/// Tokio's stdin reader parks a blocking thread that only returns when the
/// writer sends a line or closes the pipe; dropping the runtime would wait for it.
pub fn run_to_completion<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build Tokio runtime")?;

    let output = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    Ok(output)
}

/// Run the pipeline and the chosen display until the input ends or Ctrl-C.
pub async fn watch_log(
    cfg: MonitorConfig,
    path: &Path,
    from_start: bool,
    mode: DisplayMode,
) -> Result<()> {
    let source: Box<dyn LineSource> = if path == Path::new("-") {
        Box::new(StdinSource::new())
    } else {
        let follower = FileFollower::open(path, from_start, cfg.poll_interval())
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        Box::new(follower)
    };

    let (limits_tx, limits_rx) = watch::channel(terminal_limits(cfg.display));

    let RunningPipeline {
        subscribers,
        series,
        mut producer,
        aggregator: _,
    } = spawn_pipeline(&cfg, source, limits_rx)?;

    let mut display = match mode {
        DisplayMode::Dashboard => tokio::spawn(run_dashboard(subscribers, limits_tx, cfg.display)),
        // The initial limits stay readable after the sender is gone.
        DisplayMode::Json => {
            drop(limits_tx);
            tokio::spawn(run_json(subscribers, io::stdout()))
        }
    };

    let mut producer_done = false;

    loop {
        tokio::select! {
            res = &mut producer, if !producer_done => {
                producer_done = true;
                let stats = res.context("producer task panicked")??;
                debug!(?stats, "producer finished");
            }

            res = &mut display => {
                res.context("display task panicked")??;
                break;
            }

            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received; shutting down");
                display.abort();
                if mode == DisplayMode::Dashboard {
                    restore_terminal();
                }
                break;
            }
        }
    }

    if let Some(totals) = series.totals().await {
        info!(
            buckets = totals.buckets,
            total_hits = totals.total_hits,
            total_bytes = totals.total_bytes,
            "watch finished"
        );
    }

    Ok(())
}
