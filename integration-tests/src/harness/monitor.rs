use crate::harness::init_test_tracing;
use hitwatch_core::conf::{ConfigOverrides, MonitorConfig, load_config};
use hitwatch_core::ingest::FileFollower;
use hitwatch_core::pipeline::{
    AlertNotification, AveragesView, DisplayLimits, RunningPipeline, SeriesTotals, SummaryView,
    spawn_pipeline,
};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::time::timeout;

const PATIENCE: Duration = Duration::from_secs(5);

/// A live pipeline following a temporary access log.
pub struct TestMonitor {
    _dir: TempDir,
    log_path: PathBuf,
    running: RunningPipeline,
    _limits: watch::Sender<DisplayLimits>,
}

impl TestMonitor {
    /// Start from an HCL fixture under `fixtures/`, with short windows for tests.
    pub async fn from_fixture(fixture: &str, bucket_width_ms: u64) -> Self {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(fixture);
        let overrides = ConfigOverrides {
            bucket_width_ms: Some(bucket_width_ms),
            ..ConfigOverrides::default()
        };
        let cfg = load_config(Some(&path), &overrides).expect("failed to load fixture config");

        Self::start(cfg).await
    }

    pub async fn start(cfg: MonitorConfig) -> Self {
        init_test_tracing();

        let dir = TempDir::new().expect("failed to create temp dir");
        let log_path = dir.path().join("access.log");
        std::fs::write(&log_path, "").expect("failed to create log file");

        let follower = FileFollower::open(&log_path, false, cfg.poll_interval())
            .await
            .expect("failed to follow log file");

        let (limits_tx, limits_rx) = watch::channel(DisplayLimits::for_terminal(120, 40));
        let running = spawn_pipeline(&cfg, Box::new(follower), limits_rx)
            .expect("failed to spawn pipeline");

        Self {
            _dir: dir,
            log_path,
            running,
            _limits: limits_tx,
        }
    }

    pub fn append(&self, lines: &[&str]) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .expect("failed to open log file");

        let mut data = lines.join("\n");
        data.push('\n');
        file.write_all(data.as_bytes())
            .expect("failed to append to log file");
    }

    pub async fn next_summary(&mut self) -> SummaryView {
        timeout(PATIENCE, self.running.subscribers.summary.recv())
            .await
            .expect("no summary before timeout")
            .expect("summary queue closed")
    }

    pub async fn next_averages(&mut self) -> AveragesView {
        timeout(PATIENCE, self.running.subscribers.averages.recv())
            .await
            .expect("no averages before timeout")
            .expect("averages queue closed")
    }

    pub async fn next_alert(&mut self) -> AlertNotification {
        timeout(PATIENCE, self.running.subscribers.alerts.recv())
            .await
            .expect("no alert before timeout")
            .expect("alert queue closed")
    }

    pub async fn next_line(&mut self) -> String {
        timeout(PATIENCE, self.running.subscribers.lines.recv())
            .await
            .expect("no raw line before timeout")
            .expect("line queue closed")
    }

    /// Collect summaries until `hits` hits have been seen in total.
    pub async fn summaries_until(&mut self, hits: u64) -> Vec<SummaryView> {
        let mut seen = 0;
        let mut views = Vec::new();
        while seen < hits {
            let view = self.next_summary().await;
            seen += view.hits;
            views.push(view);
        }
        views
    }

    pub async fn totals(&self) -> SeriesTotals {
        self.running
            .series
            .totals()
            .await
            .expect("aggregation task stopped")
    }
}

impl Drop for TestMonitor {
    fn drop(&mut self) {
        self.running.producer.abort();
        self.running.aggregator.abort();
    }
}
