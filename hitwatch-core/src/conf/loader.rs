use crate::conf::types::MonitorConfig;
use crate::conf::validate::validate_config;
use crate::conf::ConfigError;
use clap::Args;
use std::fs;
use std::path::Path;

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Window width in milliseconds
    #[arg(long)]
    pub bucket_width_ms: Option<u64>,

    /// Average hits per bucket that raises an alert
    #[arg(long)]
    pub alert_threshold: Option<f64>,

    /// Number of buckets averaged for alerting
    #[arg(long)]
    pub alert_window: Option<usize>,

    /// Number of buckets averaged for the averages pane
    #[arg(long)]
    pub average_window: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut MonitorConfig) {
        if let Some(v) = self.bucket_width_ms {
            cfg.bucket_width_ms = v;
        }
        if let Some(v) = self.alert_threshold {
            cfg.alert_threshold = v;
        }
        if let Some(v) = self.alert_window {
            cfg.alert_window = v;
        }
        if let Some(v) = self.average_window {
            cfg.display_average_window = v;
        }
    }
}

/// Resolve the configuration: defaults, then the file (if any), then overrides.
///
/// The result is validated; any error here is fatal and must be reported before
/// the pipeline starts.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<MonitorConfig, ConfigError> {
    let mut cfg = match path {
        Some(path) => {
            let contents =
                fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
            parse_config(path, &contents)?
        }
        None => MonitorConfig::default(),
    };

    overrides.apply(&mut cfg);
    validate_config(&cfg)?;

    tracing::debug!(
        bucket_width_ms = cfg.bucket_width_ms,
        alert_threshold = cfg.alert_threshold,
        alert_window = cfg.alert_window,
        display_average_window = cfg.display_average_window,
        "configuration resolved"
    );

    Ok(cfg)
}

pub fn parse_config(path: &Path, contents: &str) -> Result<MonitorConfig, ConfigError> {
    hcl::from_str(contents).map_err(|e| ConfigError::parse(path, e))
}
