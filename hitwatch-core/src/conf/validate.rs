use crate::conf::types::MonitorConfig;
use crate::conf::ConfigError;
use crate::pipeline::EventParser;

pub fn validate_config(cfg: &MonitorConfig) -> Result<(), ConfigError> {
    if cfg.bucket_width_ms == 0 {
        return Err(ConfigError::ZeroBucketWidth);
    }

    if !cfg.alert_threshold.is_finite() || cfg.alert_threshold < 0.0 {
        return Err(ConfigError::InvalidThreshold {
            value: cfg.alert_threshold,
        });
    }

    if cfg.alert_window == 0 {
        return Err(ConfigError::ZeroWindow {
            name: "alert_window",
        });
    }

    if cfg.display_average_window == 0 {
        return Err(ConfigError::ZeroWindow {
            name: "display_average_window",
        });
    }

    if cfg.queue_capacity == 0 {
        return Err(ConfigError::ZeroQueueCapacity);
    }

    if cfg.poll_interval_ms == 0 {
        return Err(ConfigError::ZeroPollInterval);
    }

    // Compiling the parser checks both the regex and the required groups.
    EventParser::new(&cfg.pattern)?;

    Ok(())
}
