use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    //-------------------------------------------------------------------------
    // IO / Parsing
    //-------------------------------------------------------------------------
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {path}\n\n{source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: hcl::Error,
    },

    //-------------------------------------------------------------------------
    // Windowing
    //-------------------------------------------------------------------------
    #[error("bucket_width_ms must be greater than zero")]
    ZeroBucketWidth,

    #[error("{name} must be at least one bucket")]
    ZeroWindow { name: &'static str },

    //-------------------------------------------------------------------------
    // Alerting
    //-------------------------------------------------------------------------
    #[error("invalid alert_threshold {value}: must be a finite, non-negative number")]
    InvalidThreshold { value: f64 },

    //-------------------------------------------------------------------------
    // Ingestion
    //-------------------------------------------------------------------------
    #[error("queue_capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("invalid extraction pattern: {source}")]
    InvalidPattern {
        #[source]
        source: regex::Error,
    },

    #[error("extraction pattern is missing the named capture group '{group}'")]
    MissingCaptureGroup { group: &'static str },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: hcl::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
