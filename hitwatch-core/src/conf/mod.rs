mod error;
mod loader;
#[cfg(test)]
mod tests;
pub mod types;
mod validate;

pub use error::ConfigError;
pub use loader::{ConfigOverrides, load_config, parse_config};
pub use types::{DisplayConfig, MonitorConfig};
pub use validate::validate_config;
