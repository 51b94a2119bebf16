use crate::conf::{ConfigError, ConfigOverrides, load_config};
use miette::Report;
use std::path::PathBuf;

pub fn check(path: PathBuf, plain: bool) -> anyhow::Result<()> {
    match load_config(Some(path.as_path()), &ConfigOverrides::default()) {
        Ok(cfg) => {
            println!("✔ Config loaded successfully");
            println!("✔ {}ms buckets", cfg.bucket_width_ms);
            println!(
                "✔ alert above {} avg hits over {} buckets",
                cfg.alert_threshold, cfg.alert_window
            );
            println!("✔ averages over {} buckets", cfg.display_average_window);
            println!("✔ extraction pattern compiles with all required fields");
            Ok(())
        }
        Err(err) => {
            print_config_error(err, plain);
            std::process::exit(1);
        }
    }
}

fn print_config_error(err: ConfigError, plain: bool) {
    let hint = config_error_hint(&err);
    if plain {
        eprintln!("{}", err);
    } else {
        eprintln!();
        eprintln!("{:?}", Report::new(err));
    }
    if let Some(hint) = hint {
        eprintln!();
        eprintln!("{}", hint);
    }
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        //---------------------------------------------------------------------
        // Windowing
        //---------------------------------------------------------------------
        ConfigError::ZeroBucketWidth => Some(
            "Buckets need a positive width.\n\
             \n\
             Example:\n\
             \n\
             bucket_width_ms = 2000",
        ),

        ConfigError::ZeroWindow { .. } => Some(
            "Averages are taken over a number of trailing buckets, which must be at least 1.\n\
             \n\
             Example:\n\
             \n\
             alert_window           = 60\n\
             display_average_window = 30",
        ),

        //---------------------------------------------------------------------
        // Alerting
        //---------------------------------------------------------------------
        ConfigError::InvalidThreshold { .. } => Some(
            "The alert threshold is an average number of hits per bucket.\n\
             \n\
             Example:\n\
             \n\
             alert_threshold = 400",
        ),

        //---------------------------------------------------------------------
        // Ingestion
        //---------------------------------------------------------------------
        ConfigError::MissingCaptureGroup { .. } => Some(
            "The pattern must name every field with (?P<name>...):\n\
             address, timestamp, method, path, protocol, status, bytes, referer, user_agent.\n\
             \n\
             Groups that your log format lacks can match an empty string, e.g. (?P<referer>).",
        ),

        ConfigError::InvalidPattern { .. } => Some(
            "Patterns use Rust regex syntax. Backslashes must be doubled inside HCL strings.",
        ),

        //---------------------------------------------------------------------
        // Everything else: no hint
        //---------------------------------------------------------------------
        _ => None,
    }
}
