use crate::conf::{ConfigError, ConfigOverrides, DisplayConfig, MonitorConfig, load_config};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hitwatch.hcl");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn no_file_gives_defaults() {
    let cfg = load_config(None, &ConfigOverrides::default()).unwrap();

    assert_eq!(cfg, MonitorConfig::default());
    assert_eq!(cfg.bucket_width_ms, 2_000);
    assert_eq!(cfg.alert_threshold, 400.0);
    assert_eq!(cfg.alert_window, 60);
    assert_eq!(cfg.display_average_window, 30);
}

#[test]
fn file_values_replace_defaults() {
    // Arrange
    let (_dir, path) = write_config(
        r#"
bucket_width_ms = 500
alert_threshold = 12.5
alert_window    = 10

display {
  width  = 200
  height = 60
}
"#,
    );

    // Act
    let cfg = load_config(Some(&path), &ConfigOverrides::default()).unwrap();

    // Assert
    assert_eq!(cfg.bucket_width_ms, 500);
    assert_eq!(cfg.alert_threshold, 12.5);
    assert_eq!(cfg.alert_window, 10);
    assert_eq!(cfg.display_average_window, 30);
    assert_eq!(
        cfg.display,
        DisplayConfig {
            width: 200,
            height: 60
        }
    );
}

#[test]
fn overrides_win_over_file() {
    let (_dir, path) = write_config("alert_threshold = 12\nalert_window = 10\n");
    let overrides = ConfigOverrides {
        alert_threshold: Some(3.0),
        average_window: Some(4),
        ..ConfigOverrides::default()
    };

    let cfg = load_config(Some(&path), &overrides).unwrap();

    assert_eq!(cfg.alert_threshold, 3.0);
    assert_eq!(cfg.alert_window, 10);
    assert_eq!(cfg.display_average_window, 4);
}

#[test]
fn unknown_key_is_a_parse_error() {
    let (_dir, path) = write_config("bucket_width = 2000\n");

    let err = load_config(Some(&path), &ConfigOverrides::default()).unwrap_err();

    match err {
        ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected Parse, got {other:?}"),
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.hcl");

    let err = load_config(Some(&path), &ConfigOverrides::default()).unwrap_err();

    assert!(matches!(err, ConfigError::ReadFile { .. }), "got {err:?}");
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let (_dir, path) = write_config("alert_window = 0\n");

    let err = load_config(Some(&path), &ConfigOverrides::default()).unwrap_err();

    assert!(
        matches!(err, ConfigError::ZeroWindow { name: "alert_window" }),
        "got {err:?}"
    );
}
