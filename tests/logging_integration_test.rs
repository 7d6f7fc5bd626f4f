//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so only
//! one test here initializes it.

use starsync::config::LoggingConfig;
use starsync::domain::{StarsyncError, SyncTable};
use starsync::logging::init_logging;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert!(config.json);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    assert!(matches!(
        init_logging("verbose", &config),
        Err(StarsyncError::Configuration(_))
    ));
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");
    assert!(!log_path.exists());

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
        json: true,
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    let table = SyncTable::Film;
    starsync::log_step_start!(table, "full");
    starsync::log_step_committed!(table, 1000, 0, Duration::from_millis(250));
    let error = StarsyncError::batch_write("dim_film", "duplicate key");
    starsync::log_error_with_context!(&error, "Batch for film rolled back");

    drop(guard);
    assert!(log_path.join("starsync.log").exists());
}
