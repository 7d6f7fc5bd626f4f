//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use starsync::logging::init_logging;
//! use starsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "film", inserted = 1000, "Step committed");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a table step
///
/// # Example
///
/// ```no_run
/// use starsync::log_step_start;
/// use starsync::domain::SyncTable;
///
/// log_step_start!(SyncTable::Film, "incremental");
/// ```
#[macro_export]
macro_rules! log_step_start {
    ($table:expr, $mode:expr) => {
        tracing::info!(
            table = %$table,
            mode = %$mode,
            "Starting sync step"
        );
    };
}

/// Log the commit of a table step
///
/// # Example
///
/// ```no_run
/// use starsync::log_step_committed;
/// use starsync::domain::SyncTable;
/// use std::time::Duration;
///
/// log_step_committed!(SyncTable::Film, 12, 3, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_step_committed {
    ($table:expr, $inserted:expr, $updated:expr, $duration:expr) => {
        tracing::info!(
            table = %$table,
            inserted = $inserted,
            updated = $updated,
            duration_ms = $duration.as_millis() as u64,
            "Sync step committed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use starsync::log_error_with_context;
/// use starsync::domain::StarsyncError;
///
/// let error = StarsyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
