//! Domain error types
//!
//! This module defines the error hierarchy for starsync. Driver errors from
//! the MySQL and PostgreSQL clients are converted to strings at the adapter
//! boundary so third-party types never leak into the core.

use thiserror::Error;

/// Main starsync error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum StarsyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source or target unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// Source (OLTP) read errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Target (analytics) store errors
    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    /// A table batch failed and was rolled back
    #[error("Batch write failed for table '{table}': {message}")]
    BatchWrite {
        /// Table whose batch was rolled back
        table: String,
        /// Underlying failure
        message: String,
    },

    /// Watermark state errors
    #[error("State management error: {0}")]
    State(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl StarsyncError {
    /// Wraps an error raised while writing a table batch
    pub fn batch_write(table: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::BatchWrite {
            table: table.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error means a store could not be reached at all
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            StarsyncError::Connection(_)
                | StarsyncError::Source(SourceError::ConnectionFailed(_))
                | StarsyncError::Target(TargetError::ConnectionFailed(_))
        )
    }
}

/// Errors raised while reading the OLTP source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the source database
    #[error("Failed to connect to source database: {0}")]
    ConnectionFailed(String),

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A column held a value that could not be converted
    #[error("Invalid value in column '{column}': {message}")]
    InvalidValue {
        /// Column name
        column: String,
        /// Conversion failure
        message: String,
    },
}

/// Errors raised by the analytics target store
#[derive(Debug, Error)]
pub enum TargetError {
    /// Failed to connect to the target database
    #[error("Failed to connect to target database: {0}")]
    ConnectionFailed(String),

    /// Failed to create the analytics schema
    #[error("Failed to create schema: {0}")]
    SchemaCreationFailed(String),

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be opened or committed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for StarsyncError {
    fn from(err: std::io::Error) -> Self {
        StarsyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for StarsyncError {
    fn from(err: serde_json::Error) -> Self {
        StarsyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for StarsyncError {
    fn from(err: toml::de::Error) -> Self {
        StarsyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starsync_error_display() {
        let err = StarsyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_batch_write_display() {
        let err = StarsyncError::batch_write("customer", "duplicate key");
        assert_eq!(
            err.to_string(),
            "Batch write failed for table 'customer': duplicate key"
        );
    }

    #[test]
    fn test_source_error_conversion() {
        let err: StarsyncError = SourceError::QueryFailed("bad sql".to_string()).into();
        assert!(matches!(err, StarsyncError::Source(_)));
        assert!(!err.is_connection());
    }

    #[test]
    fn test_connection_classification() {
        let err: StarsyncError = TargetError::ConnectionFailed("refused".to_string()).into();
        assert!(err.is_connection());
        assert!(StarsyncError::Connection("down".to_string()).is_connection());
        assert!(!StarsyncError::State("x".to_string()).is_connection());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: StarsyncError = io_err.into();
        assert!(matches!(err, StarsyncError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: StarsyncError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_starsync_error_implements_std_error() {
        let err = StarsyncError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
