//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod reset;
pub mod status;
pub mod sync;
pub mod validate;
pub mod validate_config;

use crate::config::{load_config, StarsyncConfig};
use crate::domain::StarsyncError;

/// Exit code for an error that ended a command
pub fn exit_code(error: &StarsyncError) -> i32 {
    match error {
        StarsyncError::Configuration(_) => 2,
        e if e.is_connection() => 4,
        _ => 5,
    }
}

/// Load the configuration file, printing the failure and returning
/// the configuration exit code on error
fn load_or_report(config_path: &str) -> Result<StarsyncConfig, i32> {
    load_config(config_path).map_err(|e| {
        println!("❌ Failed to load configuration file");
        println!("   Error: {}", e);
        2
    })
}

/// Print a command failure and map it to its exit code
fn report_error(action: &str, error: &StarsyncError) -> i32 {
    tracing::error!(error = %error, "{action} failed");
    println!("❌ {action} failed");
    println!("   Error: {}", error);
    exit_code(error)
}
