//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the starsync configuration file.

use crate::config::{load_config, redact_connection_string};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateConfigArgs {}

impl ValidateConfigArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading runs every section's validation
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source: {}",
            redact_connection_string(config.source.connection_string.expose_secret().as_ref())
        );
        println!(
            "  Target: {}",
            redact_connection_string(config.target.connection_string.expose_secret().as_ref())
        );
        println!("  Max Connections: {}", config.target.max_connections);
        println!(
            "  Tables: {}",
            config
                .sync
                .ordered_tables()
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Default Watermark: {}", config.sync.watermark_default);
        println!(
            "  Calendar: {} to {}",
            config.calendar.start_date, config.calendar.end_date
        );
        println!("  Amount Tolerance: {}", config.validation.amount_tolerance);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config_returns_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[source]
connection_string = "mysql://etl:pw@localhost/sakila"

[target]
connection_string = "postgresql://etl:pw@localhost/analytics"
"#
        )
        .unwrap();

        let args = ValidateConfigArgs {};
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_returns_two() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[source]
connection_string = "postgresql://wrong/scheme"

[target]
connection_string = "postgresql://etl:pw@localhost/analytics"
"#
        )
        .unwrap();

        let args = ValidateConfigArgs {};
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 2);
    }
}
