//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for starsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// starsync - Sakila to star-schema synchronizer
#[derive(Parser, Debug)]
#[command(name = "starsync")]
#[command(version, about, long_about = None)]
#[command(author = "Starsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "starsync.toml", env = "STARSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STARSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the analytics schema and seed the calendar dimension
    Init(commands::init::InitArgs),

    /// Insert-only load of every configured table
    FullLoad(commands::sync::SyncArgs),

    /// Upsert rows changed since each table's watermark
    Incremental(commands::sync::SyncArgs),

    /// Compare row counts and payment totals between source and target
    Validate(commands::validate::ValidateArgs),

    /// Show watermarks and target row counts
    Status(commands::status::StatusArgs),

    /// Set a table's watermark explicitly
    ResetWatermark(commands::reset::ResetWatermarkArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate_config::ValidateConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_full_load() {
        let cli = Cli::parse_from(["starsync", "full-load"]);
        assert_eq!(cli.config, "starsync.toml");
        assert!(matches!(cli.command, Commands::FullLoad(ref args) if !args.dry_run));
    }

    #[test]
    fn test_cli_parse_incremental_dry_run() {
        let cli = Cli::parse_from(["starsync", "incremental", "--dry-run"]);
        assert!(matches!(cli.command, Commands::Incremental(ref args) if args.dry_run));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["starsync", "--config", "custom.toml", "init"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["starsync", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["starsync", "validate", "--days", "7", "--json"]);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.days, Some(7));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_reset_watermark() {
        let cli = Cli::parse_from([
            "starsync",
            "reset-watermark",
            "--table",
            "customer",
            "--to",
            "2006-02-15T04:57:20",
        ]);
        match cli.command {
            Commands::ResetWatermark(args) => {
                assert_eq!(args.table, crate::domain::SyncTable::Customer);
                assert!(args.to.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_table() {
        let result = Cli::try_parse_from(["starsync", "reset-watermark", "--table", "staff"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["starsync", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
