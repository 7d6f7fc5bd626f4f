//! Sync command implementation
//!
//! This module implements the `full-load` and `incremental` commands.

use super::{load_or_report, report_error};
use crate::core::sync::{StepStatus, SyncCoordinator, SyncMode, SyncSummary};
use clap::Args;

/// Arguments shared by the full-load and incremental commands
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Build every batch but write nothing (overrides config)
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    /// Execute a synchronization run
    pub async fn execute(&self, config_path: &str, mode: SyncMode) -> anyhow::Result<i32> {
        tracing::info!(mode = %mode, dry_run = self.dry_run, "Starting sync command");

        let mut config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        if self.dry_run {
            config.application.dry_run = true;
        }

        if config.application.dry_run {
            println!("🔍 Dry run: batches are built but nothing is written");
            println!();
        }

        let coordinator = match SyncCoordinator::from_config(config) {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Connection setup", &e)),
        };

        let result = match mode {
            SyncMode::Full => coordinator.full_load().await,
            SyncMode::Incremental => coordinator.incremental_sync().await,
        };
        if let Err(e) = coordinator.close().await {
            tracing::warn!(error = %e, "Failed to close connections cleanly");
        }

        match result {
            Ok(summary) => {
                print_summary(&summary);
                Ok(if summary.is_successful() { 0 } else { 1 })
            }
            Err(e) => Ok(report_error("Sync run", &e)),
        }
    }
}

fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Committed => "✅",
        StepStatus::Planned => "📝",
        StepStatus::RolledBack => "❌",
        StepStatus::Running => "🔄",
        StepStatus::NotStarted => "⏸️ ",
    }
}

fn print_summary(summary: &SyncSummary) {
    println!("📊 {} sync at {}", summary.mode, summary.run_at);
    println!();
    println!(
        "{:<16} {:<16} {:>9} {:>9} {:>9} {:>9}",
        "Table", "Status", "Planned", "Inserted", "Updated", "Skipped"
    );
    println!("{}", "-".repeat(74));

    for step in &summary.steps {
        println!(
            "{:<16} {} {:<13} {:>9} {:>9} {:>9} {:>9}",
            step.table.as_str(),
            status_icon(step.status),
            step.status.to_string(),
            step.planned,
            step.inserted,
            step.updated,
            step.skipped
        );
    }

    println!();
    println!(
        "Inserted: {}, Updated: {}, Duration: {:.2}s",
        summary.total_inserted(),
        summary.total_updated(),
        summary.duration.as_secs_f64()
    );

    match summary.failed_step() {
        None if summary.dry_run => println!("✅ Dry run completed"),
        None => println!("✅ Sync completed"),
        Some(step) => {
            println!("❌ Sync stopped at {}", step.table);
            if let Some(error) = &step.error {
                println!("   Error: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_args_default() {
        let args = SyncArgs { dry_run: false };
        assert!(!args.dry_run);
    }

    #[tokio::test]
    async fn test_missing_config_returns_config_exit_code() {
        let args = SyncArgs { dry_run: true };
        let code = args
            .execute("/nonexistent/starsync.toml", SyncMode::Incremental)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
