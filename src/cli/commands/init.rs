//! Init command implementation
//!
//! This module implements the `init` command, which creates the analytics
//! schema and seeds the calendar dimension.

use super::{load_or_report, report_error};
use crate::core::sync::SyncCoordinator;
use clap::Args;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config = %config_path, "Initializing analytics store");

        println!("📝 Initializing analytics store");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let (start, end) = (config.calendar.start_date, config.calendar.end_date);

        let coordinator = match SyncCoordinator::from_config(config) {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Connection setup", &e)),
        };

        let result = coordinator.initialize().await;
        if let Err(e) = coordinator.close().await {
            tracing::warn!(error = %e, "Failed to close connections cleanly");
        }

        match result {
            Ok(0) => {
                println!("✅ Schema ready");
                println!("   Calendar dimension already seeded, nothing to do");
                Ok(0)
            }
            Ok(rows) => {
                println!("✅ Schema ready");
                println!("   Seeded {} calendar day(s) from {} to {}", rows, start, end);
                println!();
                println!("Next steps:");
                println!("  1. Run the first load: starsync full-load");
                println!("  2. Schedule incremental runs: starsync incremental");
                println!("  3. Check the warehouse: starsync validate");
                Ok(0)
            }
            Err(e) => Ok(report_error("Initialization", &e)),
        }
    }
}
