//! Validate command implementation
//!
//! This module implements the `validate` command, which reconciles the
//! warehouse against the source.

use super::{load_or_report, report_error};
use crate::core::sync::SyncCoordinator;
use crate::core::verification::{Reconciler, ReconciliationReport};
use crate::domain::Result;
use clap::Args;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Reporting window in days (defaults to validation.default_days)
    #[arg(long)]
    pub days: Option<u32>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let days = self.days.unwrap_or(config.validation.default_days);
        let tolerance = config.validation.amount_tolerance;

        tracing::info!(days, tolerance, "Validating analytics store");

        let coordinator = match SyncCoordinator::from_config(config) {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Connection setup", &e)),
        };

        let result = Self::reconcile(&coordinator, days, tolerance).await;
        if let Err(e) = coordinator.close().await {
            tracing::warn!(error = %e, "Failed to close connections cleanly");
        }

        let report = match result {
            Ok(r) => r,
            Err(e) => return Ok(report_error("Reconciliation", &e)),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.format_summary());
        }

        Ok(if report.is_success() { 0 } else { 1 })
    }

    async fn reconcile(
        coordinator: &SyncCoordinator,
        days: u32,
        tolerance: f64,
    ) -> Result<ReconciliationReport> {
        coordinator.test_connections().await?;
        let reconciler = Reconciler::new(
            coordinator.source().clone(),
            coordinator.target().clone(),
            tolerance,
        )?;
        reconciler.reconcile(days).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_defaults() {
        let args = ValidateArgs {
            days: None,
            json: false,
        };
        assert!(args.days.is_none());
        assert!(!args.json);
    }

    #[tokio::test]
    async fn test_missing_config_returns_config_exit_code() {
        let args = ValidateArgs {
            days: Some(7),
            json: true,
        };
        assert_eq!(args.execute("/nonexistent/starsync.toml").await.unwrap(), 2);
    }
}
