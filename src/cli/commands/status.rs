//! Status command implementation
//!
//! This module implements the `status` command for displaying watermarks
//! and warehouse row counts.

use super::{load_or_report, report_error};
use crate::core::state::Watermark;
use crate::core::sync::SyncCoordinator;
use crate::domain::{Result, SyncTable};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let tables = config.sync.ordered_tables();

        let coordinator = match SyncCoordinator::from_config(config) {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Connection setup", &e)),
        };

        let result = Self::collect(&coordinator, &tables).await;
        if let Err(e) = coordinator.close().await {
            tracing::warn!(error = %e, "Failed to close connections cleanly");
        }

        let (watermarks, counts) = match result {
            Ok(r) => r,
            Err(e) => return Ok(report_error("Status", &e)),
        };

        println!("{:<16} {:<22} {:>10} {:<26}", "Table", "Target", "Rows", "Watermark");
        println!("{}", "-".repeat(78));

        for (table, rows) in counts {
            let watermark = if !table.has_watermark() {
                "n/a (full load only)".to_string()
            } else {
                watermarks
                    .iter()
                    .find(|w| w.table == table)
                    .map(|w| w.last_updated.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "Never".to_string())
            };

            println!(
                "{:<16} {:<22} {:>10} {:<26}",
                table.as_str(),
                table.target_table(),
                rows,
                watermark
            );
        }

        if watermarks.is_empty() {
            println!();
            println!("No sync history found.");
            println!("Run 'starsync full-load' to populate the warehouse.");
        }

        println!();
        Ok(0)
    }

    async fn collect(
        coordinator: &SyncCoordinator,
        tables: &[SyncTable],
    ) -> Result<(Vec<Watermark>, Vec<(SyncTable, u64)>)> {
        coordinator.target().test_connection().await?;

        let watermarks = coordinator.state_manager().all().await?;
        let mut counts = Vec::with_capacity(tables.len());
        for &table in tables {
            counts.push((table, coordinator.target().count_rows(table).await?));
        }

        Ok((watermarks, counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySource, InMemoryTarget, SourceData};
    use crate::adapters::database::traits::StateStorage;
    use crate::config::StarsyncConfig;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_collect_lists_watermarks_and_counts() {
        let target = Arc::new(InMemoryTarget::new());
        let at = NaiveDate::from_ymd_opt(2006, 2, 15)
            .unwrap()
            .and_hms_opt(5, 3, 42)
            .unwrap();
        target
            .save_watermark(&Watermark::new(SyncTable::Film, at))
            .await
            .unwrap();

        let coordinator = SyncCoordinator::new(
            StarsyncConfig::new(
                "mysql://etl@localhost/sakila".to_string(),
                "postgresql://etl@localhost/analytics".to_string(),
            ),
            Arc::new(InMemorySource::new(SourceData::default())),
            target.clone(),
            target,
        );

        let (watermarks, counts) =
            StatusArgs::collect(&coordinator, &[SyncTable::Film, SyncTable::Payment])
                .await
                .unwrap();

        assert_eq!(watermarks.len(), 1);
        assert_eq!(watermarks[0].last_updated, at);
        assert_eq!(counts, vec![(SyncTable::Film, 0), (SyncTable::Payment, 0)]);
    }
}
