//! Reset-watermark command implementation
//!
//! This module implements the `reset-watermark` command, which sets a
//! table's watermark unconditionally so the next incremental run re-reads
//! everything changed after it.

use super::{load_or_report, report_error};
use crate::core::sync::SyncCoordinator;
use crate::domain::SyncTable;
use chrono::NaiveDateTime;
use clap::Args;

/// Arguments for the reset-watermark command
#[derive(Args, Debug)]
pub struct ResetWatermarkArgs {
    /// Table whose watermark is reset (e.g. film, customer, rental)
    #[arg(long)]
    pub table: SyncTable,

    /// New watermark, e.g. 2006-02-15T04:57:20 (defaults to sync.watermark_default)
    #[arg(long, value_parser = parse_timestamp)]
    pub to: Option<NaiveDateTime>,
}

/// Parse `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::default()))
        .map_err(|_| format!("Invalid timestamp '{value}'. Expected YYYY-MM-DDTHH:MM:SS"))
}

impl ResetWatermarkArgs {
    /// Execute the reset-watermark command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        if !self.table.has_watermark() {
            println!(
                "❌ {} has no watermark; bridge tables are refreshed by full-load only",
                self.table
            );
            return Ok(2);
        }

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let to = self.to.unwrap_or(config.sync.watermark_default);

        let coordinator = match SyncCoordinator::from_config(config) {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Connection setup", &e)),
        };

        let result = async {
            coordinator.target().test_connection().await?;
            coordinator.state_manager().reset(self.table, to).await
        }
        .await;
        if let Err(e) = coordinator.close().await {
            tracing::warn!(error = %e, "Failed to close connections cleanly");
        }

        match result {
            Ok(()) => {
                println!("✅ Watermark for {} set to {}", self.table, to);
                println!("   The next 'starsync incremental' re-reads rows changed after it");
                Ok(0)
            }
            Err(e) => Ok(report_error("Watermark reset", &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    #[test_case("2006-02-15T04:57:20" ; "iso")]
    #[test_case("2006-02-15 04:57:20" ; "mysql")]
    fn test_parse_timestamp(value: &str) {
        let expected = NaiveDate::from_ymd_opt(2006, 2, 15)
            .unwrap()
            .and_hms_opt(4, 57, 20)
            .unwrap();
        assert_eq!(parse_timestamp(value).unwrap(), expected);
    }

    #[test]
    fn test_parse_date_only() {
        let ts = parse_timestamp("2005-05-24").unwrap();
        assert_eq!(ts.to_string(), "2005-05-24 00:00:00");
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_bridge_table_is_rejected() {
        let args = ResetWatermarkArgs {
            table: SyncTable::FilmActor,
            to: None,
        };
        assert_eq!(args.execute("/nonexistent/starsync.toml").await.unwrap(), 2);
    }
}
