//! Reconciliation checker
//!
//! Recomputes row counts and payment sums on both sides and compares them.
//! Read-only: neither store is modified, and a mismatch is recorded in the
//! report rather than raised.

use crate::adapters::database::traits::{SourceReader, TargetStore};
use crate::core::sync::coordinator::now;
use crate::core::verification::report::{ReconciliationCheck, ReconciliationReport};
use crate::domain::{Result, StarsyncError, SyncTable};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Tables whose source and target row counts are compared, in report order
pub const COUNTED_TABLES: [SyncTable; 7] = [
    SyncTable::Film,
    SyncTable::Actor,
    SyncTable::Category,
    SyncTable::Store,
    SyncTable::Customer,
    SyncTable::Rental,
    SyncTable::Payment,
];

/// Reconciliation checker
pub struct Reconciler {
    source: Arc<dyn SourceReader + Send + Sync>,
    target: Arc<dyn TargetStore + Send + Sync>,
    amount_tolerance: Decimal,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Errors
    ///
    /// Returns a validation error if the tolerance is negative or not finite.
    pub fn new(
        source: Arc<dyn SourceReader + Send + Sync>,
        target: Arc<dyn TargetStore + Send + Sync>,
        amount_tolerance: f64,
    ) -> Result<Self> {
        let amount_tolerance = Decimal::try_from(amount_tolerance)
            .ok()
            .filter(|t| !t.is_sign_negative())
            .ok_or_else(|| {
                StarsyncError::Validation(format!("Invalid amount tolerance: {amount_tolerance}"))
            })?;

        Ok(Self {
            source,
            target,
            amount_tolerance,
        })
    }

    /// Run every check
    ///
    /// `window_days` is recorded in the report only.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be queried.
    pub async fn reconcile(&self, window_days: u32) -> Result<ReconciliationReport> {
        let start_time = Instant::now();
        let mut report = ReconciliationReport::new(now(), window_days, self.amount_tolerance);

        tracing::info!(window_days, "Starting reconciliation");

        for table in COUNTED_TABLES {
            let source = self.source.count(table).await?;
            let target = self.target.count_rows(table).await?;
            report.push(ReconciliationCheck::count(
                format!("{}_count", table.as_str()),
                source,
                target,
            ));
        }

        report.push(ReconciliationCheck::amount(
            "payment_total",
            self.source.payment_total().await?,
            self.target.payment_total().await?,
            self.amount_tolerance,
        ));

        let source_stores = self.source.payment_totals_by_store().await?;
        let target_stores = self.target.payment_totals_by_store().await?;
        let store_ids: BTreeSet<i32> = source_stores
            .keys()
            .chain(target_stores.keys())
            .copied()
            .collect();

        for store_id in store_ids {
            report.push(ReconciliationCheck::amount(
                format!("store_{store_id}_payment_total"),
                source_stores.get(&store_id).copied().unwrap_or(Decimal::ZERO),
                target_stores.get(&store_id).copied().unwrap_or(Decimal::ZERO),
                self.amount_tolerance,
            ));
        }

        report.set_duration(start_time.elapsed().as_millis() as u64);

        for check in report.mismatches() {
            tracing::warn!(
                check = %check.name,
                source = %check.source_value,
                target = %check.target_value,
                "Reconciliation mismatch"
            );
        }
        tracing::info!(
            checks = report.checks.len(),
            mismatches = report.mismatches().len(),
            duration_ms = report.duration_ms,
            "Reconciliation finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySource, InMemoryTarget, SourceData};

    fn reconciler(tolerance: f64) -> Result<Reconciler> {
        Reconciler::new(
            Arc::new(InMemorySource::new(SourceData::default())),
            Arc::new(InMemoryTarget::new()),
            tolerance,
        )
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        assert!(matches!(reconciler(-0.5), Err(StarsyncError::Validation(_))));
        assert!(reconciler(0.0).is_ok());
    }

    #[tokio::test]
    async fn test_empty_stores_reconcile() {
        let report = reconciler(1.0).unwrap().reconcile(7).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.window_days, 7);
        assert_eq!(report.checks.len(), COUNTED_TABLES.len() + 1);
        assert_eq!(report.checks[0].name, "film_count");
        assert_eq!(report.checks[7].name, "payment_total");
    }
}
