//! Reconciliation report structures
//!
//! This module defines the structures for reporting reconciliation results.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a check compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Row counts; must match exactly
    Count,
    /// Money sums; may differ by the configured tolerance
    Amount,
}

/// One source/target comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationCheck {
    /// e.g. `film_count`, `payment_total`, `store_1_payment_total`
    pub name: String,
    pub kind: CheckKind,
    pub source_value: Decimal,
    pub target_value: Decimal,
    pub passed: bool,
}

impl ReconciliationCheck {
    /// Count check; passes iff both counts are equal
    pub fn count(name: impl Into<String>, source: u64, target: u64) -> Self {
        Self {
            name: name.into(),
            kind: CheckKind::Count,
            source_value: Decimal::from(source),
            target_value: Decimal::from(target),
            passed: source == target,
        }
    }

    /// Amount check; passes iff `|source - target| <= tolerance`
    pub fn amount(
        name: impl Into<String>,
        source: Decimal,
        target: Decimal,
        tolerance: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            kind: CheckKind::Amount,
            source_value: source,
            target_value: target,
            passed: (source - target).abs() <= tolerance,
        }
    }

    /// Signed `target - source`
    pub fn difference(&self) -> Decimal {
        self.target_value - self.source_value
    }
}

/// Reconciliation report comparing source and target aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// When the checks ran
    pub checked_at: NaiveDateTime,

    /// Requested reporting window in days; recorded but not applied to any check
    pub window_days: u32,

    /// Tolerance applied to amount checks
    pub amount_tolerance: Decimal,

    /// Checks in the order they ran
    pub checks: Vec<ReconciliationCheck>,

    /// Duration of reconciliation in milliseconds
    pub duration_ms: u64,
}

impl ReconciliationReport {
    /// Create an empty report
    pub fn new(checked_at: NaiveDateTime, window_days: u32, amount_tolerance: Decimal) -> Self {
        Self {
            checked_at,
            window_days,
            amount_tolerance,
            checks: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record a check
    pub fn push(&mut self, check: ReconciliationCheck) {
        self.checks.push(check);
    }

    /// Set the duration of reconciliation
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Checks that failed
    pub fn mismatches(&self) -> Vec<&ReconciliationCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Check if every comparison passed
    pub fn is_success(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Look up a check by name
    pub fn check(&self, name: &str) -> Option<&ReconciliationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Reconciliation Report\n");
        summary.push_str(&format!("  Checked at: {}\n", self.checked_at));
        summary.push_str(&format!("  Window: last {} days (informational)\n", self.window_days));
        summary.push_str(&format!("  Amount tolerance: {}\n", self.amount_tolerance));
        summary.push_str(&format!("  Duration: {} ms\n\n", self.duration_ms));

        summary.push_str(&format!(
            "  {:<28} {:>14} {:>14}\n",
            "check", "source", "target"
        ));
        for check in &self.checks {
            let mark = if check.passed { "✅" } else { "❌" };
            summary.push_str(&format!(
                "  {:<28} {:>14} {:>14} {}\n",
                check.name, check.source_value, check.target_value, mark
            ));
        }

        let mismatches = self.mismatches();
        if mismatches.is_empty() {
            summary.push_str("\n✅ No mismatches\n");
        } else {
            summary.push_str(&format!("\n❌ {} mismatch(es):\n", mismatches.len()));
            for (i, check) in mismatches.iter().enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: source {} vs target {} (diff {})\n",
                    i + 1,
                    check.name,
                    check.source_value,
                    check.target_value,
                    check.difference()
                ));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ReconciliationReport {
        ReconciliationReport::new(NaiveDateTime::default(), 30, Decimal::ONE)
    }

    #[test]
    fn test_count_check() {
        assert!(ReconciliationCheck::count("film_count", 1000, 1000).passed);
        assert!(!ReconciliationCheck::count("film_count", 1000, 999).passed);
    }

    #[test]
    fn test_amount_check_within_tolerance() {
        let source = Decimal::new(6741651, 2);
        let close = ReconciliationCheck::amount("payment_total", source, Decimal::new(6741551, 2), Decimal::ONE);
        let far = ReconciliationCheck::amount("payment_total", source, Decimal::new(6741550, 2), Decimal::ONE);

        assert!(close.passed);
        assert!(!far.passed);
        assert_eq!(far.difference(), Decimal::new(-101, 2));
    }

    #[test]
    fn test_mismatches_and_summary() {
        let mut report = report();
        report.push(ReconciliationCheck::count("film_count", 1000, 1000));
        report.push(ReconciliationCheck::count("rental_count", 16044, 16000));

        assert!(!report.is_success());
        assert_eq!(report.mismatches().len(), 1);
        assert_eq!(report.mismatches()[0].name, "rental_count");

        let text = report.format_summary();
        assert!(text.contains("rental_count"));
        assert!(text.contains("1 mismatch(es)"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = report();
        report.push(ReconciliationCheck::count("film_count", 2, 2));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["window_days"], 30);
        assert_eq!(json["checks"][0]["kind"], "count");
        assert_eq!(json["checks"][0]["passed"], true);
    }
}
