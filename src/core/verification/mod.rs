//! Source/target reconciliation
//!
//! This module compares row counts and payment sums between the OLTP source
//! and the analytics target after a load.

pub mod reconcile;
pub mod report;

pub use reconcile::Reconciler;
pub use report::{CheckKind, ReconciliationCheck, ReconciliationReport};
