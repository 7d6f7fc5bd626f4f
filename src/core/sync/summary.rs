//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting sync results.

use crate::domain::target::WriteMode;
use crate::domain::SyncTable;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Kind of synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Insert-only seeding of every table
    Full,
    /// Changed-since-watermark upserts
    Incremental,
}

impl SyncMode {
    pub fn write_mode(self) -> WriteMode {
        match self {
            SyncMode::Full => WriteMode::InsertOnly,
            SyncMode::Incremental => WriteMode::Upsert,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => write!(f, "full"),
            SyncMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Lifecycle of one table step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    Running,
    Committed,
    RolledBack,
    /// Dry run: batch built, nothing written
    Planned,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::NotStarted => "not started",
            StepStatus::Running => "running",
            StepStatus::Committed => "committed",
            StepStatus::RolledBack => "rolled back",
            StepStatus::Planned => "planned",
        };
        f.write_str(s)
    }
}

/// Outcome of one table step
///
/// A step whose batch committed but whose watermark could not be stored
/// stays [`StepStatus::Committed`] with `error` set and `watermark` empty.
/// Its rows are in the target, yet the step counts as failed and the next
/// run re-reads the same changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub table: SyncTable,
    pub status: StepStatus,

    /// Rows in the batch handed to the target
    pub planned: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,

    /// Watermark stored after the commit
    pub watermark: Option<NaiveDateTime>,

    /// Set on any failure, including a watermark that did not advance
    pub error: Option<String>,
}

impl StepReport {
    pub fn new(table: SyncTable) -> Self {
        Self {
            table,
            status: StepStatus::NotStarted,
            planned: 0,
            inserted: 0,
            updated: 0,
            skipped: 0,
            watermark: None,
            error: None,
        }
    }

    /// Committed (or planned, in a dry run) without error
    pub fn succeeded(&self) -> bool {
        matches!(self.status, StepStatus::Committed | StepStatus::Planned) && self.error.is_none()
    }
}

/// Summary of a synchronization run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub mode: SyncMode,

    /// Run start; committed tables advance their watermark to it
    pub run_at: NaiveDateTime,
    pub dry_run: bool,
    pub steps: Vec<StepReport>,
    pub duration: Duration,
}

impl SyncSummary {
    pub fn new(mode: SyncMode, run_at: NaiveDateTime, dry_run: bool) -> Self {
        Self {
            mode,
            run_at,
            dry_run,
            steps: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// True iff every attempted step committed
    pub fn is_successful(&self) -> bool {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::NotStarted)
            .all(StepReport::succeeded)
    }

    /// The step that stopped the run, if any
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| s.status != StepStatus::NotStarted && !s.succeeded())
    }

    pub fn step(&self, table: SyncTable) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.table == table)
    }

    pub fn total_inserted(&self) -> usize {
        self.steps.iter().map(|s| s.inserted).sum()
    }

    pub fn total_updated(&self) -> usize {
        self.steps.iter().map(|s| s.updated).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            mode = %self.mode,
            run_at = %self.run_at,
            dry_run = self.dry_run,
            steps = self.steps.len(),
            inserted = self.total_inserted(),
            updated = self.total_updated(),
            duration_ms = self.duration.as_millis() as u64,
            "Sync run finished"
        );

        if let Some(step) = self.failed_step() {
            tracing::warn!(
                table = %step.table,
                status = %step.status,
                error = step.error.as_deref().unwrap_or("unknown"),
                "Sync run stopped at failed step"
            );
        }
    }
}
