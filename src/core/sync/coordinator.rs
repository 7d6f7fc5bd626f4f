//! Sync coordinator - main orchestrator for synchronization runs
//!
//! A run walks the configured tables in dependency order. Each table is one
//! step: build its batch from the source, write it to the target in one
//! transaction, then advance its watermark to the run start. Steps commit
//! independently; the first failed step ends the run and later steps are
//! not attempted.

use crate::adapters::database::create_source;
use crate::adapters::database::create_target_and_state;
use crate::adapters::database::traits::{SourceReader, StateStorage, TargetStore};
use crate::config::StarsyncConfig;
use crate::core::calendar::seed_calendar;
use crate::core::keys::KeyResolver;
use crate::core::state::StateManager;
use crate::core::sync::dimensions::DimensionSynchronizer;
use crate::core::sync::facts::FactSynchronizer;
use crate::core::sync::summary::{StepReport, StepStatus, SyncMode, SyncSummary};
use crate::domain::target::TargetBatch;
use crate::domain::{Result, StarsyncError, SyncTable};
use crate::{log_error_with_context, log_step_committed, log_step_start};
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Instant;

/// Current local time, the reference for watermarks
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Sync coordinator
pub struct SyncCoordinator {
    config: StarsyncConfig,
    source: Arc<dyn SourceReader + Send + Sync>,
    target: Arc<dyn TargetStore + Send + Sync>,
    state_manager: StateManager,
}

impl SyncCoordinator {
    /// Create a coordinator over explicit stores
    pub fn new(
        config: StarsyncConfig,
        source: Arc<dyn SourceReader + Send + Sync>,
        target: Arc<dyn TargetStore + Send + Sync>,
        state_storage: Arc<dyn StateStorage + Send + Sync>,
    ) -> Self {
        let state_manager = StateManager::new_with_storage(state_storage, config.sync.watermark_default);
        Self {
            config,
            source,
            target,
            state_manager,
        }
    }

    /// Create a coordinator over the MySQL source and PostgreSQL target
    ///
    /// # Errors
    ///
    /// Returns an error if either connection string is invalid.
    pub fn from_config(config: StarsyncConfig) -> Result<Self> {
        let source = create_source(&config)?;
        let (target, state_storage) = create_target_and_state(&config)?;
        Ok(Self::new(config, source, target, state_storage))
    }

    pub fn source(&self) -> &Arc<dyn SourceReader + Send + Sync> {
        &self.source
    }

    pub fn target(&self) -> &Arc<dyn TargetStore + Send + Sync> {
        &self.target
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.state_manager
    }

    /// Fail fast if either store is unreachable
    ///
    /// # Errors
    ///
    /// Returns a connection error naming the unreachable side.
    pub async fn test_connections(&self) -> Result<()> {
        self.source.test_connection().await?;
        self.target.test_connection().await?;
        Ok(())
    }

    /// Create the analytics schema and seed the calendar dimension
    ///
    /// Returns the number of calendar rows written (0 if already seeded).
    pub async fn initialize(&self) -> Result<u64> {
        self.test_connections().await?;
        self.target.ensure_schema().await?;

        seed_calendar(
            self.target.as_ref(),
            self.config.calendar.start_date,
            self.config.calendar.end_date,
        )
        .await
    }

    /// Insert-only load of every configured table
    pub async fn full_load(&self) -> Result<SyncSummary> {
        self.full_load_at(now()).await
    }

    /// [`SyncCoordinator::full_load`] with an explicit run timestamp
    pub async fn full_load_at(&self, run_at: NaiveDateTime) -> Result<SyncSummary> {
        self.run(SyncMode::Full, run_at).await
    }

    /// Upsert rows changed since each table's watermark
    ///
    /// Bridge tables are not refreshed incrementally.
    pub async fn incremental_sync(&self) -> Result<SyncSummary> {
        self.incremental_sync_at(now()).await
    }

    /// [`SyncCoordinator::incremental_sync`] with an explicit run timestamp
    pub async fn incremental_sync_at(&self, run_at: NaiveDateTime) -> Result<SyncSummary> {
        self.run(SyncMode::Incremental, run_at).await
    }

    /// Release both store connections
    pub async fn close(&self) -> Result<()> {
        let source = self.source.close().await;
        let target = self.target.close().await;
        source.and(target)
    }

    fn plan(&self, mode: SyncMode) -> Vec<SyncTable> {
        self.config
            .sync
            .ordered_tables()
            .into_iter()
            .filter(|t| mode == SyncMode::Full || !t.is_bridge())
            .collect()
    }

    /// Run every planned step
    ///
    /// Connection and lookup failures before the first step are returned as
    /// errors; a failed step is reported in the summary instead.
    async fn run(&self, mode: SyncMode, run_at: NaiveDateTime) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let dry_run = self.config.application.dry_run;
        let mut summary = SyncSummary::new(mode, run_at, dry_run);
        let tables = self.plan(mode);

        tracing::info!(
            mode = %mode,
            run_at = %run_at,
            dry_run,
            tables = tables.len(),
            "Starting sync run"
        );

        self.test_connections().await?;

        let dimensions = DimensionSynchronizer::load(self.source.as_ref()).await?;
        let facts = FactSynchronizer::load(self.source.as_ref()).await?;
        let mut keys: Option<KeyResolver> = None;

        let mut tables = tables.into_iter();
        for table in tables.by_ref() {
            if !table.is_dimension() && keys.is_none() {
                // Dimension steps are done; pick up the keys they assigned.
                keys = Some(KeyResolver::load(self.target.as_ref()).await?);
            }

            let report = self
                .run_step(mode, table, run_at, &dimensions, &facts, keys.as_ref())
                .await;
            let failed = !report.succeeded();
            summary.steps.push(report);

            if failed {
                break;
            }
        }
        summary
            .steps
            .extend(tables.map(StepReport::new));

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn run_step(
        &self,
        mode: SyncMode,
        table: SyncTable,
        run_at: NaiveDateTime,
        dimensions: &DimensionSynchronizer<'_>,
        facts: &FactSynchronizer<'_>,
        keys: Option<&KeyResolver>,
    ) -> StepReport {
        let mut report = StepReport::new(table);
        report.status = StepStatus::Running;
        log_step_start!(table, mode);
        let step_start = Instant::now();

        let batch = match self.build_batch(mode, table, dimensions, facts, keys).await {
            Ok(batch) => batch,
            Err(e) => {
                log_error_with_context!(&e, format!("Failed to read {table} from source"));
                report.status = StepStatus::RolledBack;
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.planned = batch.len();

        if self.config.application.dry_run {
            tracing::info!(
                table = %table,
                rows = batch.len(),
                "Dry run: batch not written"
            );
            report.status = StepStatus::Planned;
            return report;
        }

        match self.target.apply_batch(&batch, mode.write_mode()).await {
            Ok(outcome) => {
                report.status = StepStatus::Committed;
                report.inserted = outcome.inserted;
                report.updated = outcome.updated;
                report.skipped = outcome.skipped;
                log_step_committed!(table, outcome.inserted, outcome.updated, step_start.elapsed());
            }
            Err(e) => {
                log_error_with_context!(&e, format!("Batch for {table} rolled back"));
                report.status = StepStatus::RolledBack;
                report.error = Some(e.to_string());
                return report;
            }
        }

        if table.has_watermark() {
            match self.state_manager.advance(table, run_at).await {
                Ok(watermark) => report.watermark = Some(watermark),
                Err(e) => {
                    log_error_with_context!(&e, format!("Failed to advance {table} watermark"));
                    report.error = Some(e.to_string());
                }
            }
        }

        report
    }

    async fn build_batch(
        &self,
        mode: SyncMode,
        table: SyncTable,
        dimensions: &DimensionSynchronizer<'_>,
        facts: &FactSynchronizer<'_>,
        keys: Option<&KeyResolver>,
    ) -> Result<TargetBatch> {
        let since = match mode {
            SyncMode::Full => None,
            SyncMode::Incremental => {
                let watermark = self.state_manager.get(table).await?;
                tracing::debug!(table = %table, watermark = %watermark, "Reading changes since watermark");
                Some(watermark)
            }
        };

        if table.is_dimension() {
            return dimensions.batch(table, since).await;
        }

        let keys = keys.ok_or_else(|| {
            StarsyncError::Other(format!("Key resolver not loaded before {table} step"))
        })?;
        facts.batch(table, since, keys).await
    }
}
