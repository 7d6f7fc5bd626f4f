//! State manager for watermark persistence
//!
//! The manager owns the "far past" default for tables that have never been
//! synchronized and enforces that automatic advances never move a watermark
//! backwards. Only [`StateManager::reset`] may do that.

use crate::adapters::database::traits::StateStorage;
use crate::core::state::watermark::Watermark;
use crate::domain::{Result, SyncTable};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// State manager for watermark persistence
pub struct StateManager {
    /// State storage backend
    storage: Arc<dyn StateStorage + Send + Sync>,

    /// Watermark assumed for tables with no stored row
    default_watermark: NaiveDateTime,
}

impl StateManager {
    /// Create a new StateManager with a state storage backend
    ///
    /// # Arguments
    ///
    /// * `storage` - State storage implementation
    /// * `default_watermark` - Sentinel returned for never-synchronized tables
    pub fn new_with_storage(
        storage: Arc<dyn StateStorage + Send + Sync>,
        default_watermark: NaiveDateTime,
    ) -> Self {
        Self {
            storage,
            default_watermark,
        }
    }

    /// Sentinel returned for never-synchronized tables
    pub fn default_watermark(&self) -> NaiveDateTime {
        self.default_watermark
    }

    /// Current watermark of a table, or the default sentinel if unset
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    pub async fn get(&self, table: SyncTable) -> Result<NaiveDateTime> {
        Ok(self
            .storage
            .load_watermark(table)
            .await?
            .map(|w| w.last_updated)
            .unwrap_or(self.default_watermark))
    }

    /// Advance a table's watermark after its step committed
    ///
    /// A timestamp older than the stored watermark is ignored, so the stored
    /// value never decreases. Returns the watermark in effect afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query or upsert fails.
    pub async fn advance(&self, table: SyncTable, to: NaiveDateTime) -> Result<NaiveDateTime> {
        if let Some(current) = self.storage.load_watermark(table).await? {
            if to < current.last_updated {
                tracing::warn!(
                    table = %table,
                    current = %current.last_updated,
                    requested = %to,
                    "Ignoring attempt to move watermark backwards"
                );
                return Ok(current.last_updated);
            }
        }

        self.storage
            .save_watermark(&Watermark::new(table, to))
            .await?;
        tracing::debug!(table = %table, watermark = %to, "Watermark advanced");
        Ok(to)
    }

    /// Set a table's watermark unconditionally
    ///
    /// This is an operator action: it may move the watermark backwards to
    /// force rows to be re-read by the next incremental run.
    pub async fn reset(&self, table: SyncTable, to: NaiveDateTime) -> Result<()> {
        tracing::info!(table = %table, watermark = %to, "Resetting watermark");
        self.storage
            .save_watermark(&Watermark::new(table, to))
            .await
    }

    /// Get all stored watermarks
    pub async fn all(&self) -> Result<Vec<Watermark>> {
        self.storage.get_all_watermarks().await
    }
}
