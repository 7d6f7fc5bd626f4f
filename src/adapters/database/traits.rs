//! Store abstraction traits
//!
//! This module defines the traits that source and target adapters must
//! implement to work with starsync. The core only ever sees these traits,
//! so a run can be driven against MySQL/PostgreSQL or the in-memory stores.

use crate::core::state::watermark::Watermark;
use crate::domain::source::{
    Actor, Address, Category, City, Country, Customer, Film, FilmActor, FilmCategory, Inventory,
    Language, Payment, Rental, Store,
};
use crate::domain::target::{DimDate, KeyMap, TargetBatch, WriteMode};
use crate::domain::{Result, SyncTable};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Result of applying one table batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows whose natural key was new
    pub inserted: usize,

    /// Existing rows whose attributes changed
    pub updated: usize,

    /// Rows left untouched (already present in insert-only mode, or unchanged)
    pub skipped: usize,
}

/// Read-only access to the OLTP source
///
/// Methods taking `since` return every row when it is `None` and otherwise
/// only rows whose change timestamp is strictly greater than it.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Test the source connection
    ///
    /// # Errors
    ///
    /// Returns a connection error if the source is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// Films changed since a timestamp (`last_update`)
    async fn films(&self, since: Option<NaiveDateTime>) -> Result<Vec<Film>>;

    /// Actors changed since a timestamp (`last_update`)
    async fn actors(&self, since: Option<NaiveDateTime>) -> Result<Vec<Actor>>;

    /// Categories changed since a timestamp (`last_update`)
    async fn categories(&self, since: Option<NaiveDateTime>) -> Result<Vec<Category>>;

    /// Stores changed since a timestamp (`last_update`)
    async fn stores(&self, since: Option<NaiveDateTime>) -> Result<Vec<Store>>;

    /// Customers changed since a timestamp (`last_update`)
    async fn customers(&self, since: Option<NaiveDateTime>) -> Result<Vec<Customer>>;

    /// Rentals changed since a timestamp (later of `rental_date` and `last_update`)
    async fn rentals(&self, since: Option<NaiveDateTime>) -> Result<Vec<Rental>>;

    /// Payments made since a timestamp (`payment_date`)
    async fn payments(&self, since: Option<NaiveDateTime>) -> Result<Vec<Payment>>;

    /// All languages
    async fn languages(&self) -> Result<Vec<Language>>;

    /// All addresses
    async fn addresses(&self) -> Result<Vec<Address>>;

    /// All cities
    async fn cities(&self) -> Result<Vec<City>>;

    /// All countries
    async fn countries(&self) -> Result<Vec<Country>>;

    /// All inventory items
    async fn inventories(&self) -> Result<Vec<Inventory>>;

    /// All film/actor associations
    async fn film_actors(&self) -> Result<Vec<FilmActor>>;

    /// All film/category associations
    async fn film_categories(&self) -> Result<Vec<FilmCategory>>;

    /// Row count of the source entity behind a synchronized table
    async fn count(&self, table: SyncTable) -> Result<u64>;

    /// Sum of every payment amount
    async fn payment_total(&self) -> Result<Decimal>;

    /// Payment amount per store, joined through rental and inventory
    ///
    /// Payments whose store cannot be reached are not attributed to any store.
    async fn payment_totals_by_store(&self) -> Result<BTreeMap<i32, Decimal>>;

    /// Release the source connection
    async fn close(&self) -> Result<()>;
}

/// Read-write access to the star-schema analytics store
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Test the target connection
    ///
    /// # Errors
    ///
    /// Returns a connection error if the target is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// Create the analytics schema if it does not exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Whether `dim_date` holds at least one row
    async fn calendar_seeded(&self) -> Result<bool>;

    /// Insert calendar rows in one transaction, returning the number written
    async fn insert_calendar(&self, days: &[DimDate]) -> Result<u64>;

    /// Natural key → surrogate key map of a dimension table
    ///
    /// Returns an empty map for tables that are not dimensions.
    async fn dimension_keys(&self, table: SyncTable) -> Result<KeyMap>;

    /// Write one table batch inside a single transaction
    ///
    /// Either every row of the batch is applied and committed, or the
    /// transaction is rolled back and an error is returned.
    ///
    /// Bridge batches are always written insert-only, whatever `mode` says.
    async fn apply_batch(&self, batch: &TargetBatch, mode: WriteMode) -> Result<BatchOutcome>;

    /// Row count of a target table
    async fn count_rows(&self, table: SyncTable) -> Result<u64>;

    /// Sum of `fact_payment.amount`
    async fn payment_total(&self) -> Result<Decimal>;

    /// `fact_payment.amount` per `dim_store.store_id`
    ///
    /// Payments with a null store key are not attributed to any store.
    async fn payment_totals_by_store(&self) -> Result<BTreeMap<i32, Decimal>>;

    /// Release the target connection
    async fn close(&self) -> Result<()>;
}

/// State storage trait for watermark persistence
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Load a table's watermark
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(Watermark))` if found, `Ok(None)` if the table has
    /// never been synchronized.
    async fn load_watermark(&self, table: SyncTable) -> Result<Option<Watermark>>;

    /// Insert or replace a table's watermark
    async fn save_watermark(&self, watermark: &Watermark) -> Result<()>;

    /// Get all stored watermarks, ordered by table
    async fn get_all_watermarks(&self) -> Result<Vec<Watermark>>;
}
