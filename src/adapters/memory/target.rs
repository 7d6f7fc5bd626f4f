//! In-memory star-schema store
//!
//! Batches are applied to a staged copy of the store and swapped in only once
//! every row succeeded, which gives the same all-or-nothing behaviour as a
//! database transaction.

use crate::adapters::database::traits::{BatchOutcome, StateStorage, TargetStore};
use crate::core::state::watermark::Watermark;
use crate::domain::target::{
    BridgeFilmActor, BridgeFilmCategory, DimActor, DimCategory, DimCustomer, DimDate, DimFilm,
    DimStore, FactPayment, FactRental, KeyMap, TargetBatch, WriteMode,
};
use crate::domain::{DateKey, Result, StarsyncError, SurrogateKey, SyncTable, TargetError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Rows keyed by natural key, each with the surrogate key assigned on insert
#[derive(Debug, Clone)]
struct KeyedTable<R> {
    rows: BTreeMap<i32, (SurrogateKey, R)>,
    last_key: i32,
}

impl<R> Default for KeyedTable<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_key: 0,
        }
    }
}

impl<R: Clone + PartialEq> KeyedTable<R> {
    fn apply(&mut self, natural_key: i32, row: &R, mode: WriteMode, outcome: &mut BatchOutcome) {
        match self.rows.get_mut(&natural_key) {
            Some((_, existing)) => match mode {
                WriteMode::Upsert if existing != row => {
                    *existing = row.clone();
                    outcome.updated += 1;
                }
                _ => outcome.skipped += 1,
            },
            None => {
                self.last_key += 1;
                self.rows
                    .insert(natural_key, (SurrogateKey::new(self.last_key), row.clone()));
                outcome.inserted += 1;
            }
        }
    }

    fn keys(&self) -> KeyMap {
        self.rows
            .iter()
            .map(|(natural, (surrogate, _))| (*natural, *surrogate))
            .collect()
    }

    fn get(&self, natural_key: i32) -> Option<(SurrogateKey, R)> {
        self.rows.get(&natural_key).cloned()
    }
}

#[derive(Debug, Clone, Default)]
struct TargetState {
    schema_created: bool,
    calendar: BTreeMap<DateKey, DimDate>,
    films: KeyedTable<DimFilm>,
    actors: KeyedTable<DimActor>,
    categories: KeyedTable<DimCategory>,
    stores: KeyedTable<DimStore>,
    customers: KeyedTable<DimCustomer>,
    film_actors: BTreeSet<BridgeFilmActor>,
    film_categories: BTreeSet<BridgeFilmCategory>,
    rentals: KeyedTable<FactRental>,
    payments: KeyedTable<FactPayment>,
    watermarks: BTreeMap<SyncTable, NaiveDateTime>,
}

impl TargetState {
    /// Applies `rows`, stopping with an error after half of them if `fail` is set
    fn apply<R, K>(
        table: &mut KeyedTable<R>,
        rows: &[R],
        natural_key: K,
        mode: WriteMode,
        fail: bool,
    ) -> Result<BatchOutcome>
    where
        R: Clone + PartialEq,
        K: Fn(&R) -> i32,
    {
        let mut outcome = BatchOutcome::default();
        for (i, row) in rows.iter().enumerate() {
            if fail && i >= rows.len() / 2 {
                return Err(injected_failure());
            }
            table.apply(natural_key(row), row, mode, &mut outcome);
        }
        if fail {
            return Err(injected_failure());
        }
        Ok(outcome)
    }

    fn insert_pairs<P: Ord + Copy>(
        set: &mut BTreeSet<P>,
        pairs: &[P],
        fail: bool,
    ) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for (i, pair) in pairs.iter().enumerate() {
            if fail && i >= pairs.len() / 2 {
                return Err(injected_failure());
            }
            if set.insert(*pair) {
                outcome.inserted += 1;
            } else {
                outcome.skipped += 1;
            }
        }
        if fail {
            return Err(injected_failure());
        }
        Ok(outcome)
    }
}

fn injected_failure() -> StarsyncError {
    TargetError::TransactionFailed("injected batch failure".to_string()).into()
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StarsyncError {
    StarsyncError::Other("in-memory target lock poisoned".to_string())
}

/// [`TargetStore`] and [`StateStorage`] held in memory
///
/// Surrogate keys are assigned from per-table counters starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    state: Mutex<TargetState>,
    failing: Mutex<HashSet<SyncTable>>,
    unreachable: Mutex<bool>,
}

impl InMemoryTarget {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every batch for `table` fail halfway and roll back
    pub fn fail_batches_for(&self, table: SyncTable) -> Result<()> {
        self.failing.lock().map_err(poisoned)?.insert(table);
        Ok(())
    }

    /// Stops injecting failures
    pub fn clear_failures(&self) -> Result<()> {
        self.failing.lock().map_err(poisoned)?.clear();
        Ok(())
    }

    /// Makes every subsequent call fail with a connection error
    pub fn set_unreachable(&self, unreachable: bool) -> Result<()> {
        *self.unreachable.lock().map_err(poisoned)? = unreachable;
        Ok(())
    }

    /// `dim_film` row and its surrogate key
    pub fn film(&self, film_id: i32) -> Result<Option<(SurrogateKey, DimFilm)>> {
        Ok(self.lock()?.films.get(film_id))
    }

    /// `dim_customer` row and its surrogate key
    pub fn customer(&self, customer_id: i32) -> Result<Option<(SurrogateKey, DimCustomer)>> {
        Ok(self.lock()?.customers.get(customer_id))
    }

    /// `dim_store` row and its surrogate key
    pub fn store(&self, store_id: i32) -> Result<Option<(SurrogateKey, DimStore)>> {
        Ok(self.lock()?.stores.get(store_id))
    }

    /// `fact_rental` row
    pub fn rental(&self, rental_id: i32) -> Result<Option<FactRental>> {
        Ok(self.lock()?.rentals.get(rental_id).map(|(_, row)| row))
    }

    /// `fact_payment` row
    pub fn payment(&self, payment_id: i32) -> Result<Option<FactPayment>> {
        Ok(self.lock()?.payments.get(payment_id).map(|(_, row)| row))
    }

    /// `dim_date` row
    pub fn calendar_day(&self, key: DateKey) -> Result<Option<DimDate>> {
        Ok(self.lock()?.calendar.get(&key).cloned())
    }

    /// Number of `dim_date` rows
    pub fn calendar_len(&self) -> Result<usize> {
        Ok(self.lock()?.calendar.len())
    }

    /// Whether `ensure_schema` has run
    pub fn schema_created(&self) -> Result<bool> {
        Ok(self.lock()?.schema_created)
    }

    fn lock(&self) -> Result<MutexGuard<'_, TargetState>> {
        if *self.unreachable.lock().map_err(poisoned)? {
            return Err(TargetError::ConnectionFailed("target is unreachable".to_string()).into());
        }
        self.state.lock().map_err(poisoned)
    }

    fn is_failing(&self, table: SyncTable) -> Result<bool> {
        Ok(self.failing.lock().map_err(poisoned)?.contains(&table))
    }
}

#[async_trait]
impl TargetStore for InMemoryTarget {
    async fn test_connection(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.lock()?.schema_created = true;
        Ok(())
    }

    async fn calendar_seeded(&self) -> Result<bool> {
        Ok(!self.lock()?.calendar.is_empty())
    }

    async fn insert_calendar(&self, days: &[DimDate]) -> Result<u64> {
        let mut state = self.lock()?;
        let mut inserted = 0;
        for day in days {
            if !state.calendar.contains_key(&day.date_key) {
                state.calendar.insert(day.date_key, day.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn dimension_keys(&self, table: SyncTable) -> Result<KeyMap> {
        let state = self.lock()?;
        Ok(match table {
            SyncTable::Film => state.films.keys(),
            SyncTable::Actor => state.actors.keys(),
            SyncTable::Category => state.categories.keys(),
            SyncTable::Store => state.stores.keys(),
            SyncTable::Customer => state.customers.keys(),
            _ => KeyMap::new(),
        })
    }

    async fn apply_batch(&self, batch: &TargetBatch, mode: WriteMode) -> Result<BatchOutcome> {
        let fail = self.is_failing(batch.table())?;
        let mut state = self.lock()?;
        let mut staged = state.clone();

        let outcome = match batch {
            TargetBatch::Films(rows) => {
                TargetState::apply(&mut staged.films, rows, |r| r.film_id, mode, fail)
            }
            TargetBatch::Actors(rows) => {
                TargetState::apply(&mut staged.actors, rows, |r| r.actor_id, mode, fail)
            }
            TargetBatch::Categories(rows) => {
                TargetState::apply(&mut staged.categories, rows, |r| r.category_id, mode, fail)
            }
            TargetBatch::Stores(rows) => {
                TargetState::apply(&mut staged.stores, rows, |r| r.store_id, mode, fail)
            }
            TargetBatch::Customers(rows) => {
                TargetState::apply(&mut staged.customers, rows, |r| r.customer_id, mode, fail)
            }
            TargetBatch::FilmActors(pairs) => {
                TargetState::insert_pairs(&mut staged.film_actors, pairs, fail)
            }
            TargetBatch::FilmCategories(pairs) => {
                TargetState::insert_pairs(&mut staged.film_categories, pairs, fail)
            }
            TargetBatch::Rentals(rows) => {
                TargetState::apply(&mut staged.rentals, rows, |r| r.rental_id, mode, fail)
            }
            TargetBatch::Payments(rows) => {
                TargetState::apply(&mut staged.payments, rows, |r| r.payment_id, mode, fail)
            }
        }
        .map_err(|e| StarsyncError::batch_write(batch.table().target_table(), e))?;

        *state = staged;
        Ok(outcome)
    }

    async fn count_rows(&self, table: SyncTable) -> Result<u64> {
        let state = self.lock()?;
        let count = match table {
            SyncTable::Film => state.films.rows.len(),
            SyncTable::Actor => state.actors.rows.len(),
            SyncTable::Category => state.categories.rows.len(),
            SyncTable::Store => state.stores.rows.len(),
            SyncTable::Customer => state.customers.rows.len(),
            SyncTable::FilmActor => state.film_actors.len(),
            SyncTable::FilmCategory => state.film_categories.len(),
            SyncTable::Rental => state.rentals.rows.len(),
            SyncTable::Payment => state.payments.rows.len(),
        };
        Ok(count as u64)
    }

    async fn payment_total(&self) -> Result<Decimal> {
        Ok(self
            .lock()?
            .payments
            .rows
            .values()
            .map(|(_, p)| p.amount)
            .sum())
    }

    async fn payment_totals_by_store(&self) -> Result<BTreeMap<i32, Decimal>> {
        let state = self.lock()?;
        let store_ids: HashMap<SurrogateKey, i32> = state
            .stores
            .rows
            .iter()
            .map(|(store_id, (key, _))| (*key, *store_id))
            .collect();

        let mut totals = BTreeMap::new();
        for (_, payment) in state.payments.rows.values() {
            if let Some(store_id) = payment.store_key.and_then(|k| store_ids.get(&k)) {
                *totals.entry(*store_id).or_insert(Decimal::ZERO) += payment.amount;
            }
        }
        Ok(totals)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl StateStorage for InMemoryTarget {
    async fn load_watermark(&self, table: SyncTable) -> Result<Option<Watermark>> {
        Ok(self
            .lock()?
            .watermarks
            .get(&table)
            .map(|ts| Watermark::new(table, *ts)))
    }

    async fn save_watermark(&self, watermark: &Watermark) -> Result<()> {
        self.lock()?
            .watermarks
            .insert(watermark.table, watermark.last_updated);
        Ok(())
    }

    async fn get_all_watermarks(&self) -> Result<Vec<Watermark>> {
        Ok(self
            .lock()?
            .watermarks
            .iter()
            .map(|(table, ts)| Watermark::new(*table, *ts))
            .collect())
    }
}
