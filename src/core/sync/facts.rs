//! Fact and bridge synchronizer
//!
//! Foreign keys are resolved through the [`KeyResolver`]; film and store
//! references go through inventory (payments additionally through their
//! rental). An unresolved reference becomes a null key and never drops a fact
//! row. Bridge pairs need both keys, so unresolved pairs are skipped.

use crate::adapters::database::traits::SourceReader;
use crate::core::keys::KeyResolver;
use crate::core::sync::derive::{date_key, rental_duration_days};
use crate::domain::source::{FilmActor, FilmCategory, Inventory, Payment, Rental};
use crate::domain::target::{
    BridgeFilmActor, BridgeFilmCategory, FactPayment, FactRental, TargetBatch,
};
use crate::domain::{Result, StarsyncError, SyncTable};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// inventory_id → (film_id, store_id)
pub type InventoryMap = HashMap<i32, (Option<i32>, Option<i32>)>;

pub fn inventory_map(inventories: Vec<Inventory>) -> InventoryMap {
    inventories
        .into_iter()
        .map(|i| (i.inventory_id, (i.film_id, i.store_id)))
        .collect()
}

pub fn rental_rows(rentals: Vec<Rental>, inventory: &InventoryMap, keys: &KeyResolver) -> Vec<FactRental> {
    rentals
        .into_iter()
        .map(|r| {
            let (film_id, store_id) = r
                .inventory_id
                .and_then(|id| inventory.get(&id).copied())
                .unwrap_or((None, None));

            FactRental {
                rental_id: r.rental_id,
                date_key_rented: date_key(r.rental_date),
                date_key_returned: date_key(r.return_date),
                film_key: keys.film(film_id),
                store_key: keys.store(store_id),
                customer_key: keys.customer(r.customer_id),
                staff_id: r.staff_id,
                rental_duration_days: rental_duration_days(r.rental_date, r.return_date),
            }
        })
        .collect()
}

/// `rental_to_inventory` maps every source rental_id to its inventory_id
pub fn payment_rows(
    payments: Vec<Payment>,
    rental_to_inventory: &HashMap<i32, Option<i32>>,
    inventory: &InventoryMap,
    keys: &KeyResolver,
) -> Vec<FactPayment> {
    payments
        .into_iter()
        .map(|p| {
            let store_id = p
                .rental_id
                .and_then(|id| rental_to_inventory.get(&id).copied().flatten())
                .and_then(|id| inventory.get(&id))
                .and_then(|(_, store_id)| *store_id);

            FactPayment {
                payment_id: p.payment_id,
                date_key_paid: date_key(p.payment_date),
                customer_key: keys.customer(p.customer_id),
                store_key: keys.store(store_id),
                staff_id: p.staff_id,
                amount: p.amount,
            }
        })
        .collect()
}

pub fn film_actor_rows(pairs: Vec<FilmActor>, keys: &KeyResolver) -> Vec<BridgeFilmActor> {
    let total = pairs.len();
    let rows: Vec<BridgeFilmActor> = pairs
        .into_iter()
        .filter_map(|p| {
            Some(BridgeFilmActor {
                film_key: keys.film(Some(p.film_id))?,
                actor_key: keys.actor(Some(p.actor_id))?,
            })
        })
        .collect();

    if rows.len() < total {
        tracing::debug!(
            table = "film_actor",
            unresolved = total - rows.len(),
            "Skipping bridge pairs with unresolved keys"
        );
    }
    rows
}

pub fn film_category_rows(pairs: Vec<FilmCategory>, keys: &KeyResolver) -> Vec<BridgeFilmCategory> {
    let total = pairs.len();
    let rows: Vec<BridgeFilmCategory> = pairs
        .into_iter()
        .filter_map(|p| {
            Some(BridgeFilmCategory {
                film_key: keys.film(Some(p.film_id))?,
                category_key: keys.category(Some(p.category_id))?,
            })
        })
        .collect();

    if rows.len() < total {
        tracing::debug!(
            table = "film_category",
            unresolved = total - rows.len(),
            "Skipping bridge pairs with unresolved keys"
        );
    }
    rows
}

/// Builds fact and bridge batches from the source
pub struct FactSynchronizer<'a> {
    source: &'a dyn SourceReader,
    inventory: InventoryMap,
}

impl<'a> FactSynchronizer<'a> {
    /// Read the inventory lookup
    ///
    /// # Errors
    ///
    /// Returns an error if inventory cannot be read.
    pub async fn load(source: &'a dyn SourceReader) -> Result<Self> {
        Ok(Self {
            source,
            inventory: inventory_map(source.inventories().await?),
        })
    }

    /// Fact rows changed after `since` (every row when `None`), or every
    /// bridge pair
    ///
    /// # Errors
    ///
    /// Returns an error if a source read fails or `table` is a dimension.
    pub async fn batch(
        &self,
        table: SyncTable,
        since: Option<NaiveDateTime>,
        keys: &KeyResolver,
    ) -> Result<TargetBatch> {
        let batch = match table {
            SyncTable::Rental => TargetBatch::Rentals(rental_rows(
                self.source.rentals(since).await?,
                &self.inventory,
                keys,
            )),
            SyncTable::Payment => {
                let rental_to_inventory = self
                    .source
                    .rentals(None)
                    .await?
                    .into_iter()
                    .map(|r| (r.rental_id, r.inventory_id))
                    .collect();
                TargetBatch::Payments(payment_rows(
                    self.source.payments(since).await?,
                    &rental_to_inventory,
                    &self.inventory,
                    keys,
                ))
            }
            SyncTable::FilmActor => {
                TargetBatch::FilmActors(film_actor_rows(self.source.film_actors().await?, keys))
            }
            SyncTable::FilmCategory => TargetBatch::FilmCategories(film_category_rows(
                self.source.film_categories().await?,
                keys,
            )),
            other => {
                return Err(StarsyncError::Other(format!(
                    "{other} is not a fact or bridge table"
                )))
            }
        };

        Ok(batch)
    }
}
