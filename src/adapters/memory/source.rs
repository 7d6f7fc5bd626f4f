//! In-memory OLTP source

use crate::adapters::database::traits::SourceReader;
use crate::domain::source::{
    Actor, Address, Category, City, Country, Customer, Film, FilmActor, FilmCategory, Inventory,
    Language, Payment, Rental, Store,
};
use crate::domain::{Result, SourceError, StarsyncError, SyncTable};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Contents of an in-memory Sakila source
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub films: Vec<Film>,
    pub actors: Vec<Actor>,
    pub categories: Vec<Category>,
    pub languages: Vec<Language>,
    pub stores: Vec<Store>,
    pub addresses: Vec<Address>,
    pub cities: Vec<City>,
    pub countries: Vec<Country>,
    pub customers: Vec<Customer>,
    pub inventories: Vec<Inventory>,
    pub rentals: Vec<Rental>,
    pub payments: Vec<Payment>,
    pub film_actors: Vec<FilmActor>,
    pub film_categories: Vec<FilmCategory>,
}

/// [`SourceReader`] over a [`SourceData`] held in memory
///
/// The data can be mutated between runs with [`InMemorySource::update`] to
/// simulate OLTP activity.
#[derive(Debug, Default)]
pub struct InMemorySource {
    data: Mutex<SourceData>,
    unreachable: Mutex<bool>,
}

fn changed_after(changed_at: Option<NaiveDateTime>, since: Option<NaiveDateTime>) -> bool {
    match since {
        None => true,
        Some(since) => changed_at.is_some_and(|ts| ts > since),
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StarsyncError {
    StarsyncError::Other("in-memory source lock poisoned".to_string())
}

impl InMemorySource {
    /// Creates a source holding `data`
    pub fn new(data: SourceData) -> Self {
        Self {
            data: Mutex::new(data),
            unreachable: Mutex::new(false),
        }
    }

    /// Applies a mutation to the source data
    pub fn update(&self, f: impl FnOnce(&mut SourceData)) -> Result<()> {
        let mut data = self.data.lock().map_err(poisoned)?;
        f(&mut data);
        Ok(())
    }

    /// Makes every subsequent call fail with a connection error
    pub fn set_unreachable(&self, unreachable: bool) -> Result<()> {
        *self.unreachable.lock().map_err(poisoned)? = unreachable;
        Ok(())
    }

    fn read(&self) -> Result<MutexGuard<'_, SourceData>> {
        if *self.unreachable.lock().map_err(poisoned)? {
            return Err(SourceError::ConnectionFailed("source is unreachable".to_string()).into());
        }
        self.data.lock().map_err(poisoned)
    }
}

#[async_trait]
impl SourceReader for InMemorySource {
    async fn test_connection(&self) -> Result<()> {
        self.read().map(|_| ())
    }

    async fn films(&self, since: Option<NaiveDateTime>) -> Result<Vec<Film>> {
        Ok(self
            .read()?
            .films
            .iter()
            .filter(|f| changed_after(Some(f.last_update), since))
            .cloned()
            .collect())
    }

    async fn actors(&self, since: Option<NaiveDateTime>) -> Result<Vec<Actor>> {
        Ok(self
            .read()?
            .actors
            .iter()
            .filter(|a| changed_after(Some(a.last_update), since))
            .cloned()
            .collect())
    }

    async fn categories(&self, since: Option<NaiveDateTime>) -> Result<Vec<Category>> {
        Ok(self
            .read()?
            .categories
            .iter()
            .filter(|c| changed_after(Some(c.last_update), since))
            .cloned()
            .collect())
    }

    async fn stores(&self, since: Option<NaiveDateTime>) -> Result<Vec<Store>> {
        Ok(self
            .read()?
            .stores
            .iter()
            .filter(|s| changed_after(Some(s.last_update), since))
            .cloned()
            .collect())
    }

    async fn customers(&self, since: Option<NaiveDateTime>) -> Result<Vec<Customer>> {
        Ok(self
            .read()?
            .customers
            .iter()
            .filter(|c| changed_after(Some(c.last_update), since))
            .cloned()
            .collect())
    }

    async fn rentals(&self, since: Option<NaiveDateTime>) -> Result<Vec<Rental>> {
        Ok(self
            .read()?
            .rentals
            .iter()
            .filter(|r| changed_after(r.changed_at(), since))
            .cloned()
            .collect())
    }

    async fn payments(&self, since: Option<NaiveDateTime>) -> Result<Vec<Payment>> {
        Ok(self
            .read()?
            .payments
            .iter()
            .filter(|p| changed_after(p.payment_date, since))
            .cloned()
            .collect())
    }

    async fn languages(&self) -> Result<Vec<Language>> {
        Ok(self.read()?.languages.clone())
    }

    async fn addresses(&self) -> Result<Vec<Address>> {
        Ok(self.read()?.addresses.clone())
    }

    async fn cities(&self) -> Result<Vec<City>> {
        Ok(self.read()?.cities.clone())
    }

    async fn countries(&self) -> Result<Vec<Country>> {
        Ok(self.read()?.countries.clone())
    }

    async fn inventories(&self) -> Result<Vec<Inventory>> {
        Ok(self.read()?.inventories.clone())
    }

    async fn film_actors(&self) -> Result<Vec<FilmActor>> {
        Ok(self.read()?.film_actors.clone())
    }

    async fn film_categories(&self) -> Result<Vec<FilmCategory>> {
        Ok(self.read()?.film_categories.clone())
    }

    async fn count(&self, table: SyncTable) -> Result<u64> {
        let data = self.read()?;
        let count = match table {
            SyncTable::Film => data.films.len(),
            SyncTable::Actor => data.actors.len(),
            SyncTable::Category => data.categories.len(),
            SyncTable::Store => data.stores.len(),
            SyncTable::Customer => data.customers.len(),
            SyncTable::FilmActor => data.film_actors.len(),
            SyncTable::FilmCategory => data.film_categories.len(),
            SyncTable::Rental => data.rentals.len(),
            SyncTable::Payment => data.payments.len(),
        };
        Ok(count as u64)
    }

    async fn payment_total(&self) -> Result<Decimal> {
        Ok(self.read()?.payments.iter().map(|p| p.amount).sum())
    }

    async fn payment_totals_by_store(&self) -> Result<BTreeMap<i32, Decimal>> {
        let data = self.read()?;
        let inventory_store: HashMap<i32, i32> = data
            .inventories
            .iter()
            .filter_map(|i| Some((i.inventory_id, i.store_id?)))
            .collect();
        let rental_store: HashMap<i32, i32> = data
            .rentals
            .iter()
            .filter_map(|r| Some((r.rental_id, *inventory_store.get(&r.inventory_id?)?)))
            .collect();

        let mut totals = BTreeMap::new();
        for payment in &data.payments {
            if let Some(store_id) = payment.rental_id.and_then(|id| rental_store.get(&id)) {
                *totals.entry(*store_id).or_insert(Decimal::ZERO) += payment.amount;
            }
        }
        Ok(totals)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2005, 7, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn rental(rental_id: i32, inventory_id: i32, rented: u32, updated: u32) -> Rental {
        Rental {
            rental_id,
            rental_date: Some(at(rented)),
            inventory_id: Some(inventory_id),
            customer_id: Some(1),
            return_date: None,
            staff_id: Some(1),
            last_update: Some(at(updated)),
        }
    }

    fn payment(payment_id: i32, rental_id: Option<i32>, cents: i64) -> Payment {
        Payment {
            payment_id,
            customer_id: Some(1),
            staff_id: Some(1),
            rental_id,
            amount: Decimal::new(cents, 2),
            payment_date: Some(at(1)),
        }
    }

    #[tokio::test]
    async fn test_rentals_filter_on_either_timestamp() {
        let source = InMemorySource::new(SourceData {
            rentals: vec![rental(1, 1, 1, 1), rental(2, 1, 1, 9), rental(3, 1, 8, 8)],
            ..SourceData::default()
        });

        let changed: Vec<i32> = source
            .rentals(Some(at(5)))
            .await
            .unwrap()
            .iter()
            .map(|r| r.rental_id)
            .collect();
        assert_eq!(changed, vec![2, 3]);
        assert_eq!(source.rentals(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_payment_totals_by_store_follow_inventory() {
        let source = InMemorySource::new(SourceData {
            inventories: vec![
                Inventory { inventory_id: 10, film_id: Some(1), store_id: Some(1) },
                Inventory { inventory_id: 20, film_id: Some(1), store_id: Some(2) },
            ],
            rentals: vec![rental(1, 10, 1, 1), rental(2, 20, 1, 1)],
            payments: vec![
                payment(1, Some(1), 299),
                payment(2, Some(2), 499),
                payment(3, Some(2), 100),
                payment(4, None, 1000),
            ],
            ..SourceData::default()
        });

        let totals = source.payment_totals_by_store().await.unwrap();
        assert_eq!(totals.get(&1), Some(&Decimal::new(299, 2)));
        assert_eq!(totals.get(&2), Some(&Decimal::new(599, 2)));
        assert_eq!(source.payment_total().await.unwrap(), Decimal::new(1898, 2));
    }

    #[tokio::test]
    async fn test_unreachable_source() {
        let source = InMemorySource::default();
        source.set_unreachable(true).unwrap();
        let err = source.test_connection().await.unwrap_err();
        assert!(err.is_connection());
    }
}
