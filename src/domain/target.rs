//! Rows of the star-schema analytics store
//!
//! Row structs carry natural keys and attributes but not their own surrogate
//! key: the store assigns it on insert and the synchronizers only learn it
//! through the key resolver. Foreign keys to other dimensions are surrogate
//! keys and are `None` when the referenced dimension row was unresolvable.

use crate::domain::ids::{DateKey, SurrogateKey};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Natural key → surrogate key lookup for one dimension
pub type KeyMap = std::collections::HashMap<i32, SurrogateKey>;

/// `dim_date` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimDate {
    pub date_key: DateKey,
    pub date: NaiveDate,
    pub year: i32,
    pub quarter: i32,
    pub month: i32,
    pub day_of_month: i32,
    /// Monday = 0
    pub day_of_week: i32,
    pub is_weekend: bool,
}

/// `dim_film` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimFilm {
    pub film_id: i32,
    pub title: String,
    pub rating: Option<String>,
    pub length: Option<i32>,
    pub language: String,
    pub release_year: Option<String>,
    pub last_update: NaiveDateTime,
}

/// `dim_actor` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimActor {
    pub actor_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub last_update: NaiveDateTime,
}

/// `dim_category` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCategory {
    pub category_id: i32,
    pub name: String,
    pub last_update: NaiveDateTime,
}

/// `dim_store` row, with city and country denormalized from the address chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimStore {
    pub store_id: i32,
    pub city: Option<String>,
    pub country: Option<String>,
    pub last_update: NaiveDateTime,
}

/// `dim_customer` row, with city and country denormalized from the address chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCustomer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub city: Option<String>,
    pub country: Option<String>,
    pub last_update: NaiveDateTime,
}

/// `bridge_film_actor` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BridgeFilmActor {
    pub film_key: SurrogateKey,
    pub actor_key: SurrogateKey,
}

/// `bridge_film_category` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BridgeFilmCategory {
    pub film_key: SurrogateKey,
    pub category_key: SurrogateKey,
}

/// `fact_rental` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRental {
    pub rental_id: i32,
    pub date_key_rented: Option<DateKey>,
    pub date_key_returned: Option<DateKey>,
    pub film_key: Option<SurrogateKey>,
    pub store_key: Option<SurrogateKey>,
    pub customer_key: Option<SurrogateKey>,
    pub staff_id: Option<i32>,
    pub rental_duration_days: Option<i64>,
}

/// `fact_payment` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPayment {
    pub payment_id: i32,
    pub date_key_paid: Option<DateKey>,
    pub customer_key: Option<SurrogateKey>,
    pub store_key: Option<SurrogateKey>,
    pub staff_id: Option<i32>,
    pub amount: Decimal,
}

/// How a batch is written to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Rows whose natural key already exists are left untouched
    InsertOnly,
    /// Rows whose natural key already exists are updated in place
    Upsert,
}

/// One table's worth of rows, written and committed as a unit
#[derive(Debug, Clone, PartialEq)]
pub enum TargetBatch {
    Films(Vec<DimFilm>),
    Actors(Vec<DimActor>),
    Categories(Vec<DimCategory>),
    Stores(Vec<DimStore>),
    Customers(Vec<DimCustomer>),
    FilmActors(Vec<BridgeFilmActor>),
    FilmCategories(Vec<BridgeFilmCategory>),
    Rentals(Vec<FactRental>),
    Payments(Vec<FactPayment>),
}

impl TargetBatch {
    /// Number of rows in the batch
    pub fn len(&self) -> usize {
        match self {
            TargetBatch::Films(rows) => rows.len(),
            TargetBatch::Actors(rows) => rows.len(),
            TargetBatch::Categories(rows) => rows.len(),
            TargetBatch::Stores(rows) => rows.len(),
            TargetBatch::Customers(rows) => rows.len(),
            TargetBatch::FilmActors(rows) => rows.len(),
            TargetBatch::FilmCategories(rows) => rows.len(),
            TargetBatch::Rentals(rows) => rows.len(),
            TargetBatch::Payments(rows) => rows.len(),
        }
    }

    /// Whether the batch holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Table the batch belongs to
    pub fn table(&self) -> crate::domain::SyncTable {
        use crate::domain::SyncTable;
        match self {
            TargetBatch::Films(_) => SyncTable::Film,
            TargetBatch::Actors(_) => SyncTable::Actor,
            TargetBatch::Categories(_) => SyncTable::Category,
            TargetBatch::Stores(_) => SyncTable::Store,
            TargetBatch::Customers(_) => SyncTable::Customer,
            TargetBatch::FilmActors(_) => SyncTable::FilmActor,
            TargetBatch::FilmCategories(_) => SyncTable::FilmCategory,
            TargetBatch::Rentals(_) => SyncTable::Rental,
            TargetBatch::Payments(_) => SyncTable::Payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SyncTable;

    #[test]
    fn test_batch_table_and_len() {
        let batch = TargetBatch::FilmActors(vec![BridgeFilmActor {
            film_key: SurrogateKey::new(1),
            actor_key: SurrogateKey::new(2),
        }]);
        assert_eq!(batch.table(), SyncTable::FilmActor);
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
        assert!(TargetBatch::Payments(Vec::new()).is_empty());
    }
}
