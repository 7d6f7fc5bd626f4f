//! Rows read from the Sakila OLTP schema
//!
//! These mirror the source columns the synchronizer needs and nothing more.
//! Foreign keys stay as plain natural ids; resolving them is the job of the
//! synchronizers.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `film`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub film_id: i32,
    pub title: String,
    pub rating: Option<String>,
    pub length: Option<i32>,
    pub language_id: Option<i32>,
    pub release_year: Option<String>,
    pub last_update: NaiveDateTime,
}

/// `actor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub actor_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub last_update: NaiveDateTime,
}

/// `category`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub last_update: NaiveDateTime,
}

/// `language`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language_id: i32,
    pub name: String,
}

/// `store`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub store_id: i32,
    pub address_id: Option<i32>,
    pub last_update: NaiveDateTime,
}

/// `address`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: i32,
    pub city_id: Option<i32>,
}

/// `city`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city_id: i32,
    pub city: String,
    pub country_id: Option<i32>,
}

/// `country`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub country_id: i32,
    pub country: String,
}

/// `customer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub address_id: Option<i32>,
    pub last_update: NaiveDateTime,
}

/// `inventory`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub inventory_id: i32,
    pub film_id: Option<i32>,
    pub store_id: Option<i32>,
}

/// `rental`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub rental_id: i32,
    pub rental_date: Option<NaiveDateTime>,
    pub inventory_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub return_date: Option<NaiveDateTime>,
    pub staff_id: Option<i32>,
    pub last_update: Option<NaiveDateTime>,
}

impl Rental {
    /// Latest of `rental_date` and `last_update`
    ///
    /// A new rental is detected through its `rental_date`, a return through
    /// the `last_update` bump that accompanies `return_date`.
    pub fn changed_at(&self) -> Option<NaiveDateTime> {
        match (self.rental_date, self.last_update) {
            (Some(rented), Some(updated)) => Some(rented.max(updated)),
            (rented, updated) => rented.or(updated),
        }
    }
}

/// `payment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: i32,
    pub customer_id: Option<i32>,
    pub staff_id: Option<i32>,
    pub rental_id: Option<i32>,
    pub amount: Decimal,
    pub payment_date: Option<NaiveDateTime>,
}

/// `film_actor` junction row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilmActor {
    pub actor_id: i32,
    pub film_id: i32,
}

/// `film_category` junction row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilmCategory {
    pub film_id: i32,
    pub category_id: i32,
}
