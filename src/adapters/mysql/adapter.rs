//! MySQL adapter implementing [`SourceReader`]
//!
//! Every read names its columns explicitly. Incremental reads add a
//! `> ?` filter on the entity's change timestamp.

use crate::adapters::database::traits::SourceReader;
use crate::adapters::mysql::client::MySqlClient;
use crate::adapters::mysql::values::{datetime_param, RowReader};
use crate::domain::source::{
    Actor, Address, Category, City, Country, Customer, Film, FilmActor, FilmCategory, Inventory,
    Language, Payment, Rental, Store,
};
use crate::domain::{Result, SyncTable};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use mysql_async::{Params, Row};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const FILM_SELECT: &str = "SELECT film_id, title, rating, length, language_id, \
     CAST(release_year AS CHAR) AS release_year, last_update FROM film";
const ACTOR_SELECT: &str = "SELECT actor_id, first_name, last_name, last_update FROM actor";
const CATEGORY_SELECT: &str = "SELECT category_id, name, last_update FROM category";
const STORE_SELECT: &str = "SELECT store_id, address_id, last_update FROM store";
const CUSTOMER_SELECT: &str =
    "SELECT customer_id, first_name, last_name, active, address_id, last_update FROM customer";
const RENTAL_SELECT: &str = "SELECT rental_id, rental_date, inventory_id, customer_id, \
     return_date, staff_id, last_update FROM rental";
const PAYMENT_SELECT: &str =
    "SELECT payment_id, customer_id, staff_id, rental_id, amount, payment_date FROM payment";

const LAST_UPDATE_FILTER: &str = "last_update > ?";
const RENTAL_FILTER: &str = "(rental_date > ? OR last_update > ?)";
const PAYMENT_FILTER: &str = "payment_date > ?";

/// Appends the change filter when `since` is set, binding it once per placeholder
fn changed_since(
    select: &str,
    filter: &str,
    order_by: &str,
    since: Option<NaiveDateTime>,
) -> (String, Params) {
    match since {
        Some(ts) => {
            let placeholders = filter.matches('?').count();
            (
                format!("{select} WHERE {filter} ORDER BY {order_by}"),
                Params::Positional(vec![datetime_param(ts); placeholders]),
            )
        }
        None => (format!("{select} ORDER BY {order_by}"), Params::Empty),
    }
}

fn film(row: &Row) -> Result<Film> {
    let r = RowReader::new(row);
    Ok(Film {
        film_id: r.i32("film_id")?,
        title: r.text("title")?,
        rating: r.opt_text("rating")?,
        length: r.opt_i32("length")?,
        language_id: r.opt_i32("language_id")?,
        release_year: r.opt_text("release_year")?,
        last_update: r.datetime("last_update")?,
    })
}

fn actor(row: &Row) -> Result<Actor> {
    let r = RowReader::new(row);
    Ok(Actor {
        actor_id: r.i32("actor_id")?,
        first_name: r.text("first_name")?,
        last_name: r.text("last_name")?,
        last_update: r.datetime("last_update")?,
    })
}

fn category(row: &Row) -> Result<Category> {
    let r = RowReader::new(row);
    Ok(Category {
        category_id: r.i32("category_id")?,
        name: r.text("name")?,
        last_update: r.datetime("last_update")?,
    })
}

fn store(row: &Row) -> Result<Store> {
    let r = RowReader::new(row);
    Ok(Store {
        store_id: r.i32("store_id")?,
        address_id: r.opt_i32("address_id")?,
        last_update: r.datetime("last_update")?,
    })
}

fn customer(row: &Row) -> Result<Customer> {
    let r = RowReader::new(row);
    Ok(Customer {
        customer_id: r.i32("customer_id")?,
        first_name: r.text("first_name")?,
        last_name: r.text("last_name")?,
        active: r.bool("active")?,
        address_id: r.opt_i32("address_id")?,
        last_update: r.datetime("last_update")?,
    })
}

fn rental(row: &Row) -> Result<Rental> {
    let r = RowReader::new(row);
    Ok(Rental {
        rental_id: r.i32("rental_id")?,
        rental_date: r.opt_datetime("rental_date")?,
        inventory_id: r.opt_i32("inventory_id")?,
        customer_id: r.opt_i32("customer_id")?,
        return_date: r.opt_datetime("return_date")?,
        staff_id: r.opt_i32("staff_id")?,
        last_update: r.opt_datetime("last_update")?,
    })
}

fn payment(row: &Row) -> Result<Payment> {
    let r = RowReader::new(row);
    Ok(Payment {
        payment_id: r.i32("payment_id")?,
        customer_id: r.opt_i32("customer_id")?,
        staff_id: r.opt_i32("staff_id")?,
        rental_id: r.opt_i32("rental_id")?,
        amount: r.decimal("amount")?,
        payment_date: r.opt_datetime("payment_date")?,
    })
}

/// [`SourceReader`] over a Sakila MySQL database
pub struct MySqlSource {
    client: MySqlClient,
}

impl MySqlSource {
    pub fn new(client: MySqlClient) -> Self {
        Self { client }
    }

    async fn read<T>(
        &self,
        query: &str,
        params: Params,
        convert: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let rows = self.client.rows(query, params).await?;
        rows.iter().map(convert).collect()
    }
}

#[async_trait]
impl SourceReader for MySqlSource {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn films(&self, since: Option<NaiveDateTime>) -> Result<Vec<Film>> {
        let (query, params) = changed_since(FILM_SELECT, LAST_UPDATE_FILTER, "film_id", since);
        self.read(&query, params, film).await
    }

    async fn actors(&self, since: Option<NaiveDateTime>) -> Result<Vec<Actor>> {
        let (query, params) = changed_since(ACTOR_SELECT, LAST_UPDATE_FILTER, "actor_id", since);
        self.read(&query, params, actor).await
    }

    async fn categories(&self, since: Option<NaiveDateTime>) -> Result<Vec<Category>> {
        let (query, params) =
            changed_since(CATEGORY_SELECT, LAST_UPDATE_FILTER, "category_id", since);
        self.read(&query, params, category).await
    }

    async fn stores(&self, since: Option<NaiveDateTime>) -> Result<Vec<Store>> {
        let (query, params) = changed_since(STORE_SELECT, LAST_UPDATE_FILTER, "store_id", since);
        self.read(&query, params, store).await
    }

    async fn customers(&self, since: Option<NaiveDateTime>) -> Result<Vec<Customer>> {
        let (query, params) =
            changed_since(CUSTOMER_SELECT, LAST_UPDATE_FILTER, "customer_id", since);
        self.read(&query, params, customer).await
    }

    async fn rentals(&self, since: Option<NaiveDateTime>) -> Result<Vec<Rental>> {
        let (query, params) = changed_since(RENTAL_SELECT, RENTAL_FILTER, "rental_id", since);
        self.read(&query, params, rental).await
    }

    async fn payments(&self, since: Option<NaiveDateTime>) -> Result<Vec<Payment>> {
        let (query, params) = changed_since(PAYMENT_SELECT, PAYMENT_FILTER, "payment_id", since);
        self.read(&query, params, payment).await
    }

    async fn languages(&self) -> Result<Vec<Language>> {
        self.read(
            "SELECT language_id, name FROM language",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(Language {
                    language_id: r.i32("language_id")?,
                    name: r.text("name")?.trim_end().to_string(),
                })
            },
        )
        .await
    }

    async fn addresses(&self) -> Result<Vec<Address>> {
        self.read(
            "SELECT address_id, city_id FROM address",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(Address {
                    address_id: r.i32("address_id")?,
                    city_id: r.opt_i32("city_id")?,
                })
            },
        )
        .await
    }

    async fn cities(&self) -> Result<Vec<City>> {
        self.read(
            "SELECT city_id, city, country_id FROM city",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(City {
                    city_id: r.i32("city_id")?,
                    city: r.text("city")?,
                    country_id: r.opt_i32("country_id")?,
                })
            },
        )
        .await
    }

    async fn countries(&self) -> Result<Vec<Country>> {
        self.read(
            "SELECT country_id, country FROM country",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(Country {
                    country_id: r.i32("country_id")?,
                    country: r.text("country")?,
                })
            },
        )
        .await
    }

    async fn inventories(&self) -> Result<Vec<Inventory>> {
        self.read(
            "SELECT inventory_id, film_id, store_id FROM inventory",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(Inventory {
                    inventory_id: r.i32("inventory_id")?,
                    film_id: r.opt_i32("film_id")?,
                    store_id: r.opt_i32("store_id")?,
                })
            },
        )
        .await
    }

    async fn film_actors(&self) -> Result<Vec<FilmActor>> {
        self.read(
            "SELECT actor_id, film_id FROM film_actor ORDER BY film_id, actor_id",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(FilmActor {
                    actor_id: r.i32("actor_id")?,
                    film_id: r.i32("film_id")?,
                })
            },
        )
        .await
    }

    async fn film_categories(&self) -> Result<Vec<FilmCategory>> {
        self.read(
            "SELECT film_id, category_id FROM film_category ORDER BY film_id, category_id",
            Params::Empty,
            |row| {
                let r = RowReader::new(row);
                Ok(FilmCategory {
                    film_id: r.i32("film_id")?,
                    category_id: r.i32("category_id")?,
                })
            },
        )
        .await
    }

    async fn count(&self, table: SyncTable) -> Result<u64> {
        // Sakila table names match the synchronized table names.
        self.client
            .count(&format!("SELECT COUNT(*) FROM {}", table.as_str()))
            .await
    }

    async fn payment_total(&self) -> Result<Decimal> {
        let rows = self
            .client
            .rows(
                "SELECT CAST(COALESCE(SUM(amount), 0) AS CHAR) AS total FROM payment",
                Params::Empty,
            )
            .await?;

        match rows.first() {
            Some(row) => RowReader::new(row).decimal("total"),
            None => Ok(Decimal::ZERO),
        }
    }

    async fn payment_totals_by_store(&self) -> Result<BTreeMap<i32, Decimal>> {
        let query = r#"
            SELECT i.store_id AS store_id, CAST(SUM(p.amount) AS CHAR) AS total
            FROM payment p
            JOIN rental r ON r.rental_id = p.rental_id
            JOIN inventory i ON i.inventory_id = r.inventory_id
            GROUP BY i.store_id
        "#;
        let rows = self.client.rows(query, Params::Empty).await?;

        let mut totals = BTreeMap::new();
        for row in &rows {
            let r = RowReader::new(row);
            if let Some(store_id) = r.opt_i32("store_id")? {
                totals.insert(store_id, r.decimal("total")?);
            }
        }
        Ok(totals)
    }

    async fn close(&self) -> Result<()> {
        self.client.disconnect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_full_read_has_no_filter() {
        let (query, params) = changed_since(FILM_SELECT, LAST_UPDATE_FILTER, "film_id", None);
        assert!(query.ends_with("FROM film ORDER BY film_id"));
        assert!(!query.contains("WHERE"));
        assert_eq!(params, Params::Empty);
    }

    #[test]
    fn test_rental_filter_binds_both_timestamps() {
        let since = NaiveDate::from_ymd_opt(2005, 5, 24)
            .unwrap()
            .and_hms_opt(22, 53, 30)
            .unwrap();
        let (query, params) = changed_since(RENTAL_SELECT, RENTAL_FILTER, "rental_id", Some(since));

        assert!(query.contains("WHERE (rental_date > ? OR last_update > ?) ORDER BY rental_id"));
        match params {
            Params::Positional(values) => {
                assert_eq!(values.len(), 2);
                assert_eq!(values[0], datetime_param(since));
            }
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn test_release_year_read_as_text() {
        assert!(FILM_SELECT.contains("CAST(release_year AS CHAR) AS release_year"));
    }
}
