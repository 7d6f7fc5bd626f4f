//! Dimension synchronizer
//!
//! Maps source entities to dimension rows. Store and customer rows are
//! denormalized through address → city → country; the auxiliary entities are
//! read once per run into lookup maps, and any missing hop leaves the text
//! attribute empty instead of dropping the row.

use crate::adapters::database::traits::SourceReader;
use crate::domain::source::{Actor, Address, Category, City, Country, Customer, Film, Language, Store};
use crate::domain::target::{DimActor, DimCategory, DimCustomer, DimFilm, DimStore, TargetBatch};
use crate::domain::{Result, StarsyncError, SyncTable};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Film language used when `language_id` does not resolve
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// address → city → country lookup
#[derive(Debug, Clone, Default)]
pub struct Geography {
    address_city: HashMap<i32, Option<i32>>,
    cities: HashMap<i32, (String, Option<i32>)>,
    countries: HashMap<i32, String>,
}

impl Geography {
    pub fn new(addresses: Vec<Address>, cities: Vec<City>, countries: Vec<Country>) -> Self {
        Self {
            address_city: addresses
                .into_iter()
                .map(|a| (a.address_id, a.city_id))
                .collect(),
            cities: cities
                .into_iter()
                .map(|c| (c.city_id, (c.city, c.country_id)))
                .collect(),
            countries: countries
                .into_iter()
                .map(|c| (c.country_id, c.country))
                .collect(),
        }
    }

    /// City and country names for an address
    pub fn resolve(&self, address_id: Option<i32>) -> (Option<String>, Option<String>) {
        let city = address_id
            .and_then(|id| self.address_city.get(&id).copied().flatten())
            .and_then(|city_id| self.cities.get(&city_id));

        match city {
            Some((name, country_id)) => {
                let country = country_id.and_then(|id| self.countries.get(&id).cloned());
                (Some(name.clone()), country)
            }
            None => (None, None),
        }
    }
}

pub fn film_rows(films: Vec<Film>, languages: &HashMap<i32, String>) -> Vec<DimFilm> {
    films
        .into_iter()
        .map(|f| DimFilm {
            language: f
                .language_id
                .and_then(|id| languages.get(&id).cloned())
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            film_id: f.film_id,
            title: f.title,
            rating: f.rating,
            length: f.length,
            release_year: f.release_year,
            last_update: f.last_update,
        })
        .collect()
}

pub fn actor_rows(actors: Vec<Actor>) -> Vec<DimActor> {
    actors
        .into_iter()
        .map(|a| DimActor {
            actor_id: a.actor_id,
            first_name: a.first_name,
            last_name: a.last_name,
            last_update: a.last_update,
        })
        .collect()
}

pub fn category_rows(categories: Vec<Category>) -> Vec<DimCategory> {
    categories
        .into_iter()
        .map(|c| DimCategory {
            category_id: c.category_id,
            name: c.name,
            last_update: c.last_update,
        })
        .collect()
}

pub fn store_rows(stores: Vec<Store>, geography: &Geography) -> Vec<DimStore> {
    stores
        .into_iter()
        .map(|s| {
            let (city, country) = geography.resolve(s.address_id);
            DimStore {
                store_id: s.store_id,
                city,
                country,
                last_update: s.last_update,
            }
        })
        .collect()
}

pub fn customer_rows(customers: Vec<Customer>, geography: &Geography) -> Vec<DimCustomer> {
    customers
        .into_iter()
        .map(|c| {
            let (city, country) = geography.resolve(c.address_id);
            DimCustomer {
                customer_id: c.customer_id,
                first_name: c.first_name,
                last_name: c.last_name,
                active: c.active,
                city,
                country,
                last_update: c.last_update,
            }
        })
        .collect()
}

/// Builds dimension batches from the source
pub struct DimensionSynchronizer<'a> {
    source: &'a dyn SourceReader,
    languages: HashMap<i32, String>,
    geography: Geography,
}

impl<'a> DimensionSynchronizer<'a> {
    /// Read the auxiliary lookup entities
    ///
    /// # Errors
    ///
    /// Returns an error if any lookup entity cannot be read.
    pub async fn load(source: &'a dyn SourceReader) -> Result<Self> {
        let languages = source
            .languages()
            .await?
            .into_iter()
            .map(|Language { language_id, name }| (language_id, name))
            .collect();
        let geography = Geography::new(
            source.addresses().await?,
            source.cities().await?,
            source.countries().await?,
        );

        Ok(Self {
            source,
            languages,
            geography,
        })
    }

    /// Dimension rows changed after `since`, or every row when `since` is `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the source read fails or `table` is not a dimension.
    pub async fn batch(&self, table: SyncTable, since: Option<NaiveDateTime>) -> Result<TargetBatch> {
        let batch = match table {
            SyncTable::Film => {
                TargetBatch::Films(film_rows(self.source.films(since).await?, &self.languages))
            }
            SyncTable::Actor => TargetBatch::Actors(actor_rows(self.source.actors(since).await?)),
            SyncTable::Category => {
                TargetBatch::Categories(category_rows(self.source.categories(since).await?))
            }
            SyncTable::Store => {
                TargetBatch::Stores(store_rows(self.source.stores(since).await?, &self.geography))
            }
            SyncTable::Customer => TargetBatch::Customers(customer_rows(
                self.source.customers(since).await?,
                &self.geography,
            )),
            other => {
                return Err(StarsyncError::Other(format!(
                    "{other} is not a dimension table"
                )))
            }
        };

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn geography() -> Geography {
        Geography::new(
            vec![
                Address { address_id: 1, city_id: Some(300) },
                Address { address_id: 2, city_id: Some(576) },
                Address { address_id: 3, city_id: Some(999) },
                Address { address_id: 4, city_id: None },
            ],
            vec![
                City { city_id: 300, city: "Lethbridge".to_string(), country_id: Some(20) },
                City { city_id: 576, city: "Woodridge".to_string(), country_id: Some(404) },
            ],
            vec![Country { country_id: 20, country: "Canada".to_string() }],
        )
    }

    #[test]
    fn test_geography_resolves_full_chain() {
        assert_eq!(
            geography().resolve(Some(1)),
            (Some("Lethbridge".to_string()), Some("Canada".to_string()))
        );
    }

    #[test]
    fn test_geography_missing_hops_degrade_to_none() {
        let geo = geography();
        assert_eq!(geo.resolve(Some(2)), (Some("Woodridge".to_string()), None));
        assert_eq!(geo.resolve(Some(3)), (None, None));
        assert_eq!(geo.resolve(Some(4)), (None, None));
        assert_eq!(geo.resolve(Some(42)), (None, None));
        assert_eq!(geo.resolve(None), (None, None));
    }

    #[test]
    fn test_film_language_falls_back_to_unknown() {
        let last_update = NaiveDate::from_ymd_opt(2006, 2, 15)
            .unwrap()
            .and_hms_opt(5, 3, 42)
            .unwrap();
        let film = |film_id, language_id| Film {
            film_id,
            title: "ACADEMY DINOSAUR".to_string(),
            rating: Some("PG".to_string()),
            length: Some(86),
            language_id,
            release_year: Some("2006".to_string()),
            last_update,
        };
        let languages = HashMap::from([(1, "English".to_string())]);

        let rows = film_rows(vec![film(1, Some(1)), film(2, Some(7)), film(3, None)], &languages);

        assert_eq!(rows[0].language, "English");
        assert_eq!(rows[1].language, UNKNOWN_LANGUAGE);
        assert_eq!(rows[2].language, UNKNOWN_LANGUAGE);
        assert_eq!(rows[0].release_year.as_deref(), Some("2006"));
    }
}
