//! Natural → surrogate key resolution
//!
//! A [`KeyResolver`] is a snapshot of the dimension keys currently in the
//! target. It is loaded fresh for every run and reloaded after the dimension
//! steps so facts see rows written earlier in the same run. A miss is not an
//! error; callers null the reference or skip the row.

use crate::adapters::database::traits::TargetStore;
use crate::domain::target::KeyMap;
use crate::domain::{Result, SurrogateKey, SyncTable};

/// Snapshot of dimension surrogate keys
#[derive(Debug, Clone, Default)]
pub struct KeyResolver {
    films: KeyMap,
    actors: KeyMap,
    categories: KeyMap,
    stores: KeyMap,
    customers: KeyMap,
}

impl KeyResolver {
    /// Load the key maps of every dimension from the target
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension cannot be read.
    pub async fn load(target: &dyn TargetStore) -> Result<Self> {
        let resolver = Self {
            films: target.dimension_keys(SyncTable::Film).await?,
            actors: target.dimension_keys(SyncTable::Actor).await?,
            categories: target.dimension_keys(SyncTable::Category).await?,
            stores: target.dimension_keys(SyncTable::Store).await?,
            customers: target.dimension_keys(SyncTable::Customer).await?,
        };

        tracing::debug!(
            films = resolver.films.len(),
            actors = resolver.actors.len(),
            categories = resolver.categories.len(),
            stores = resolver.stores.len(),
            customers = resolver.customers.len(),
            "Key resolver loaded"
        );

        Ok(resolver)
    }

    fn lookup(map: &KeyMap, natural: Option<i32>) -> Option<SurrogateKey> {
        natural.and_then(|id| map.get(&id).copied())
    }

    pub fn film(&self, film_id: Option<i32>) -> Option<SurrogateKey> {
        Self::lookup(&self.films, film_id)
    }

    pub fn actor(&self, actor_id: Option<i32>) -> Option<SurrogateKey> {
        Self::lookup(&self.actors, actor_id)
    }

    pub fn category(&self, category_id: Option<i32>) -> Option<SurrogateKey> {
        Self::lookup(&self.categories, category_id)
    }

    pub fn store(&self, store_id: Option<i32>) -> Option<SurrogateKey> {
        Self::lookup(&self.stores, store_id)
    }

    pub fn customer(&self, customer_id: Option<i32>) -> Option<SurrogateKey> {
        Self::lookup(&self.customers, customer_id)
    }
}
