//! Synchronized table catalogue

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unit of synchronization: one dimension, bridge or fact table
///
/// Each variant is synchronized and committed independently. The name
/// returned by [`SyncTable::as_str`] is the source entity name, which is
/// also the key of the table's row in `sync_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTable {
    /// `store` → `dim_store`
    Store,
    /// `customer` → `dim_customer`
    Customer,
    /// `film` → `dim_film`
    Film,
    /// `actor` → `dim_actor`
    Actor,
    /// `category` → `dim_category`
    Category,
    /// `film_actor` → `bridge_film_actor`
    FilmActor,
    /// `film_category` → `bridge_film_category`
    FilmCategory,
    /// `rental` → `fact_rental`
    Rental,
    /// `payment` → `fact_payment`
    Payment,
}

impl SyncTable {
    /// Every table in dependency order: dimensions, then bridges, then facts
    pub const ALL: [SyncTable; 9] = [
        SyncTable::Store,
        SyncTable::Customer,
        SyncTable::Film,
        SyncTable::Actor,
        SyncTable::Category,
        SyncTable::FilmActor,
        SyncTable::FilmCategory,
        SyncTable::Rental,
        SyncTable::Payment,
    ];

    /// Source entity name, also used as the watermark key
    pub fn as_str(self) -> &'static str {
        match self {
            SyncTable::Film => "film",
            SyncTable::Actor => "actor",
            SyncTable::Category => "category",
            SyncTable::Store => "store",
            SyncTable::Customer => "customer",
            SyncTable::FilmActor => "film_actor",
            SyncTable::FilmCategory => "film_category",
            SyncTable::Rental => "rental",
            SyncTable::Payment => "payment",
        }
    }

    /// Name of the analytics table this entity is loaded into
    pub fn target_table(self) -> &'static str {
        match self {
            SyncTable::Film => "dim_film",
            SyncTable::Actor => "dim_actor",
            SyncTable::Category => "dim_category",
            SyncTable::Store => "dim_store",
            SyncTable::Customer => "dim_customer",
            SyncTable::FilmActor => "bridge_film_actor",
            SyncTable::FilmCategory => "bridge_film_category",
            SyncTable::Rental => "fact_rental",
            SyncTable::Payment => "fact_payment",
        }
    }

    /// Whether this table is a dimension
    pub fn is_dimension(self) -> bool {
        matches!(
            self,
            SyncTable::Film
                | SyncTable::Actor
                | SyncTable::Category
                | SyncTable::Store
                | SyncTable::Customer
        )
    }

    /// Whether this table is a many-to-many bridge
    pub fn is_bridge(self) -> bool {
        matches!(self, SyncTable::FilmActor | SyncTable::FilmCategory)
    }

    /// Whether this table is a fact table
    pub fn is_fact(self) -> bool {
        matches!(self, SyncTable::Rental | SyncTable::Payment)
    }

    /// Bridges are only populated by full loads and carry no watermark
    pub fn has_watermark(self) -> bool {
        !self.is_bridge()
    }
}

impl fmt::Display for SyncTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyncTable::ALL
            .into_iter()
            .find(|table| table.as_str() == s || table.target_table() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown table '{s}'. Must be one of: {}",
                    SyncTable::ALL.map(SyncTable::as_str).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for table in SyncTable::ALL {
            assert_eq!(SyncTable::from_str(table.as_str()), Ok(table));
            assert_eq!(SyncTable::from_str(table.target_table()), Ok(table));
        }
    }

    #[test]
    fn test_unknown_table() {
        let err = SyncTable::from_str("staff").unwrap_err();
        assert!(err.contains("film_category"));
    }

    #[test]
    fn test_dependency_order() {
        let first_bridge = SyncTable::ALL.iter().position(|t| t.is_bridge()).unwrap();
        let last_dimension = SyncTable::ALL.iter().rposition(|t| t.is_dimension()).unwrap();
        let first_fact = SyncTable::ALL.iter().position(|t| t.is_fact()).unwrap();
        assert!(last_dimension < first_bridge);
        assert!(first_bridge < first_fact);
        assert_eq!(&SyncTable::ALL[..2], &[SyncTable::Store, SyncTable::Customer]);
        assert_eq!(SyncTable::ALL[8], SyncTable::Payment);
    }

    #[test]
    fn test_bridges_have_no_watermark() {
        assert!(!SyncTable::FilmActor.has_watermark());
        assert!(!SyncTable::FilmCategory.has_watermark());
        assert!(SyncTable::Payment.has_watermark());
    }
}
