//! PostgreSQL row models
//!
//! Flat representations of domain rows with key newtypes unwrapped to the
//! plain integers the driver binds.

use crate::core::state::watermark::Watermark;
use crate::domain::target::{BridgeFilmActor, BridgeFilmCategory, FactPayment, FactRental};
use crate::domain::{Result, StarsyncError, SyncTable};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// `fact_rental` row as bound to statement parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLFactRental {
    pub rental_id: i32,
    pub date_key_rented: Option<i32>,
    pub date_key_returned: Option<i32>,
    pub film_key: Option<i32>,
    pub store_key: Option<i32>,
    pub customer_key: Option<i32>,
    pub staff_id: Option<i32>,
    pub rental_duration_days: Option<i64>,
}

impl PostgreSQLFactRental {
    /// Convert from the domain row
    pub fn from_domain(row: &FactRental) -> Self {
        Self {
            rental_id: row.rental_id,
            date_key_rented: row.date_key_rented.map(|k| k.value()),
            date_key_returned: row.date_key_returned.map(|k| k.value()),
            film_key: row.film_key.map(|k| k.value()),
            store_key: row.store_key.map(|k| k.value()),
            customer_key: row.customer_key.map(|k| k.value()),
            staff_id: row.staff_id,
            rental_duration_days: row.rental_duration_days,
        }
    }
}

/// `fact_payment` row as bound to statement parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLFactPayment {
    pub payment_id: i32,
    pub date_key_paid: Option<i32>,
    pub customer_key: Option<i32>,
    pub store_key: Option<i32>,
    pub staff_id: Option<i32>,
    pub amount: Decimal,
}

impl PostgreSQLFactPayment {
    /// Convert from the domain row
    pub fn from_domain(row: &FactPayment) -> Self {
        Self {
            payment_id: row.payment_id,
            date_key_paid: row.date_key_paid.map(|k| k.value()),
            customer_key: row.customer_key.map(|k| k.value()),
            store_key: row.store_key.map(|k| k.value()),
            staff_id: row.staff_id,
            amount: row.amount,
        }
    }
}

/// Bridge row as a pair of plain keys
pub fn film_actor_pair(row: &BridgeFilmActor) -> (i32, i32) {
    (row.film_key.value(), row.actor_key.value())
}

/// Bridge row as a pair of plain keys
pub fn film_category_pair(row: &BridgeFilmCategory) -> (i32, i32) {
    (row.film_key.value(), row.category_key.value())
}

/// `sync_state` row
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLWatermark {
    pub table_name: String,
    pub last_updated: NaiveDateTime,
}

impl PostgreSQLWatermark {
    /// Convert from domain Watermark
    pub fn from_domain(watermark: &Watermark) -> Self {
        Self {
            table_name: watermark.table_name().to_string(),
            last_updated: watermark.last_updated,
        }
    }

    /// Convert to domain Watermark
    ///
    /// # Errors
    ///
    /// Returns a state error if the row names an unknown table.
    pub fn to_domain(&self) -> Result<Watermark> {
        let table: SyncTable = self
            .table_name
            .parse()
            .map_err(|e| StarsyncError::State(format!("Invalid sync_state row: {e}")))?;
        Ok(Watermark::new(table, self.last_updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateKey, SurrogateKey};
    use chrono::NaiveDate;

    #[test]
    fn test_fact_rental_unwraps_keys() {
        let row = FactRental {
            rental_id: 1,
            date_key_rented: Some(DateKey::from_date(NaiveDate::from_ymd_opt(2005, 5, 24).unwrap())),
            date_key_returned: None,
            film_key: Some(SurrogateKey::new(80)),
            store_key: None,
            customer_key: Some(SurrogateKey::new(130)),
            staff_id: Some(1),
            rental_duration_days: None,
        };

        let pg = PostgreSQLFactRental::from_domain(&row);
        assert_eq!(pg.date_key_rented, Some(20050524));
        assert_eq!(pg.film_key, Some(80));
        assert_eq!(pg.store_key, None);
        assert_eq!(pg.customer_key, Some(130));
    }

    #[test]
    fn test_watermark_round_trip() {
        let ts = NaiveDate::from_ymd_opt(2006, 2, 15)
            .unwrap()
            .and_hms_opt(5, 3, 42)
            .unwrap();
        let watermark = Watermark::new(SyncTable::Payment, ts);
        let pg = PostgreSQLWatermark::from_domain(&watermark);
        assert_eq!(pg.table_name, "payment");
        assert_eq!(pg.to_domain().unwrap(), watermark);
    }

    #[test]
    fn test_unknown_watermark_table() {
        let pg = PostgreSQLWatermark {
            table_name: "staff".to_string(),
            last_updated: NaiveDateTime::default(),
        };
        assert!(matches!(pg.to_domain(), Err(StarsyncError::State(_))));
    }
}
