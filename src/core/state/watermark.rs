//! Watermark model for tracking synchronization state
//!
//! A watermark is the timestamp through which one table is known to be fully
//! synchronized. Incremental runs read only source rows whose change
//! timestamp is strictly greater than it.

use crate::domain::SyncTable;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Watermark for one synchronized table, stored as a `sync_state` row
///
/// # Examples
///
/// ```
/// use starsync::core::state::watermark::Watermark;
/// use starsync::domain::SyncTable;
/// use chrono::NaiveDate;
///
/// let ts = NaiveDate::from_ymd_opt(2005, 8, 23).unwrap().and_hms_opt(22, 0, 0).unwrap();
/// let watermark = Watermark::new(SyncTable::Rental, ts);
///
/// assert_eq!(watermark.table_name(), "rental");
/// assert_eq!(watermark.last_updated, ts);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Table this watermark tracks
    pub table: SyncTable,

    /// Change timestamps up to and including this one are synchronized
    pub last_updated: NaiveDateTime,
}

impl Watermark {
    /// Creates a watermark for a table
    pub fn new(table: SyncTable, last_updated: NaiveDateTime) -> Self {
        Self {
            table,
            last_updated,
        }
    }

    /// Key of the `sync_state` row
    pub fn table_name(&self) -> &'static str {
        self.table.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 2, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_table_name_matches_state_key() {
        let watermark = Watermark::new(SyncTable::Payment, at(5));
        assert_eq!(watermark.table_name(), "payment");
        assert_eq!(watermark.last_updated, at(5));
    }

    #[test]
    fn test_watermark_serialization() {
        let watermark = Watermark::new(SyncTable::FilmActor, at(1));
        let json = serde_json::to_value(&watermark).unwrap();
        assert_eq!(json["table"], "film_actor");
        assert_eq!(json["last_updated"], "2006-02-15T01:00:00");
    }
}
