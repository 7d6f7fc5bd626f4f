//! Derived fact attributes

use crate::domain::DateKey;
use chrono::NaiveDateTime;

/// `YYYYMMDD` key of a timestamp's calendar date; `None` stays `None`
pub fn date_key(ts: Option<NaiveDateTime>) -> Option<DateKey> {
    ts.map(DateKey::from_datetime)
}

/// Whole days between rental and return, when both are known
///
/// Partial days are truncated toward zero.
pub fn rental_duration_days(
    rental_date: Option<NaiveDateTime>,
    return_date: Option<NaiveDateTime>,
) -> Option<i64> {
    match (rental_date, return_date) {
        (Some(rented), Some(returned)) => Some((returned - rented).num_days()),
        _ => None,
    }
}
