//! Key types for the analytics schema
//!
//! Surrogate keys and calendar date keys are wrapped in newtypes so a film
//! key can never be passed where a store key or a natural id is expected by
//! accident of plain `i32` arithmetic.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// System-assigned identifier of a dimension or fact row
///
/// Assigned once by the target store on first insert and never changed for
/// the lifetime of the row.
///
/// # Examples
///
/// ```
/// use starsync::domain::ids::SurrogateKey;
///
/// let key = SurrogateKey::new(42);
/// assert_eq!(key.value(), 42);
/// assert_eq!(key.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurrogateKey(i32);

impl SurrogateKey {
    /// Wraps a raw key value
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw key value
    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SurrogateKey {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Calendar key in `YYYYMMDD` form
///
/// # Examples
///
/// ```
/// use starsync::domain::ids::DateKey;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(DateKey::from_date(date).value(), 20240315);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(i32);

impl DateKey {
    /// Builds the key for a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32)
    }

    /// Builds the key for the calendar date of a timestamp
    pub fn from_datetime(timestamp: NaiveDateTime) -> Self {
        Self::from_date(timestamp.date())
    }

    /// Returns the raw `YYYYMMDD` value
    pub fn value(self) -> i32 {
        self.0
    }

    /// Converts the key back to a calendar date, if it names a valid one
    pub fn to_date(self) -> Option<NaiveDate> {
        let year = self.0 / 10_000;
        let month = (self.0 / 100 % 100) as u32;
        let day = (self.0 % 100) as u32;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y%m%d")
            .map_err(|e| format!("Invalid date key '{s}': {e}"))?;
        Ok(Self::from_date(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(2024, 3, 15, 20240315 ; "mid month")]
    #[test_case(2000, 1, 1, 20000101 ; "first calendar day")]
    #[test_case(2030, 12, 31, 20301231 ; "last calendar day")]
    #[test_case(2024, 2, 29, 20240229 ; "leap day")]
    fn test_date_key_from_date(year: i32, month: u32, day: u32, expected: i32) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        assert_eq!(DateKey::from_date(date).value(), expected);
    }

    #[test]
    fn test_date_key_ignores_time_of_day() {
        let late = NaiveDate::from_ymd_opt(2005, 5, 24)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(DateKey::from_datetime(late).value(), 20050524);
    }

    #[test]
    fn test_date_key_to_date() {
        let key = DateKey::from_str("20240315").unwrap();
        assert_eq!(key.to_date(), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_date_key_from_str_invalid() {
        assert!(DateKey::from_str("20241301").is_err());
        assert!(DateKey::from_str("not-a-date").is_err());
    }

    #[test]
    fn test_surrogate_key_serializes_as_number() {
        let json = serde_json::to_string(&SurrogateKey::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
