//! MySQL value conversion
//!
//! Columns arrive as typed values over the binary protocol and as bytes over
//! the text protocol; both shapes are accepted.

use crate::domain::{Result, SourceError};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::{Row, Value};
use rust_decimal::Decimal;
use std::str::FromStr;

fn invalid(column: &str, message: impl Into<String>) -> SourceError {
    SourceError::InvalidValue {
        column: column.to_string(),
        message: message.into(),
    }
}

fn text(bytes: &[u8], column: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| invalid(column, format!("not valid UTF-8: {e}")).into())
}

/// Integer column; NULL maps to `None`
pub fn to_i32(value: &Value, column: &str) -> Result<Option<i32>> {
    match value {
        Value::NULL => Ok(None),
        Value::Int(i) => i32::try_from(*i)
            .map(Some)
            .map_err(|_| invalid(column, format!("{i} out of range")).into()),
        Value::UInt(u) => i32::try_from(*u)
            .map(Some)
            .map_err(|_| invalid(column, format!("{u} out of range")).into()),
        Value::Bytes(b) => {
            let s = text(b, column)?;
            s.trim()
                .parse::<i32>()
                .map(Some)
                .map_err(|e| invalid(column, format!("'{s}': {e}")).into())
        }
        other => Err(invalid(column, format!("expected integer, got {other:?}")).into()),
    }
}

/// Text column; numbers are rendered as text
pub fn to_text(value: &Value, column: &str) -> Result<Option<String>> {
    match value {
        Value::NULL => Ok(None),
        Value::Bytes(b) => text(b, column).map(Some),
        Value::Int(i) => Ok(Some(i.to_string())),
        Value::UInt(u) => Ok(Some(u.to_string())),
        other => Err(invalid(column, format!("expected text, got {other:?}")).into()),
    }
}

/// DATETIME/TIMESTAMP column
///
/// Zero dates (`0000-00-00`) have no calendar equivalent and map to `None`.
pub fn to_datetime(value: &Value, column: &str) -> Result<Option<NaiveDateTime>> {
    match value {
        Value::NULL => Ok(None),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            Ok(NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32).and_then(|d| {
                d.and_hms_micro_opt(*hour as u32, *minute as u32, *second as u32, *micros)
            }))
        }
        Value::Bytes(b) => {
            let s = text(b, column)?;
            if s.starts_with("0000-00-00") {
                return Ok(None);
            }
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| {
                    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                        .map(|d| d.and_time(NaiveTime::default()))
                })
                .map(Some)
                .map_err(|e| invalid(column, format!("'{s}': {e}")).into())
        }
        other => Err(invalid(column, format!("expected datetime, got {other:?}")).into()),
    }
}

/// DECIMAL column
pub fn to_decimal(value: &Value, column: &str) -> Result<Option<Decimal>> {
    match value {
        Value::NULL => Ok(None),
        Value::Bytes(b) => {
            let s = text(b, column)?;
            Decimal::from_str(s.trim())
                .map(Some)
                .map_err(|e| invalid(column, format!("'{s}': {e}")).into())
        }
        Value::Int(i) => Ok(Some(Decimal::from(*i))),
        Value::UInt(u) => Ok(Some(Decimal::from(*u))),
        Value::Double(d) => Decimal::try_from(*d)
            .map(Some)
            .map_err(|e| invalid(column, e.to_string()).into()),
        Value::Float(f) => Decimal::try_from(*f)
            .map(Some)
            .map_err(|e| invalid(column, e.to_string()).into()),
        other => Err(invalid(column, format!("expected decimal, got {other:?}")).into()),
    }
}

/// TINYINT(1)/BOOLEAN column
pub fn to_bool(value: &Value, column: &str) -> Result<Option<bool>> {
    Ok(to_i32(value, column)?.map(|i| i != 0))
}

/// Bind parameter for a DATETIME comparison
pub fn datetime_param(ts: NaiveDateTime) -> Value {
    Value::Date(
        ts.year() as u16,
        ts.month() as u8,
        ts.day() as u8,
        ts.hour() as u8,
        ts.minute() as u8,
        ts.second() as u8,
        ts.nanosecond() / 1_000,
    )
}

/// Named-column access to a result row
pub struct RowReader<'a> {
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a Row) -> Self {
        Self { row }
    }

    fn value(&self, column: &str) -> Result<&'a Value> {
        let index = self
            .row
            .columns_ref()
            .iter()
            .position(|c| c.name_str() == column)
            .ok_or_else(|| invalid(column, "column missing from result set"))?;
        self.row
            .as_ref(index)
            .ok_or_else(|| invalid(column, "value already taken from row").into())
    }

    pub fn opt_i32(&self, column: &str) -> Result<Option<i32>> {
        to_i32(self.value(column)?, column)
    }

    pub fn i32(&self, column: &str) -> Result<i32> {
        required(self.opt_i32(column)?, column)
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>> {
        to_text(self.value(column)?, column)
    }

    pub fn text(&self, column: &str) -> Result<String> {
        required(self.opt_text(column)?, column)
    }

    pub fn opt_datetime(&self, column: &str) -> Result<Option<NaiveDateTime>> {
        to_datetime(self.value(column)?, column)
    }

    pub fn datetime(&self, column: &str) -> Result<NaiveDateTime> {
        required(self.opt_datetime(column)?, column)
    }

    pub fn opt_decimal(&self, column: &str) -> Result<Option<Decimal>> {
        to_decimal(self.value(column)?, column)
    }

    pub fn decimal(&self, column: &str) -> Result<Decimal> {
        required(self.opt_decimal(column)?, column)
    }

    pub fn bool(&self, column: &str) -> Result<bool> {
        required(to_bool(self.value(column)?, column)?, column)
    }
}

fn required<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| invalid(column, "unexpected NULL").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StarsyncError;
    use test_case::test_case;

    fn bytes(s: &str) -> Value {
        Value::Bytes(s.as_bytes().to_vec())
    }

    #[test_case(Value::Int(42), Some(42) ; "binary int")]
    #[test_case(Value::UInt(7), Some(7) ; "binary uint")]
    #[test_case(bytes("599"), Some(599) ; "text int")]
    #[test_case(Value::NULL, None ; "null")]
    fn test_to_i32(value: Value, expected: Option<i32>) {
        assert_eq!(to_i32(&value, "film_id").unwrap(), expected);
    }

    #[test]
    fn test_to_i32_out_of_range() {
        let err = to_i32(&Value::UInt(u64::MAX), "film_id").unwrap_err();
        assert!(matches!(
            err,
            StarsyncError::Source(SourceError::InvalidValue { ref column, .. }) if column == "film_id"
        ));
    }

    #[test]
    fn test_to_datetime_binary_and_text() {
        let expected = NaiveDate::from_ymd_opt(2006, 2, 15)
            .unwrap()
            .and_hms_opt(5, 3, 42)
            .unwrap();

        let binary = Value::Date(2006, 2, 15, 5, 3, 42, 0);
        assert_eq!(to_datetime(&binary, "last_update").unwrap(), Some(expected));
        assert_eq!(
            to_datetime(&bytes("2006-02-15 05:03:42"), "last_update").unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_zero_date_is_none() {
        assert_eq!(to_datetime(&bytes("0000-00-00 00:00:00"), "return_date").unwrap(), None);
        assert_eq!(to_datetime(&Value::Date(0, 0, 0, 0, 0, 0, 0), "return_date").unwrap(), None);
    }

    #[test]
    fn test_to_decimal_from_text() {
        assert_eq!(
            to_decimal(&bytes("2.99"), "amount").unwrap(),
            Some(Decimal::new(299, 2))
        );
        assert!(to_decimal(&bytes("abc"), "amount").is_err());
    }

    #[test_case(bytes("1"), Some(true) ; "text true")]
    #[test_case(Value::Int(0), Some(false) ; "binary false")]
    #[test_case(Value::NULL, None ; "null")]
    fn test_to_bool(value: Value, expected: Option<bool>) {
        assert_eq!(to_bool(&value, "active").unwrap(), expected);
    }

    #[test]
    fn test_release_year_as_text() {
        assert_eq!(to_text(&Value::Int(2006), "release_year").unwrap(), Some("2006".to_string()));
        assert_eq!(to_text(&bytes("2006"), "release_year").unwrap(), Some("2006".to_string()));
    }

    #[test]
    fn test_datetime_param() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_micro_opt(10, 30, 5, 250)
            .unwrap();
        assert_eq!(datetime_param(ts), Value::Date(2024, 3, 15, 10, 30, 5, 250));
    }
}
