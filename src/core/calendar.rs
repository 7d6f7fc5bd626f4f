//! Calendar dimension seeding

use crate::adapters::database::traits::TargetStore;
use crate::domain::target::DimDate;
use crate::domain::{DateKey, Result};
use chrono::{Datelike, NaiveDate, Weekday};

/// One `dim_date` row
pub fn calendar_day(date: NaiveDate) -> DimDate {
    let month = date.month() as i32;
    DimDate {
        date_key: DateKey::from_date(date),
        date,
        year: date.year(),
        quarter: (month - 1) / 3 + 1,
        month,
        day_of_month: date.day() as i32,
        day_of_week: date.weekday().num_days_from_monday() as i32,
        is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

/// Every day from `start` to `end`, inclusive
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> Vec<DimDate> {
    start.iter_days().take_while(|d| *d <= end).map(calendar_day).collect()
}

/// Seed `dim_date` unless it already holds rows
///
/// Returns the number of rows written, 0 when the calendar was already seeded.
///
/// # Errors
///
/// Returns an error if the target cannot be read or the insert fails.
pub async fn seed_calendar(target: &dyn TargetStore, start: NaiveDate, end: NaiveDate) -> Result<u64> {
    if target.calendar_seeded().await? {
        tracing::info!("Calendar dimension already seeded, skipping");
        return Ok(0);
    }

    let days = calendar_days(start, end);
    let inserted = target.insert_calendar(&days).await?;

    tracing::info!(
        start = %start,
        end = %end,
        rows = inserted,
        "Calendar dimension seeded"
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTarget;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_day_attributes() {
        // 2024-03-16 is a Saturday
        let day = calendar_day(date(2024, 3, 16));
        assert_eq!(day.date_key.value(), 20240316);
        assert_eq!(day.year, 2024);
        assert_eq!(day.quarter, 1);
        assert_eq!(day.month, 3);
        assert_eq!(day.day_of_month, 16);
        assert_eq!(day.day_of_week, 5);
        assert!(day.is_weekend);

        let monday = calendar_day(date(2024, 10, 14));
        assert_eq!(monday.day_of_week, 0);
        assert_eq!(monday.quarter, 4);
        assert!(!monday.is_weekend);
    }

    #[test]
    fn test_calendar_days_inclusive() {
        let days = calendar_days(date(2024, 2, 27), date(2024, 3, 1));
        let keys: Vec<i32> = days.iter().map(|d| d.date_key.value()).collect();
        assert_eq!(keys, vec![20240227, 20240228, 20240229, 20240301]);
        assert!(calendar_days(date(2024, 3, 2), date(2024, 3, 1)).is_empty());
    }

    #[tokio::test]
    async fn test_seed_calendar_once() {
        let target = InMemoryTarget::new();

        let first = seed_calendar(&target, date(2000, 1, 1), date(2000, 12, 31)).await.unwrap();
        let second = seed_calendar(&target, date(2000, 1, 1), date(2000, 12, 31)).await.unwrap();

        assert_eq!(first, 366);
        assert_eq!(second, 0);
        assert_eq!(target.calendar_len().unwrap(), 366);
    }
}
