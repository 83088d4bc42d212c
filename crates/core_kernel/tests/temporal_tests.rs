//! Tests for calendar helpers used by policy validity windows

use chrono::{Datelike, NaiveDate};
use core_kernel::{add_years, Timezone, ValidityPeriod};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_annual_term_across_leap_year() {
    let period = ValidityPeriod::annual(date(2024, 1, 1)).unwrap();
    assert_eq!(period.end, date(2025, 1, 1));
    assert_eq!(period.days(), 366);
}

#[test]
fn test_annual_term_from_leap_day() {
    let period = ValidityPeriod::annual(date(2028, 2, 29)).unwrap();
    assert_eq!(period.end, date(2029, 2, 28));
}

#[test]
fn test_default_timezone_is_caracas() {
    assert_eq!(Timezone::default().name(), "America/Caracas");
}

#[test]
fn test_date_of_uses_local_calendar() {
    use chrono::{TimeZone, Utc};
    // 02:00 UTC on March 2nd is still March 1st in Caracas (UTC-4)
    let instant = Utc.with_ymd_and_hms(2025, 3, 2, 2, 0, 0).unwrap();
    assert_eq!(Timezone::default().date_of(instant), date(2025, 3, 1));
}

proptest! {
    #[test]
    fn prop_add_one_year_keeps_month(days in 0i64..40_000) {
        let start = date(1990, 1, 1) + chrono::Duration::days(days);
        let end = add_years(start, 1).unwrap();
        prop_assert_eq!(end.year(), start.year() + 1);
        prop_assert_eq!(end.month(), start.month());
        prop_assert!(end.day() == start.day() || (start.month() == 2 && start.day() == 29 && end.day() == 28));
    }
}
