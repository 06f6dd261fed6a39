//! Calendar helpers. "Today" is the server's local date.

use chrono::{Datelike, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The first day of the month containing `date` and the first day of the following month.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let next = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX);
    (first, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_month_bounds_mid_month() {
        assert_eq!(month_bounds(date(2024, 2, 17)), (date(2024, 2, 1), date(2024, 3, 1)));
    }

    #[test]
    fn test_month_bounds_wraps_december() {
        assert_eq!(month_bounds(date(2023, 12, 31)), (date(2023, 12, 1), date(2024, 1, 1)));
    }
}
