//! Time utilities
//!
//! Repositories and wire payloads carry `i64` Unix millis; conversions to
//! calendar dates happen here.

use chrono::{Local, NaiveDate};

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Today's date in the server's local timezone
///
/// Order and receipt numbers embed the local creation date.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as YYYYMMDD for human-facing document numbers
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_date_has_no_separators() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        assert_eq!(compact_date(date), "20251130");
    }

    #[test]
    fn now_millis_is_plausible() {
        // After 2020-01-01 and below the i64 ceiling
        let now = now_millis();
        assert!(now > 1_577_836_800_000);
    }
}
