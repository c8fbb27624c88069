//! Order number generation
//!
//! Human-facing identifier derived from the numeric id, never parsed back.
//! Format: `ORD-YYYYMMDD-NNNNNN`, e.g. `ORD-20251130-000045`. The counter is
//! the global order id, not a per-day sequence, so numbers never collide.

use chrono::NaiveDate;

use crate::utils::time::{compact_date, today_local};

/// Order number for an id created today (local date)
pub fn order_number(order_id: i64) -> String {
    order_number_on(order_id, today_local())
}

/// Order number for an id created on a given date
pub fn order_number_on(order_id: i64, date: NaiveDate) -> String {
    format!("ORD-{}-{:06}", compact_date(date), order_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_the_id_to_six_digits() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        assert_eq!(order_number_on(45, date), "ORD-20251130-000045");
        assert_eq!(order_number_on(1234, date), "ORD-20251130-001234");
    }

    #[test]
    fn ids_beyond_six_digits_are_not_truncated() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(order_number_on(1_234_567, date), "ORD-20260102-1234567");
    }

    #[test]
    fn uses_todays_local_date() {
        let number = order_number(7);
        let expected_prefix = format!("ORD-{}-", compact_date(today_local()));
        assert!(number.starts_with(&expected_prefix), "got {number}");
        assert!(number.ends_with("000007"));
    }
}
