//! Time helpers for record stamping and the My Day pull window.
//!
//! All timestamps are UTC and serialize as RFC 3339 so they compare the same
//! way on every device that touches a record.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Default My Day lookback in days.
pub const DEFAULT_DAY_WINDOW: u32 = 30;

/// Smallest permitted My Day lookback: today plus the previous day, so a
/// pin made just before midnight is still pulled on the next calendar day.
pub const MIN_DAY_WINDOW: u32 = 2;

/// Current UTC timestamp.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC calendar day.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// UTC date key (`YYYY-MM-DD`) for a calendar day.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Inclusive lower bound of the My Day pull window anchored at `anchor`.
///
/// The window always covers at least [`MIN_DAY_WINDOW`] days including the
/// anchor day itself: `days_back = 1` anchored at day D yields D-1, so D-1
/// pins are pulled and D-2 pins are not.
pub fn window_start(anchor: NaiveDate, days_back: u32) -> NaiveDate {
    let effective = days_back.max(MIN_DAY_WINDOW);
    anchor
        .checked_sub_days(Days::new(u64::from(effective - 1)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: &str) -> NaiveDate {
        value.parse().unwrap()
    }

    #[test]
    fn day_key_formats_as_date() {
        assert_eq!(day_key(day("2026-03-05")), "2026-03-05");
    }

    #[test]
    fn window_start_enforces_two_day_minimum() {
        let anchor = day("2026-03-05");
        let start = window_start(anchor, 1);
        assert_eq!(start, day("2026-03-04"));
        assert!(day("2026-03-04") >= start);
        assert!(day("2026-03-03") < start);
    }

    #[test]
    fn window_start_spans_requested_days() {
        let anchor = day("2026-03-10");
        assert_eq!(window_start(anchor, 7), day("2026-03-04"));
    }

    #[test]
    fn window_start_crosses_month_boundary() {
        assert_eq!(window_start(day("2026-03-02"), 5), day("2026-02-26"));
    }
}
