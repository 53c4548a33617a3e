//! Business-hour deadline calculation.
//!
//! A business hour is an hour that lands on Monday through Friday (UTC). There
//! is no holiday calendar and no per-tenant timezone.

use crate::Timestamp;
use chrono::{Datelike, Duration, Weekday};

/// Default length of the acceptance window, in business hours.
pub const DEFAULT_ACCEPTANCE_WINDOW_HOURS: u32 = 24;

/// Whether the instant falls on a weekday.
pub fn is_business_day(ts: Timestamp) -> bool {
    !matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advance `start` by `hours` business hours.
///
/// Walks one hour at a time; a step counts when the instant it lands on is a
/// business day. Friday 17:00 plus 24 hours is Monday 17:00.
pub fn add_business_hours(start: Timestamp, hours: u32) -> Timestamp {
    let step = Duration::hours(1);
    let mut current = start;
    let mut counted = 0;
    while counted < hours {
        current += step;
        if is_business_day(current) {
            counted += 1;
        }
    }
    current
}

/// Acceptance deadline for an assignment made at `assigned_date`.
pub fn compute_deadline(assigned_date: Timestamp) -> Timestamp {
    add_business_hours(assigned_date, DEFAULT_ACCEPTANCE_WINDOW_HOURS)
}

/// Number of whole business hours stepped through between `start` and `end`.
///
/// Inverse of [`add_business_hours`]: `business_hours_between(s, add_business_hours(s, n)) == n`.
/// Returns 0 when `end <= start`.
pub fn business_hours_between(start: Timestamp, end: Timestamp) -> u32 {
    let step = Duration::hours(1);
    let mut current = start;
    let mut counted = 0;
    while current + step <= end {
        current += step;
        if is_business_day(current) {
            counted += 1;
        }
    }
    counted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // 2024-03-01 is a Friday.

    #[test]
    fn test_friday_evening_rolls_to_monday() {
        assert_eq!(compute_deadline(at(2024, 3, 1, 17)), at(2024, 3, 4, 17));
    }

    #[test]
    fn test_monday_morning_is_next_day() {
        assert_eq!(compute_deadline(at(2024, 3, 4, 10)), at(2024, 3, 5, 10));
    }

    #[test]
    fn test_wednesday_is_next_day() {
        assert_eq!(compute_deadline(at(2024, 3, 6, 9)), at(2024, 3, 7, 9));
    }

    #[test]
    fn test_saturday_start_lands_on_monday() {
        // Nothing counts until Monday 00:00, which is the first business hour.
        assert_eq!(compute_deadline(at(2024, 3, 2, 12)), at(2024, 3, 4, 23));
    }

    #[test]
    fn test_zero_hours_is_identity() {
        let start = at(2024, 3, 2, 12);
        assert_eq!(add_business_hours(start, 0), start);
    }

    #[test]
    fn test_is_business_day() {
        assert!(is_business_day(at(2024, 3, 1, 23)));
        assert!(!is_business_day(at(2024, 3, 2, 0)));
        assert!(!is_business_day(at(2024, 3, 3, 23)));
        assert!(is_business_day(at(2024, 3, 4, 0)));
    }

    #[test]
    fn test_business_hours_between_weekend() {
        assert_eq!(business_hours_between(at(2024, 3, 1, 17), at(2024, 3, 4, 17)), 24);
        assert_eq!(business_hours_between(at(2024, 3, 2, 0), at(2024, 3, 3, 23)), 0);
        assert_eq!(business_hours_between(at(2024, 3, 4, 10), at(2024, 3, 4, 9)), 0);
    }

    fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // 2020-01-01 .. 2030-01-01, minute resolution
        (1_577_836_800i64..1_893_456_000i64)
            .prop_map(|secs| Utc.timestamp_opt(secs - secs % 60, 0).unwrap())
    }

    proptest! {
        #[test]
        fn prop_deadline_counts_exactly_the_window(start in arb_timestamp()) {
            let deadline = compute_deadline(start);
            prop_assert_eq!(
                business_hours_between(start, deadline),
                DEFAULT_ACCEPTANCE_WINDOW_HOURS
            );
        }

        #[test]
        fn prop_deadline_lands_on_business_day(start in arb_timestamp()) {
            prop_assert!(is_business_day(compute_deadline(start)));
        }

        #[test]
        fn prop_deadline_span_is_bounded(start in arb_timestamp()) {
            let span = compute_deadline(start) - start;
            prop_assert!(span >= Duration::hours(24));
            prop_assert!(span <= Duration::hours(72));
        }

        #[test]
        fn prop_add_business_hours_is_additive(start in arb_timestamp(), a in 0u32..60, b in 0u32..60) {
            prop_assert_eq!(
                add_business_hours(add_business_hours(start, a), b),
                add_business_hours(start, a + b)
            );
        }
    }
}
