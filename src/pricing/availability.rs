//! Availability rules for stay date ranges.
//!
//! Stay and blocked ranges are half-open: the end date is the checkout
//! day and may coincide with the start date of the next stay. All
//! overlap arithmetic in the crate uses this convention.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::calculators::nights_between;
use super::models::PricingPeriod;

/// A half-open occupied date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Two half-open ranges overlap iff each starts before the other
    /// ends. Ranges that only share a boundary date do not overlap:
    /// checkout day and the next check-in may coincide.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Why a date range cannot be booked.
///
/// Only the first failing check is reported, in the order booked,
/// blocked, stay-length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum UnavailableReason {
    AlreadyBooked,
    Blocked,
    TooShort { min_nights: i32 },
    TooLong { max_nights: i32 },
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::AlreadyBooked => {
                write!(f, "Der Zeitraum ist bereits belegt.")
            }
            UnavailableReason::Blocked => {
                write!(f, "Der Zeitraum ist leider nicht verfügbar.")
            }
            UnavailableReason::TooShort { min_nights } => {
                write!(f, "Mindestaufenthalt: {} Nächte.", min_nights)
            }
            UnavailableReason::TooLong { max_nights } => {
                write!(f, "Maximaler Aufenthalt: {} Nächte.", max_nights)
            }
        }
    }
}

/// Check whether a candidate stay can be booked.
///
/// `bookings` must already be filtered to non-cancelled rows. Returns
/// the first failing check as a value; infrastructure failures are the
/// caller's concern.
pub fn check_availability(
    stay: DateRange,
    bookings: &[DateRange],
    blocks: &[DateRange],
    period: &PricingPeriod,
) -> Result<(), UnavailableReason> {
    if bookings.iter().any(|b| b.overlaps(&stay)) {
        return Err(UnavailableReason::AlreadyBooked);
    }
    if blocks.iter().any(|b| b.overlaps(&stay)) {
        return Err(UnavailableReason::Blocked);
    }

    let nights = nights_between(stay.start, stay.end);
    if nights < i64::from(period.min_nights) {
        return Err(UnavailableReason::TooShort {
            min_nights: period.min_nights,
        });
    }
    if nights > i64::from(period.max_nights) {
        return Err(UnavailableReason::TooLong {
            max_nights: period.max_nights,
        });
    }

    Ok(())
}

/// Expand occupied ranges into the set of individual occupied nights.
///
/// Used for calendar highlighting; the checkout day itself is free.
pub fn occupied_days(ranges: &[DateRange]) -> BTreeSet<NaiveDate> {
    let mut days = BTreeSet::new();
    for range in ranges {
        let mut day = range.start;
        while day < range.end {
            days.insert(day);
            day += Duration::days(1);
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::SeasonType;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(date(2025, 7, start), date(2025, 7, end))
    }

    fn period(min_nights: i32, max_nights: i32) -> PricingPeriod {
        PricingPeriod {
            id: Uuid::new_v4(),
            start_date: date(2025, 6, 1),
            end_date: date(2025, 9, 30),
            season_type: SeasonType::High,
            base_price: dec!(110),
            room_surcharge: dec!(20),
            min_nights,
            max_nights,
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    // ==================== overlap tests ====================

    #[test]
    fn test_one_day_overlap_rejected() {
        // Existing stay occupies the nights of the 10th and 11th; a new
        // stay over the night of the 11th collides.
        let existing = vec![range(10, 12)];
        let result = check_availability(range(11, 15), &existing, &[], &period(1, 30));
        assert_eq!(result, Err(UnavailableReason::AlreadyBooked));
    }

    #[test]
    fn test_abutting_range_accepted() {
        // Checkout on the 12th, next check-in on the 12th: no conflict.
        let existing = vec![range(10, 12)];
        let result = check_availability(range(12, 16), &existing, &[], &period(1, 30));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_abutting_before_accepted() {
        let existing = vec![range(10, 12)];
        let result = check_availability(range(6, 10), &existing, &[], &period(1, 30));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_containment_rejected() {
        let existing = vec![range(8, 20)];
        let result = check_availability(range(10, 12), &existing, &[], &period(1, 30));
        assert_eq!(result, Err(UnavailableReason::AlreadyBooked));
    }

    #[test]
    fn test_blocked_range_rejected() {
        let blocks = vec![range(14, 18)];
        let result = check_availability(range(15, 20), &[], &blocks, &period(1, 30));
        assert_eq!(result, Err(UnavailableReason::Blocked));
    }

    // ==================== stay-length tests ====================

    #[test]
    fn test_min_nights_enforced() {
        let result = check_availability(range(10, 13), &[], &[], &period(4, 21));
        assert_eq!(result, Err(UnavailableReason::TooShort { min_nights: 4 }));
    }

    #[test]
    fn test_max_nights_enforced() {
        let result = check_availability(range(1, 30), &[], &[], &period(4, 21));
        assert_eq!(result, Err(UnavailableReason::TooLong { max_nights: 21 }));
    }

    #[test]
    fn test_exact_bounds_accepted() {
        let p = period(4, 21);
        assert_eq!(check_availability(range(10, 14), &[], &[], &p), Ok(()));
        assert_eq!(check_availability(range(1, 22), &[], &[], &p), Ok(()));
    }

    #[test]
    fn test_first_failing_check_wins() {
        // Overlap and stay-length both violated: overlap is reported
        let existing = vec![range(10, 12)];
        let result = check_availability(range(11, 12), &existing, &[], &period(4, 21));
        assert_eq!(result, Err(UnavailableReason::AlreadyBooked));
    }

    // ==================== calendar expansion tests ====================

    #[test]
    fn test_occupied_days_excludes_checkout() {
        let days = occupied_days(&[range(10, 12)]);
        assert!(days.contains(&date(2025, 7, 10)));
        assert!(days.contains(&date(2025, 7, 11)));
        assert!(!days.contains(&date(2025, 7, 12)));
    }

    #[test]
    fn test_occupied_days_merges_ranges() {
        let days = occupied_days(&[range(10, 12), range(11, 14)]);
        assert_eq!(days.len(), 4); // 10, 11, 12, 13
    }
}
