//! Working-day counting.
//!
//! A working day is a calendar day that is not a Saturday or Sunday and not
//! an observed public holiday. Counts are inclusive of both range endpoints.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{HalfDayPeriod, PublicHoliday};

/// Returns true for Monday through Friday.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::is_weekday;
/// use chrono::NaiveDate;
///
/// // 2025-06-02 is a Monday, 2025-06-07 a Saturday
/// assert!(is_weekday(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()));
/// assert!(!is_weekday(NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()));
/// ```
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the working days in the inclusive range `[start, end]`.
///
/// Weekends and observed public holidays are excluded. Holidays that were
/// shifted off a Sunday count only on their observed date; the `holidays`
/// slice must cover every calendar year the range touches.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when `end < start`; callers are
/// expected to reject such ranges before asking for a count.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// // Monday to Friday, no holidays
/// let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
/// assert_eq!(count_working_days(start, end, &[]).unwrap(), Decimal::from(5));
/// ```
pub fn count_working_days(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &[PublicHoliday],
) -> EngineResult<Decimal> {
    if end < start {
        return Err(EngineError::validation(format!(
            "end date {end} is before start date {start}"
        )));
    }

    let observed: HashSet<NaiveDate> = holidays
        .iter()
        .filter(|h| h.observed)
        .map(|h| h.date)
        .collect();

    let mut count: u32 = 0;
    let mut current = start;
    while current <= end {
        if is_weekday(current) && !observed.contains(&current) {
            count += 1;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(Decimal::from(count))
}

/// Computes the working-day cost of a leave request.
///
/// Full-range requests cost [`count_working_days`]. Half-day requests must
/// cover a single calendar day with an explicit morning/afternoon period and
/// cost 0.5 when that day is a working day (0 otherwise).
pub fn leave_request_days(
    start: NaiveDate,
    end: NaiveDate,
    half_day: bool,
    half_day_period: Option<HalfDayPeriod>,
    holidays: &[PublicHoliday],
) -> EngineResult<Decimal> {
    if !half_day {
        return count_working_days(start, end, holidays);
    }

    if start != end {
        return Err(EngineError::validation(
            "half-day requests must start and end on the same date",
        ));
    }
    if half_day_period.is_none() {
        return Err(EngineError::validation(
            "half-day requests must specify morning or afternoon",
        ));
    }

    let full_day = count_working_days(start, end, holidays)?;
    Ok(full_day * Decimal::new(5, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn holiday(date: &str, observed: bool) -> PublicHoliday {
        PublicHoliday {
            id: Uuid::new_v4(),
            date: make_date(date),
            name: "Test Holiday".to_string(),
            observed,
            original_date: None,
        }
    }

    // =========================================================================
    // WD-001: full working week counts five days
    // =========================================================================
    #[test]
    fn test_wd_001_monday_to_friday_is_five_days() {
        // 2025-06-02 is a Monday, 2025-06-06 a Friday; no SA holidays between
        let days = count_working_days(make_date("2025-06-02"), make_date("2025-06-06"), &[]);
        assert_eq!(days.unwrap(), Decimal::from(5));
    }

    // =========================================================================
    // WD-002: weekends never count
    // =========================================================================
    #[test]
    fn test_wd_002_weekend_only_range_is_zero() {
        // 2025-06-07 (Sat) to 2025-06-08 (Sun)
        let days = count_working_days(make_date("2025-06-07"), make_date("2025-06-08"), &[]);
        assert_eq!(days.unwrap(), Decimal::ZERO);
    }

    // =========================================================================
    // WD-003: observed holidays are excluded
    // =========================================================================
    #[test]
    fn test_wd_003_observed_holiday_excluded() {
        // Youth Day 2025-06-16 falls on a Monday
        let holidays = vec![holiday("2025-06-16", true)];
        let days =
            count_working_days(make_date("2025-06-16"), make_date("2025-06-20"), &holidays);
        assert_eq!(days.unwrap(), Decimal::from(4));
    }

    // =========================================================================
    // WD-004: unobserved entries do not reduce the count
    // =========================================================================
    #[test]
    fn test_wd_004_unobserved_holiday_still_counts() {
        let holidays = vec![holiday("2025-06-16", false)];
        let days =
            count_working_days(make_date("2025-06-16"), make_date("2025-06-20"), &holidays);
        assert_eq!(days.unwrap(), Decimal::from(5));
    }

    // =========================================================================
    // WD-005: a shifted holiday counts on the observed date only
    // =========================================================================
    #[test]
    fn test_wd_005_shifted_holiday_counts_on_observed_date() {
        // Freedom Day 2025: Sunday Apr 27 observed Monday Apr 28
        let shifted = PublicHoliday {
            id: Uuid::new_v4(),
            date: make_date("2025-04-28"),
            name: "Freedom Day".to_string(),
            observed: true,
            original_date: Some(make_date("2025-04-27")),
        };

        // Mon Apr 28 - Fri May 2, minus the observed Monday and minus
        // Workers' Day (not in the slice here) -> 4 working days
        let days =
            count_working_days(make_date("2025-04-28"), make_date("2025-05-02"), &[shifted]);
        assert_eq!(days.unwrap(), Decimal::from(4));
    }

    // =========================================================================
    // WD-006: single-day ranges
    // =========================================================================
    #[test]
    fn test_wd_006_single_day_range() {
        assert_eq!(
            count_working_days(make_date("2025-06-04"), make_date("2025-06-04"), &[]).unwrap(),
            Decimal::ONE
        );
        assert_eq!(
            count_working_days(make_date("2025-06-07"), make_date("2025-06-07"), &[]).unwrap(),
            Decimal::ZERO
        );
    }

    // =========================================================================
    // WD-007: reversed range is a caller error
    // =========================================================================
    #[test]
    fn test_wd_007_reversed_range_rejected() {
        let err = count_working_days(make_date("2025-06-06"), make_date("2025-06-02"), &[])
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    // =========================================================================
    // WD-008: ranges spanning a year boundary
    // =========================================================================
    #[test]
    fn test_wd_008_year_boundary_range() {
        // Mon 2024-12-23 to Fri 2025-01-03: ten weekdays, minus Christmas,
        // Day of Goodwill, and New Year's Day
        let holidays = vec![
            holiday("2024-12-25", true),
            holiday("2024-12-26", true),
            holiday("2025-01-01", true),
        ];
        let days =
            count_working_days(make_date("2024-12-23"), make_date("2025-01-03"), &holidays);
        assert_eq!(days.unwrap(), Decimal::from(7));
    }

    #[test]
    fn test_half_day_costs_half() {
        let days = leave_request_days(
            make_date("2025-06-04"),
            make_date("2025-06-04"),
            true,
            Some(HalfDayPeriod::Morning),
            &[],
        );
        assert_eq!(days.unwrap(), Decimal::new(5, 1));
    }

    #[test]
    fn test_half_day_requires_single_date() {
        let err = leave_request_days(
            make_date("2025-06-04"),
            make_date("2025-06-05"),
            true,
            Some(HalfDayPeriod::Morning),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn test_half_day_requires_period() {
        let err = leave_request_days(
            make_date("2025-06-04"),
            make_date("2025-06-04"),
            true,
            None,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn test_half_day_on_weekend_costs_zero() {
        let days = leave_request_days(
            make_date("2025-06-07"),
            make_date("2025-06-07"),
            true,
            Some(HalfDayPeriod::Afternoon),
            &[],
        );
        assert_eq!(days.unwrap(), Decimal::ZERO);
    }

    proptest! {
        // Counts are non-negative and bounded by the range length.
        #[test]
        fn prop_count_bounded_by_range(offset in 0i64..3650, len in 0i64..60) {
            let start = make_date("2020-01-01") + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(len);
            let days = count_working_days(start, end, &[]).unwrap();
            prop_assert!(days >= Decimal::ZERO);
            prop_assert!(days <= Decimal::from(len + 1));
        }

        // Extending the range never decreases the count.
        #[test]
        fn prop_count_monotone_in_end_date(offset in 0i64..3650, len in 0i64..60) {
            let start = make_date("2020-01-01") + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(len);
            let shorter = count_working_days(start, end, &[]).unwrap();
            let longer = count_working_days(start, end + chrono::Duration::days(1), &[]).unwrap();
            prop_assert!(longer >= shorter);
        }

        // Every weekend day contributes zero.
        #[test]
        fn prop_weekends_never_counted(offset in 0i64..3650) {
            let date = make_date("2020-01-01") + chrono::Duration::days(offset);
            if !is_weekday(date) {
                let days = count_working_days(date, date, &[]).unwrap();
                prop_assert_eq!(days, Decimal::ZERO);
            }
        }
    }
}
