//! The South African public-holiday calendar.
//!
//! Generates the statutory holiday set for a year: twelve fixed-date
//! holidays plus the two Easter-derived ones (Good Friday and Family Day).
//! Under section 2(1) of the Public Holidays Act, a holiday falling on a
//! Sunday is observed on the following Monday; generated entries for such
//! holidays carry the Monday as their date and the Sunday as
//! `original_date`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use uuid::Uuid;

use crate::models::PublicHoliday;

/// The fixed-date statutory holidays: (month, day, name).
const FIXED_HOLIDAYS: [(u32, u32, &str); 10] = [
    (1, 1, "New Year's Day"),
    (3, 21, "Human Rights Day"),
    (4, 27, "Freedom Day"),
    (5, 1, "Workers' Day"),
    (6, 16, "Youth Day"),
    (8, 9, "National Women's Day"),
    (9, 24, "Heritage Day"),
    (12, 16, "Day of Reconciliation"),
    (12, 25, "Christmas Day"),
    (12, 26, "Day of Goodwill"),
];

/// Computes Easter Sunday for a year in the Gregorian calendar
/// (anonymous/Meeus computus).
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("computus yields a valid date")
}

fn observe(date: NaiveDate, name: &str) -> PublicHoliday {
    let (observed_date, original_date) = if date.weekday() == Weekday::Sun {
        (date + Duration::days(1), Some(date))
    } else {
        (date, None)
    };
    PublicHoliday {
        id: Uuid::new_v4(),
        date: observed_date,
        name: name.to_string(),
        observed: true,
        original_date,
    }
}

/// Generates the observed South African public holidays for a year,
/// sorted by date.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::south_african_holidays;
///
/// let holidays = south_african_holidays(2025);
/// assert_eq!(holidays.len(), 12);
/// assert!(holidays.iter().any(|h| h.name == "Heritage Day"));
/// ```
pub fn south_african_holidays(year: i32) -> Vec<PublicHoliday> {
    let mut holidays: Vec<PublicHoliday> = FIXED_HOLIDAYS
        .iter()
        .map(|&(month, day, name)| {
            let date =
                NaiveDate::from_ymd_opt(year, month, day).expect("fixed holiday dates are valid");
            observe(date, name)
        })
        .collect();

    let easter = easter_sunday(year);
    // Good Friday and Family Day flank Easter Sunday, so neither can land
    // on a Sunday.
    holidays.push(observe(easter - Duration::days(2), "Good Friday"));
    holidays.push(observe(easter + Duration::days(1), "Family Day"));

    holidays.sort_by_key(|h| h.date);
    holidays
}
