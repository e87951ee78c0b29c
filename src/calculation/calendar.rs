//! Calendar day classification.
//!
//! This module classifies each day of an inclusive date range as a weekend,
//! a holiday, or a working day, and summarises the range into counts used
//! by attendance reconciliation and payroll processing.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{PayrollError, PayrollResult};

/// How a holiday that falls on a weekend is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendHolidayOverlap {
    /// The day is counted both as a weekend day and as a holiday, so it is
    /// subtracted twice from the calendar days.
    #[default]
    CountTwice,
    /// The day is counted as a weekend day only.
    CountOnce,
}

/// The classification of a single calendar day.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{DayKind, classify_day};
/// use chrono::NaiveDate;
///
/// // 2024-01-06 is a Saturday
/// let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
/// assert_eq!(classify_day(saturday, &[]), DayKind::Weekend);
///
/// let holiday = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
/// assert_eq!(classify_day(holiday, &[holiday]), DayKind::Holiday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Monday through Friday and not a holiday.
    Working,
    /// Saturday or Sunday.
    Weekend,
    /// An organisational holiday on a weekday.
    Holiday,
}

impl std::fmt::Display for DayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayKind::Working => write!(f, "Working"),
            DayKind::Weekend => write!(f, "Weekend"),
            DayKind::Holiday => write!(f, "Holiday"),
        }
    }
}

/// Returns true for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Classifies a single day. Weekends take precedence over holidays.
pub fn classify_day(date: NaiveDate, holidays: &[NaiveDate]) -> DayKind {
    if is_weekend(date) {
        DayKind::Weekend
    } else if holidays.contains(&date) {
        DayKind::Holiday
    } else {
        DayKind::Working
    }
}

/// Day counts for an inclusive date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    /// Days from start to end, inclusive.
    pub total_calendar_days: i64,
    /// Saturdays and Sundays in the range.
    pub weekend_days: i64,
    /// Distinct holiday dates counted against the range.
    pub holiday_days: i64,
    /// Calendar days minus weekend days minus holiday days, never negative.
    pub working_days: i64,
}

/// Summarises a date range into calendar, weekend, holiday and working days.
///
/// Holiday dates outside the range are ignored and duplicate dates count
/// once. Under [`WeekendHolidayOverlap::CountTwice`] a holiday on a weekend
/// is subtracted both as a weekend day and as a holiday; under
/// [`WeekendHolidayOverlap::CountOnce`] it is only a weekend day.
///
/// # Arguments
///
/// * `start` - First day of the range (inclusive)
/// * `end` - Last day of the range (inclusive)
/// * `holidays` - Holiday dates; need not be sorted or limited to the range
/// * `overlap` - How holidays on weekends are counted
///
/// # Errors
///
/// Returns a `Validation` error when `end` precedes `start`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{WeekendHolidayOverlap, classify_range};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// let republic_day = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
///
/// let summary =
///     classify_range(start, end, &[republic_day], WeekendHolidayOverlap::CountTwice).unwrap();
/// assert_eq!(summary.total_calendar_days, 31);
/// assert_eq!(summary.weekend_days, 8);
/// assert_eq!(summary.holiday_days, 1);
/// assert_eq!(summary.working_days, 22);
/// ```
pub fn classify_range(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &[NaiveDate],
    overlap: WeekendHolidayOverlap,
) -> PayrollResult<CalendarSummary> {
    if end < start {
        return Err(PayrollError::validation(
            "end_date",
            format!("{} precedes start date {}", end, start),
        ));
    }

    let total_calendar_days = (end - start).num_days() + 1;
    let weekend_days = start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| is_weekend(*date))
        .count() as i64;

    let in_range: BTreeSet<NaiveDate> = holidays
        .iter()
        .copied()
        .filter(|date| *date >= start && *date <= end)
        .filter(|date| match overlap {
            WeekendHolidayOverlap::CountTwice => true,
            WeekendHolidayOverlap::CountOnce => !is_weekend(*date),
        })
        .collect();
    let holiday_days = in_range.len() as i64;

    let working_days = (total_calendar_days - weekend_days - holiday_days).max(0);

    Ok(CalendarSummary {
        total_calendar_days,
        weekend_days,
        holiday_days,
        working_days,
    })
}
