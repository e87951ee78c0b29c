//! Organisational holidays.
//!
//! Holidays are excluded from working days and counted as paid days by the
//! attendance reconciler.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of holiday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayType {
    /// National holiday (e.g., Independence Day).
    #[default]
    National,
    /// Festival holiday (e.g., Eid).
    Festival,
    /// Religious holiday.
    Religious,
    /// Optional holiday.
    Optional,
    /// Weekly holiday.
    Weekly,
    /// Special, one-off holiday.
    Special,
}

/// A holiday on a single calendar date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Holiday, HolidayType};
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     id: 1,
///     date: NaiveDate::from_ymd_opt(2024, 2, 21).unwrap(),
///     name: "Shaheed Day".to_string(),
///     holiday_type: HolidayType::National,
///     is_repeat_annually: true,
/// };
/// assert!(holiday.falls_within(
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Unique identifier, assigned by the store.
    #[serde(default)]
    pub id: i64,
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// The kind of holiday.
    #[serde(default, rename = "type")]
    pub holiday_type: HolidayType,
    /// Whether the holiday recurs on the same date every year.
    #[serde(default)]
    pub is_repeat_annually: bool,
}

impl Holiday {
    /// Checks if the holiday falls within `[start, end]` (inclusive).
    pub fn falls_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.date >= start && self.date <= end
    }
}
