//! Work shift model.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A work schedule assigned to employees.
///
/// The shift drives the Late status at clock-in and overtime at clock-out.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Shift;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let shift = Shift {
///     id: 1,
///     name: "General".to_string(),
///     code: "GEN".to_string(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     grace_time_minutes: 15,
///     working_hours: Decimal::new(8, 0),
/// };
/// assert_eq!(shift.latest_on_time_arrival(), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Short code (e.g., "GEN").
    pub code: String,
    /// Scheduled start time.
    pub start_time: NaiveTime,
    /// Scheduled end time.
    pub end_time: NaiveTime,
    /// Minutes after the start time before an arrival counts as late.
    #[serde(default)]
    pub grace_time_minutes: i64,
    /// Standard working hours; time beyond this is overtime.
    pub working_hours: Decimal,
}

impl Shift {
    /// The last clock-in time that is still counted as on time.
    pub fn latest_on_time_arrival(&self) -> NaiveTime {
        self.start_time + chrono::Duration::minutes(self.grace_time_minutes)
    }

    /// Whether the shift ends on the day after it starts (e.g. 22:00 to 06:00).
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }
}
