//! Attendance records.
//!
//! An [`Attendance`] row exists at most once per employee per calendar date.
//! It is created at clock-in and completed at clock-out.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The outcome recorded for a single attendance day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present and on time.
    Present,
    /// Absent for the whole day.
    Absent,
    /// Clocked in after the shift start plus grace time.
    Late,
    /// Present for part of the day.
    HalfDay,
    /// On approved leave.
    Leave,
    /// Organisational holiday.
    Holiday,
    /// Weekend day.
    Weekend,
    /// Working off-site on duty.
    OnDuty,
    /// Compensatory day off.
    Compensatory,
}

/// How an attendance record was captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Entered by HR staff.
    #[default]
    Manual,
    /// Imported from a biometric device.
    Biometric,
    /// Generated by the system.
    Auto,
    /// Captured from the mobile app.
    Mobile,
    /// Captured from the web portal.
    Web,
}

/// A single day's attendance for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The employee this record belongs to.
    pub employee_id: i64,
    /// The calendar date.
    pub date: NaiveDate,
    /// Clock-in time.
    pub clock_in: Option<NaiveTime>,
    /// Clock-out time.
    pub clock_out: Option<NaiveTime>,
    /// The derived status for the day.
    pub status: AttendanceStatus,
    /// Minutes after shift start, for late arrivals.
    #[serde(default)]
    pub late_minutes: Option<i64>,
    /// Minutes before shift end, for early departures.
    #[serde(default)]
    pub early_leaving_minutes: Option<i64>,
    /// Hours between clock-in and clock-out.
    #[serde(default)]
    pub working_hours: Option<Decimal>,
    /// Hours worked beyond the shift's standard hours.
    #[serde(default)]
    pub overtime_hours: Option<Decimal>,
    /// How the record was captured.
    #[serde(default)]
    pub entry_type: EntryType,
    /// Free-text remarks (corrections, device notes).
    #[serde(default)]
    pub remarks: Option<String>,
}

impl Attendance {
    /// Creates a record with just a status, as produced by bulk imports.
    pub fn with_status(employee_id: i64, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: 0,
            employee_id,
            date,
            clock_in: None,
            clock_out: None,
            status,
            late_minutes: None,
            early_leaving_minutes: None,
            working_hours: None,
            overtime_hours: None,
            entry_type: EntryType::Manual,
            remarks: None,
        }
    }
}
