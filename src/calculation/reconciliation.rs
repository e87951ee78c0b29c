//! Attendance reconciliation.
//!
//! Combines a [`CalendarSummary`] with attendance rows and approved leave
//! to produce the day counts that drive payroll. Everything here is pure;
//! data loading lives in [`crate::services::AttendanceService`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{Attendance, AttendanceStatus, Leave};

use super::CalendarSummary;

/// The portion of one approved leave that falls inside a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOverlap {
    /// Days inside the period; exactly 0.5 for half-day leave.
    pub days: Decimal,
    /// Whether the leave type is paid. A missing leave type is unpaid.
    pub is_paid: bool,
}

/// Computes how many days of `leave` fall inside `[start, end]`.
///
/// Returns `None` when the leave does not intersect the period. Half-day
/// leave always counts 0.5, whatever dates it spans.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::leave_overlap_days;
/// use payroll_engine::models::{Leave, LeaveStatus};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let leave = Leave {
///     id: 1,
///     employee_id: 1,
///     leave_type_id: 1,
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
///     total_days: Decimal::new(4, 0),
///     reason: None,
///     status: LeaveStatus::Approved,
///     applied_on: Utc::now(),
///     approved_by: None,
///     approval_date: None,
///     approval_remarks: None,
///     is_half_day: false,
///     half_day_portion: None,
///     cancelled_by: None,
///     cancelled_date: None,
///     cancellation_reason: None,
/// };
///
/// let days = leave_overlap_days(
///     &leave,
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
/// );
/// assert_eq!(days, Some(Decimal::new(2, 0)));
/// ```
pub fn leave_overlap_days(leave: &Leave, start: NaiveDate, end: NaiveDate) -> Option<Decimal> {
    if !leave.overlaps(start, end) {
        return None;
    }
    if leave.is_half_day {
        return Some(Decimal::new(5, 1));
    }
    let from = leave.start_date.max(start);
    let to = leave.end_date.min(end);
    Some(Decimal::from((to - from).num_days() + 1))
}

/// The full day-count breakdown for one employee over one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCalculationResult {
    /// Days from start to end, inclusive.
    pub total_calendar_days: i64,
    /// Saturdays and Sundays.
    pub weekend_days: i64,
    /// Holidays counted against the period.
    pub holiday_days: i64,
    /// Calendar days minus weekends minus holidays.
    pub working_days: i64,
    /// Attendance rows with status Present.
    pub present_days: i64,
    /// Attendance rows with status Late.
    pub late_days: i64,
    /// Attendance rows with status HalfDay.
    pub half_days: i64,
    /// Attendance rows with status Absent.
    pub absent_days: i64,
    /// Approved paid leave inside the period.
    pub paid_leave_days: Decimal,
    /// Approved unpaid leave inside the period.
    pub unpaid_leave_days: Decimal,
    /// Days the employee is paid for, never more than `working_days`.
    pub paid_days: i64,
    /// Fraction of paid leave dropped when flooring into `paid_days`.
    pub paid_leave_truncated: Decimal,
}

/// Reconciles attendance and leave against a calendar summary.
///
/// `paid_days = present + late + half + floor(paid_leave) + holidays`,
/// clamped to `working_days`. Half-day attendance rows count as a whole day.
/// Attendance rows are expected to already be limited to the period.
///
/// # Arguments
///
/// * `calendar` - The period's calendar summary
/// * `attendance` - The employee's attendance rows inside the period
/// * `leaves` - Overlaps of the employee's approved leave with the period
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{CalendarSummary, LeaveOverlap, reconcile};
/// use payroll_engine::models::{Attendance, AttendanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let calendar = CalendarSummary {
///     total_calendar_days: 31,
///     weekend_days: 8,
///     holiday_days: 1,
///     working_days: 22,
/// };
/// let attendance: Vec<Attendance> = (2..=3)
///     .map(|d| {
///         let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
///         Attendance::with_status(1, date, AttendanceStatus::Present)
///     })
///     .collect();
/// let leaves = [LeaveOverlap { days: Decimal::new(15, 1), is_paid: true }];
///
/// let result = reconcile(&calendar, &attendance, &leaves);
/// // 2 present + floor(1.5) + 1 holiday
/// assert_eq!(result.paid_days, 4);
/// assert_eq!(result.paid_leave_truncated, Decimal::new(5, 1));
/// ```
pub fn reconcile(
    calendar: &CalendarSummary,
    attendance: &[Attendance],
    leaves: &[LeaveOverlap],
) -> AttendanceCalculationResult {
    let count = |status: AttendanceStatus| {
        attendance.iter().filter(|a| a.status == status).count() as i64
    };
    let present_days = count(AttendanceStatus::Present);
    let late_days = count(AttendanceStatus::Late);
    let half_days = count(AttendanceStatus::HalfDay);
    let absent_days = count(AttendanceStatus::Absent);

    let (paid_leave_days, unpaid_leave_days) = leaves.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(paid, unpaid), overlap| {
            if overlap.is_paid {
                (paid + overlap.days, unpaid)
            } else {
                (paid, unpaid + overlap.days)
            }
        },
    );

    let whole_paid_leave = paid_leave_days.floor();
    let paid_leave_truncated = paid_leave_days - whole_paid_leave;

    let uncapped = present_days
        + late_days
        + half_days
        + whole_paid_leave.to_i64().unwrap_or(i64::MAX)
        + calendar.holiday_days;
    let paid_days = uncapped.min(calendar.working_days);

    AttendanceCalculationResult {
        total_calendar_days: calendar.total_calendar_days,
        weekend_days: calendar.weekend_days,
        holiday_days: calendar.holiday_days,
        working_days: calendar.working_days,
        present_days,
        late_days,
        half_days,
        absent_days,
        paid_leave_days,
        unpaid_leave_days,
        paid_days,
        paid_leave_truncated,
    }
}

/// Fleet-wide attendance tally for a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendanceStats {
    /// Rows with status Present.
    pub present: i64,
    /// Rows with status Absent.
    pub absent: i64,
    /// Rows with status Late.
    pub late: i64,
    /// Rows with status HalfDay.
    pub half_day: i64,
    /// Rows with status Leave.
    pub on_leave: i64,
}

/// Tallies one day's attendance rows by status.
pub fn tally_daily_stats(attendance: &[Attendance]) -> DailyAttendanceStats {
    attendance
        .iter()
        .fold(DailyAttendanceStats::default(), |mut stats, record| {
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::HalfDay => stats.half_day += 1,
                AttendanceStatus::Leave => stats.on_leave += 1,
                _ => {}
            }
            stats
        })
}
