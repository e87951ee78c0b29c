//! Leave requests, leave types, and leave balances.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a leave request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved; counts towards the balance and the reconciler.
    Approved,
    /// Rejected by the approver.
    Rejected,
    /// Cancelled by the employee.
    Cancelled,
    /// Withdrawn before a decision.
    Withdrawn,
}

/// Which half of the day a half-day leave covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfDayPortion {
    /// First half.
    Morning,
    /// Second half.
    Afternoon,
}

/// A category of leave (annual, sick, unpaid, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Unique identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Short unique code (e.g., "AL").
    pub code: String,
    /// Whether days taken under this type are paid.
    pub is_paid_leave: bool,
    /// Whether unused days may be carried into the next year.
    #[serde(default)]
    pub is_carry_forward_allowed: bool,
    /// Cap on carried-forward days.
    #[serde(default)]
    pub max_carry_forward_days: Option<i32>,
    /// Inactive types are kept for history.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A leave request over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The requesting employee.
    pub employee_id: i64,
    /// The leave type requested.
    pub leave_type_id: i64,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// 0.5 for half-day leave, otherwise the inclusive day count.
    pub total_days: Decimal,
    /// Reason given by the employee.
    #[serde(default)]
    pub reason: Option<String>,
    /// Current status.
    #[serde(default)]
    pub status: LeaveStatus,
    /// When the request was made.
    pub applied_on: DateTime<Utc>,
    /// Who approved or rejected the request.
    #[serde(default)]
    pub approved_by: Option<i64>,
    /// When the decision was made.
    #[serde(default)]
    pub approval_date: Option<DateTime<Utc>>,
    /// Approver remarks.
    #[serde(default)]
    pub approval_remarks: Option<String>,
    /// Whether this is a half-day leave.
    #[serde(default)]
    pub is_half_day: bool,
    /// Which half, for half-day leave.
    #[serde(default)]
    pub half_day_portion: Option<HalfDayPortion>,
    /// Who cancelled the request.
    #[serde(default)]
    pub cancelled_by: Option<i64>,
    /// When it was cancelled.
    #[serde(default)]
    pub cancelled_date: Option<DateTime<Utc>>,
    /// Why it was cancelled.
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

impl Leave {
    /// Day count charged for a leave request.
    ///
    /// Half-day requests always count 0.5 regardless of their date span.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::Leave;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// assert_eq!(Leave::requested_days(start, end, false), Decimal::new(3, 0));
    /// assert_eq!(Leave::requested_days(start, end, true), Decimal::new(5, 1));
    /// ```
    pub fn requested_days(start: NaiveDate, end: NaiveDate, is_half_day: bool) -> Decimal {
        if is_half_day {
            Decimal::new(5, 1)
        } else {
            Decimal::from((end - start).num_days() + 1)
        }
    }

    /// Returns true if the leave interval intersects `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// The leave year a request is charged against.
    pub fn balance_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Per-year leave entitlement for one employee and one leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The employee.
    pub employee_id: i64,
    /// The leave type.
    pub leave_type_id: i64,
    /// Calendar year.
    pub year: i32,
    /// Entitled days for the year.
    pub total_days: Decimal,
    /// Days consumed by approved leave.
    #[serde(default)]
    pub used_days: Decimal,
    /// Days held by pending requests.
    #[serde(default)]
    pub pending_days: Decimal,
    /// Days carried from the previous year.
    #[serde(default)]
    pub carry_forward_days: Decimal,
}

impl LeaveBalance {
    /// Remaining days. This may go negative; it is not enforced at write time.
    pub fn available_days(&self) -> Decimal {
        self.total_days - self.used_days - self.pending_days + self.carry_forward_days
    }
}
