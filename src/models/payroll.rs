//! Payroll run and payroll detail models.
//!
//! A [`PayrollRun`] is one processing cycle for a month. Processing a run
//! materialises one [`PayrollDetail`] per active employee.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Status of a payroll run.
///
/// Runs move forward through `Draft → PendingApproval → Approved → Processed →
/// Paid`; `Cancelled` is a side branch. See
/// [`crate::calculation::transition`] for the allowed moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollRunStatus {
    /// Created, totals snapshotted, editable.
    #[default]
    Draft,
    /// Submitted for approval.
    PendingApproval,
    /// Approved and ready to process.
    Approved,
    /// Detail rows materialised.
    Processed,
    /// Salaries disbursed.
    Paid,
    /// Abandoned.
    Cancelled,
}

impl std::fmt::Display for PayrollRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayrollRunStatus::Draft => write!(f, "Draft"),
            PayrollRunStatus::PendingApproval => write!(f, "PendingApproval"),
            PayrollRunStatus::Approved => write!(f, "Approved"),
            PayrollRunStatus::Processed => write!(f, "Processed"),
            PayrollRunStatus::Paid => write!(f, "Paid"),
            PayrollRunStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Payment status of a single payroll detail, independent of the run status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet paid.
    #[default]
    Pending,
    /// Paid.
    Paid,
    /// Transfer failed.
    Failed,
    /// Held back.
    OnHold,
    /// Returned.
    Refunded,
}

/// Aggregated totals of a payroll run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Number of employees included.
    pub total_employees: u32,
    /// Sum of gross salaries.
    pub total_gross_salary: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of net salaries.
    pub total_net_salary: Decimal,
}

impl RunTotals {
    /// Adds one employee's figures to the totals.
    pub fn add(&mut self, gross: Decimal, deductions: Decimal, net: Decimal) {
        self.total_employees += 1;
        self.total_gross_salary += gross;
        self.total_deductions += deductions;
        self.total_net_salary += net;
    }
}

/// One payroll processing cycle for a month and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Display name.
    pub name: String,
    /// Generated code, `PR-YYYY-MM-NNN`.
    pub run_code: String,
    /// Current status.
    pub status: PayrollRunStatus,
    /// Aggregated totals.
    pub totals: RunTotals,
    /// Explicit period start; defaults to the first of the month.
    pub start_date: Option<NaiveDate>,
    /// Explicit period end; defaults to the last of the month.
    pub end_date: Option<NaiveDate>,
    /// Planned payment date.
    pub payment_date: Option<NaiveDate>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Who approved the run.
    pub approved_by: Option<i64>,
    /// When the run was approved.
    pub approved_date: Option<DateTime<Utc>>,
    /// Who processed the run.
    pub processed_by: Option<i64>,
    /// When the run was processed.
    pub processed_date: Option<DateTime<Utc>>,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
}

impl PayrollRun {
    /// Resolves the inclusive date range this run covers.
    ///
    /// Explicit start/end dates win; otherwise the calendar month is used.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::month_bounds;
    /// use chrono::NaiveDate;
    ///
    /// let (start, end) = month_bounds(2024, 2).unwrap();
    /// assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    /// assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// ```
    pub fn period(&self) -> PayrollResult<(NaiveDate, NaiveDate)> {
        let start = match self.start_date {
            Some(start) => start,
            None => month_bounds(self.year, self.month)?.0,
        };
        let end = match self.end_date {
            Some(end) => end,
            None => last_day_of_month_from(start)?,
        };
        Ok((start, end))
    }
}

/// Returns the first and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> PayrollResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        PayrollError::validation("month", format!("{}-{} is not a valid month", year, month))
    })?;
    Ok((start, last_day_of_month_from(start)?))
}

fn last_day_of_month_from(start: NaiveDate) -> PayrollResult<NaiveDate> {
    start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| PayrollError::validation("start_date", "date out of range"))
}

/// One employee's line in a processed payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollDetail {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The run this detail belongs to.
    pub payroll_run_id: i64,
    /// The employee paid.
    pub employee_id: i64,
    /// Basic salary snapshot.
    pub basic_salary: Decimal,
    /// Gross salary snapshot.
    pub gross_salary: Decimal,
    /// Total earnings (basic plus allowances).
    pub total_earnings: Decimal,
    /// Total deductions snapshot.
    pub total_deductions: Decimal,
    /// Net salary snapshot.
    pub net_salary: Decimal,
    /// Tax withheld.
    pub tax_amount: Decimal,
    /// Provident fund contribution.
    pub provident_fund: Decimal,
    /// Other deductions.
    pub other_deductions: Decimal,
    /// Overtime pay, if any.
    pub overtime_amount: Option<Decimal>,
    /// Working days in the run period.
    pub working_days: i64,
    /// Paid days in the run period.
    pub paid_days: i64,
    /// Bank account snapshot.
    pub bank_account_no: Option<String>,
    /// Bank name snapshot.
    pub bank_name: Option<String>,
    /// Payment status.
    pub payment_status: PaymentStatus,
}
