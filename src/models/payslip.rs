//! Flattened payslip view.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One employee's payslip for one month, assembled from the payroll run,
/// the payroll detail, the employee record, and the salary structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payslip {
    /// The employee.
    pub employee_id: i64,
    /// Full name.
    pub employee_name: String,
    /// Employee code.
    pub employee_code: String,
    /// Department id, if assigned.
    pub department_id: Option<i64>,
    /// Date of joining.
    pub join_date: Option<NaiveDate>,

    /// Bank name, or "N/A".
    pub bank_name: String,
    /// Bank account number, or "N/A".
    pub bank_account_no: String,
    /// Branch name, or "N/A".
    pub branch_name: String,

    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// English month name.
    pub month_name: String,
    /// Working days in the period.
    pub working_days: i64,
    /// Paid days in the period.
    pub days_present: i64,
    /// Working days minus paid days.
    pub days_absent: i64,

    /// Basic salary.
    pub basic_salary: Decimal,
    /// House rent allowance.
    pub house_rent_allowance: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Medical allowance.
    pub medical_allowance: Decimal,
    /// Overtime pay.
    pub overtime_amount: Decimal,
    /// Total earnings.
    pub total_earnings: Decimal,

    /// Provident fund contribution.
    pub provident_fund: Decimal,
    /// Tax withheld.
    pub tax_deduction: Decimal,
    /// Other deductions.
    pub other_deductions: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,

    /// Gross salary.
    pub gross_salary: Decimal,
    /// Net salary.
    pub net_salary: Decimal,
}
