//! Salary structure model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee's fixed monthly compensation configuration.
///
/// `gross_salary`, `total_deductions` and `net_salary` are stored, but are
/// always written by [`crate::calculation::resolve_salary`] on create and
/// update; callers never edit them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// Unique identifier, assigned by the store.
    #[serde(default)]
    pub id: i64,
    /// The employee this structure belongs to (one structure per employee).
    pub employee_id: i64,
    /// Display name (e.g., "Grade 5").
    #[serde(default)]
    pub name: String,
    /// Basic salary.
    pub basic_salary: Decimal,
    /// House rent allowance.
    #[serde(default)]
    pub house_rent_allowance: Decimal,
    /// Transport allowance.
    #[serde(default)]
    pub transport_allowance: Decimal,
    /// Medical allowance.
    #[serde(default)]
    pub medical_allowance: Decimal,
    /// Conveyance allowance.
    #[serde(default)]
    pub conveyance_allowance: Decimal,
    /// Other allowances.
    #[serde(default)]
    pub other_allowances: Decimal,
    /// Provident fund contribution as a percentage of basic.
    #[serde(default)]
    pub provident_fund_percentage: Decimal,
    /// Fixed monthly tax deduction.
    #[serde(default)]
    pub tax_deduction: Decimal,
    /// Other fixed deductions.
    #[serde(default)]
    pub other_deductions: Decimal,
    /// Computed gross salary.
    #[serde(default)]
    pub gross_salary: Decimal,
    /// Computed total deductions.
    #[serde(default)]
    pub total_deductions: Decimal,
    /// Computed net salary.
    #[serde(default)]
    pub net_salary: Decimal,
    /// First day the structure applies.
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    /// Last day the structure applies.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Inactive structures are kept for history.
    #[serde(default)]
    pub is_active: bool,
}

impl SalaryStructure {
    /// An all-zero structure for an employee, used when a payroll run meets an
    /// employee without a configured structure.
    pub fn empty_for(employee_id: i64) -> Self {
        Self {
            employee_id,
            ..Self::default()
        }
    }
}
