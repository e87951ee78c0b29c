//! Salary structure resolution.
//!
//! Derives gross, deductions and net pay from the fixed components of a
//! [`SalaryStructure`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::SalaryStructure;

/// The derived figures of a salary structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryFigures {
    /// Basic plus every allowance.
    pub gross_salary: Decimal,
    /// Provident fund contribution: basic times the PF percentage.
    pub provident_fund: Decimal,
    /// Provident fund plus tax deduction plus other deductions.
    pub total_deductions: Decimal,
    /// Gross minus total deductions.
    pub net_salary: Decimal,
    /// Basic, HRA, medical, transport and other allowances. Conveyance is
    /// part of gross but not of this figure.
    pub total_earnings: Decimal,
}

/// Computes the derived figures of a structure without modifying it.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::compute_salary;
/// use payroll_engine::models::SalaryStructure;
/// use rust_decimal::Decimal;
///
/// let structure = SalaryStructure {
///     employee_id: 1,
///     basic_salary: Decimal::new(30_000, 0),
///     house_rent_allowance: Decimal::new(15_000, 0),
///     medical_allowance: Decimal::new(3_000, 0),
///     provident_fund_percentage: Decimal::new(10, 0),
///     tax_deduction: Decimal::new(1_000, 0),
///     ..SalaryStructure::default()
/// };
///
/// let figures = compute_salary(&structure);
/// assert_eq!(figures.gross_salary, Decimal::new(48_000, 0));
/// assert_eq!(figures.provident_fund, Decimal::new(3_000, 0));
/// assert_eq!(figures.total_deductions, Decimal::new(4_000, 0));
/// assert_eq!(figures.net_salary, Decimal::new(44_000, 0));
/// ```
pub fn compute_salary(structure: &SalaryStructure) -> SalaryFigures {
    let gross_salary = structure.basic_salary
        + structure.house_rent_allowance
        + structure.transport_allowance
        + structure.medical_allowance
        + structure.conveyance_allowance
        + structure.other_allowances;

    let provident_fund =
        structure.basic_salary * structure.provident_fund_percentage / Decimal::ONE_HUNDRED;
    let total_deductions = provident_fund + structure.tax_deduction + structure.other_deductions;

    let total_earnings = structure.basic_salary
        + structure.house_rent_allowance
        + structure.medical_allowance
        + structure.transport_allowance
        + structure.other_allowances;

    SalaryFigures {
        gross_salary,
        provident_fund,
        total_deductions,
        net_salary: gross_salary - total_deductions,
        total_earnings,
    }
}

/// Writes the derived figures back onto the structure.
///
/// Called on every create and update so the stored gross, deductions and
/// net always match the components.
pub fn resolve_salary(structure: &mut SalaryStructure) -> SalaryFigures {
    let figures = compute_salary(structure);
    structure.gross_salary = figures.gross_salary;
    structure.total_deductions = figures.total_deductions;
    structure.net_salary = figures.net_salary;
    figures
}
