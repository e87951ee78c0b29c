//! Progressive income tax by slabs.
//!
//! Annual taxable income is walked through the slab table in ascending
//! order of `min_income`, taxing each band at its own marginal percentage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};
use crate::models::{Gender, TaxConfig, TaxSlab};

/// Number of decimal places tax amounts are rounded to.
pub const TAX_DECIMAL_PLACES: u32 = 2;

/// Applies the marginal slab walk to a taxable income.
///
/// Slabs are sorted by `min_income`. Each slab taxes at most its width
/// (`max_income - min_income`, unbounded when `max_income` is `None`) of the
/// remaining income. The walk stops once no income remains; the result is
/// never negative. The slab's `fixed_amount` is not used.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_tax_by_slabs;
/// use payroll_engine::models::TaxSlab;
/// use rust_decimal::Decimal;
///
/// let slabs = vec![
///     TaxSlab {
///         id: 1,
///         tax_config_id: 1,
///         slab_order: 1,
///         min_income: Decimal::ZERO,
///         max_income: Some(Decimal::new(400_000, 0)),
///         tax_percentage: Decimal::new(5, 0),
///         fixed_amount: Decimal::ZERO,
///     },
///     TaxSlab {
///         id: 2,
///         tax_config_id: 1,
///         slab_order: 2,
///         min_income: Decimal::new(400_000, 0),
///         max_income: None,
///         tax_percentage: Decimal::new(10, 0),
///         fixed_amount: Decimal::ZERO,
///     },
/// ];
///
/// // 400000 at 5% + 100000 at 10%
/// assert_eq!(
///     calculate_tax_by_slabs(Decimal::new(500_000, 0), &slabs),
///     Decimal::new(30_000, 0)
/// );
/// ```
pub fn calculate_tax_by_slabs(income: Decimal, slabs: &[TaxSlab]) -> Decimal {
    let mut sorted: Vec<&TaxSlab> = slabs.iter().collect();
    sorted.sort_by(|a, b| a.min_income.cmp(&b.min_income));

    let hundred = Decimal::ONE_HUNDRED;
    let mut remaining = income;
    let mut tax = Decimal::ZERO;

    for slab in sorted {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable_in_slab = match slab.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        tax += taxable_in_slab * slab.tax_percentage / hundred;
        remaining -= taxable_in_slab;
    }

    tax.max(Decimal::ZERO)
}

/// The inputs and intermediate figures of one annual tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Gross annual income before the tax-free allowance.
    pub annual_income: Decimal,
    /// Income after the tax-free allowance, never negative.
    pub taxable_income: Decimal,
    /// Tax from the slab walk before rebates.
    pub slab_tax: Decimal,
    /// Amount removed by rebates.
    pub rebate: Decimal,
    /// Annual tax, rounded to two decimal places.
    pub annual_tax: Decimal,
    /// Annual tax divided by twelve, rounded to two decimal places.
    pub monthly_tax: Decimal,
}

impl TaxBreakdown {
    /// The breakdown for a tax-exempt employee: everything after the income is zero.
    pub fn exempt(annual_income: Decimal) -> Self {
        Self {
            annual_income,
            taxable_income: Decimal::ZERO,
            slab_tax: Decimal::ZERO,
            rebate: Decimal::ZERO,
            annual_tax: Decimal::ZERO,
            monthly_tax: Decimal::ZERO,
        }
    }
}

/// Calculates annual and monthly tax for one employee.
///
/// Taxable income is `max(0, annual_income - basic_tax_free_limit)`. Female
/// employees receive the configured percentage rebate on the slab tax.
/// Amounts are rounded with banker's rounding.
///
/// # Arguments
///
/// * `annual_income` - Gross annual income
/// * `gender` - Determines whether the female rebate applies
/// * `is_tax_exempted` - Exempt employees pay no tax
/// * `config` - The tax year's configuration
/// * `slabs` - The configuration's slab table
///
/// # Errors
///
/// Returns `Unprocessable` when a non-exempt employee meets an empty slab table.
pub fn calculate_annual_tax(
    annual_income: Decimal,
    gender: Gender,
    is_tax_exempted: bool,
    config: &TaxConfig,
    slabs: &[TaxSlab],
) -> PayrollResult<TaxBreakdown> {
    if is_tax_exempted {
        return Ok(TaxBreakdown::exempt(annual_income));
    }
    if slabs.is_empty() {
        return Err(PayrollError::Unprocessable {
            message: format!("Tax slabs not configured for tax year {}", config.tax_year),
        });
    }

    let taxable_income = (annual_income - config.basic_tax_free_limit).max(Decimal::ZERO);
    let slab_tax = calculate_tax_by_slabs(taxable_income, slabs);

    let after_rebate = match gender {
        Gender::Female => {
            slab_tax * (Decimal::ONE - config.female_rebate_percentage / Decimal::ONE_HUNDRED)
        }
        _ => slab_tax,
    };

    let annual_tax = after_rebate.round_dp(TAX_DECIMAL_PLACES);
    Ok(TaxBreakdown {
        annual_income,
        taxable_income,
        slab_tax,
        rebate: slab_tax - after_rebate,
        annual_tax,
        monthly_tax: monthly_from_annual(annual_tax),
    })
}

/// Spreads an annual tax amount over twelve months.
pub fn monthly_from_annual(annual_tax: Decimal) -> Decimal {
    (annual_tax / Decimal::from(12)).round_dp(TAX_DECIMAL_PLACES)
}
