//! Tax configuration and slab models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income tax parameters for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Unique identifier, assigned by the store.
    #[serde(default)]
    pub id: i64,
    /// The tax year these parameters apply to.
    pub tax_year: i32,
    /// Annual income below which no tax is charged.
    pub basic_tax_free_limit: Decimal,
    /// Percentage rebate on computed tax for female employees.
    #[serde(default)]
    pub female_rebate_percentage: Decimal,
    /// Percentage rebate for senior citizens.
    #[serde(default)]
    pub senior_citizen_rebate_percentage: Decimal,
    /// First day the configuration is effective.
    pub effective_from: NaiveDate,
    /// Last day the configuration is effective.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Whether this configuration is in force.
    #[serde(default)]
    pub is_active: bool,
}

/// A marginal income band within a [`TaxConfig`].
///
/// # Example
///
/// ```
/// use payroll_engine::models::TaxSlab;
/// use rust_decimal::Decimal;
///
/// let top = TaxSlab {
///     id: 2,
///     tax_config_id: 1,
///     slab_order: 2,
///     min_income: Decimal::new(400_000, 0),
///     max_income: None,
///     tax_percentage: Decimal::new(10, 0),
///     fixed_amount: Decimal::ZERO,
/// };
/// assert_eq!(top.width(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    /// Unique identifier, assigned by the store.
    #[serde(default)]
    pub id: i64,
    /// The configuration this slab belongs to.
    #[serde(default)]
    pub tax_config_id: i64,
    /// Display order.
    #[serde(default)]
    pub slab_order: i32,
    /// Lower bound of the band.
    pub min_income: Decimal,
    /// Upper bound of the band; `None` means unbounded.
    #[serde(default)]
    pub max_income: Option<Decimal>,
    /// Marginal rate as a percentage.
    pub tax_percentage: Decimal,
    /// Fixed amount printed on the tax table; the marginal walk does not use it.
    #[serde(default)]
    pub fixed_amount: Decimal,
}

impl TaxSlab {
    /// Width of the band, or `None` for the unbounded top band.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }
}
