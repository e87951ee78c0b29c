//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::WeekendHolidayOverlap;
use crate::models::{Holiday, TaxConfig, TaxSlab};

/// What payroll processing does with an active employee who has no salary
/// structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStructurePolicy {
    /// Write a detail row with every amount set to zero.
    #[default]
    ZeroFill,
    /// Write no detail row for the employee.
    Skip,
    /// Refuse to process, with an `Unprocessable` error, before any row is
    /// written.
    Fail,
}

/// Engine-wide policies from `settings.yaml`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct EngineSettings {
    /// How holidays falling on weekends are counted.
    #[serde(default)]
    pub weekend_holiday_overlap: WeekendHolidayOverlap,
    /// What to do with employees lacking a salary structure.
    #[serde(default)]
    pub missing_salary_structure: MissingStructurePolicy,
}

/// One tax year's parameters and slab table, as written in `tax.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxYearConfig {
    /// The tax year.
    pub tax_year: i32,
    /// Annual income below which no tax is charged.
    pub basic_tax_free_limit: Decimal,
    /// Female rebate, as a percentage of computed tax.
    #[serde(default)]
    pub female_rebate_percentage: Decimal,
    /// Senior citizen rebate, as a percentage of computed tax.
    #[serde(default)]
    pub senior_citizen_rebate_percentage: Decimal,
    /// First day the parameters apply.
    pub effective_from: NaiveDate,
    /// Last day the parameters apply.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Marginal slabs.
    pub slabs: Vec<TaxSlab>,
}

impl TaxYearConfig {
    /// Converts the file entry into a store-ready [`TaxConfig`] (id 0).
    pub fn to_tax_config(&self) -> TaxConfig {
        TaxConfig {
            id: 0,
            tax_year: self.tax_year,
            basic_tax_free_limit: self.basic_tax_free_limit,
            female_rebate_percentage: self.female_rebate_percentage,
            senior_citizen_rebate_percentage: self.senior_citizen_rebate_percentage,
            effective_from: self.effective_from,
            effective_to: self.effective_to,
            is_active: true,
        }
    }
}

/// Structure of `tax.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxFile {
    /// Tax years, in any order.
    pub tax_years: Vec<TaxYearConfig>,
}

/// Structure of `holidays.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayFile {
    /// Holidays, in any order.
    pub holidays: Vec<Holiday>,
}

/// The complete engine configuration loaded from a directory.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: EngineSettings,
    /// Sorted by tax year.
    tax_years: Vec<TaxYearConfig>,
    /// Sorted by date.
    holidays: Vec<Holiday>,
}

impl PayrollConfig {
    /// Creates a new configuration from its component parts.
    pub fn new(
        settings: EngineSettings,
        tax_years: Vec<TaxYearConfig>,
        holidays: Vec<Holiday>,
    ) -> Self {
        let mut tax_years = tax_years;
        tax_years.sort_by_key(|t| t.tax_year);
        let mut holidays = holidays;
        holidays.sort_by_key(|h| h.date);
        Self {
            settings,
            tax_years,
            holidays,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all tax years.
    pub fn tax_years(&self) -> &[TaxYearConfig] {
        &self.tax_years
    }

    /// Returns all holidays.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}
