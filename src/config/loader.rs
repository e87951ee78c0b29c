//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine's
//! policies, tax tables and holiday calendar from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{PayrollError, PayrollResult};
use crate::store::{HolidayStore, TaxStore};

use super::types::{EngineSettings, HolidayFile, PayrollConfig, TaxFile, TaxYearConfig};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/bd/
/// ├── settings.yaml   # Engine policies
/// ├── tax.yaml        # Tax years with their slabs
/// └── holidays.yaml   # Holiday calendar
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/bd").unwrap();
/// let tax_2024 = loader.tax_year(2024).unwrap();
/// println!("Tax-free limit: {}", tax_2024.basic_tax_free_limit);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` naming the first missing file, or
    /// `ConfigParseError` for invalid YAML or an inverted slab.
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("settings.yaml"))?;

        let tax_path = path.join("tax.yaml");
        let tax_file = Self::load_yaml::<TaxFile>(&tax_path)?;
        Self::validate_tax_years(&tax_path, &tax_file.tax_years)?;

        let holiday_file = Self::load_yaml::<HolidayFile>(&path.join("holidays.yaml"))?;

        let config = PayrollConfig::new(settings, tax_file.tax_years, holiday_file.holidays);
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_tax_years(path: &Path, tax_years: &[TaxYearConfig]) -> PayrollResult<()> {
        let parse_error = |message: String| PayrollError::ConfigParseError {
            path: path.display().to_string(),
            message,
        };

        for (index, entry) in tax_years.iter().enumerate() {
            if tax_years[..index]
                .iter()
                .any(|earlier| earlier.tax_year == entry.tax_year)
            {
                return Err(parse_error(format!(
                    "tax year {} is defined twice",
                    entry.tax_year
                )));
            }
            for slab in &entry.slabs {
                if let Some(max) = slab.max_income {
                    if max <= slab.min_income {
                        return Err(parse_error(format!(
                            "tax year {}: slab starting at {} has max_income {}",
                            entry.tax_year, slab.min_income, max
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> EngineSettings {
        *self.config.settings()
    }

    /// Gets a tax year's parameters.
    ///
    /// Returns `NotFound` if the year is not configured.
    pub fn tax_year(&self, year: i32) -> PayrollResult<&TaxYearConfig> {
        self.config
            .tax_years()
            .iter()
            .find(|t| t.tax_year == year)
            .ok_or_else(|| PayrollError::not_found("tax configuration", year))
    }

    /// Writes every configured tax year (with slabs) and holiday into a store.
    ///
    /// Slabs without an explicit `slab_order` are numbered by position.
    pub async fn seed<S>(&self, store: &S) -> PayrollResult<()>
    where
        S: TaxStore + HolidayStore,
    {
        for entry in self.config.tax_years() {
            let config = store.add_tax_config(entry.to_tax_config()).await?;
            for (position, slab) in entry.slabs.iter().enumerate() {
                let mut slab = slab.clone();
                slab.tax_config_id = config.id;
                if slab.slab_order == 0 {
                    slab.slab_order = position as i32 + 1;
                }
                store.add_tax_slab(slab).await?;
            }
        }

        for holiday in self.config.holidays() {
            store.add_holiday(holiday.clone()).await?;
        }

        info!(
            tax_years = self.config.tax_years().len(),
            holidays = self.config.holidays().len(),
            "Seeded store from configuration"
        );
        Ok(())
    }
}
