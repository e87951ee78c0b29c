//! Configuration loading and management for the payroll engine.
//!
//! This module loads engine policies, tax tables and the holiday calendar
//! from a directory of YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/bd").unwrap();
//! println!("Overlap policy: {:?}", config.settings().weekend_holiday_overlap);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineSettings, HolidayFile, MissingStructurePolicy, PayrollConfig, TaxFile, TaxYearConfig,
};
