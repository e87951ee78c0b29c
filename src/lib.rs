//! Payroll engine for attendance-based monthly payroll.
//!
//! This crate classifies calendar days, reconciles attendance and approved
//! leave into paid days, resolves salary structures, computes progressive
//! slab income tax, and drives payroll runs from draft to paid. Data access
//! goes through the async traits in [`store`]; [`services`] composes the pure
//! logic in [`calculation`] with a store, and [`api`] serves it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
