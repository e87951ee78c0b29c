//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::EngineSettings;
use crate::services::{AttendanceService, PayrollService, TaxService};
use crate::store::InMemoryStore;

/// Shared application state.
///
/// Holds the store and the services built over it. Cloning is cheap: every
/// service shares the same `Arc` of the store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<InMemoryStore>,
    payroll: PayrollService<InMemoryStore>,
    attendance: AttendanceService<InMemoryStore>,
    tax: TaxService<InMemoryStore>,
}

impl AppState {
    /// Creates the state over a store, using the given engine policies.
    pub fn new(store: Arc<InMemoryStore>, settings: EngineSettings) -> Self {
        Self {
            payroll: PayrollService::new(Arc::clone(&store), settings),
            attendance: AttendanceService::new(
                Arc::clone(&store),
                settings.weekend_holiday_overlap,
            ),
            tax: TaxService::new(Arc::clone(&store)),
            store,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    /// Returns the payroll run service.
    pub fn payroll(&self) -> &PayrollService<InMemoryStore> {
        &self.payroll
    }

    /// Returns the attendance service.
    pub fn attendance(&self) -> &AttendanceService<InMemoryStore> {
        &self.attendance
    }

    /// Returns the tax service.
    pub fn tax(&self) -> &TaxService<InMemoryStore> {
        &self.tax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
