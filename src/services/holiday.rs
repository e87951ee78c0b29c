//! Holiday registration.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::error::PayrollResult;
use crate::models::Holiday;
use crate::store::HrStore;

/// Maintains the holiday calendar.
pub struct HolidayService<S> {
    store: Arc<S>,
}

impl<S> Clone for HolidayService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: HrStore> HolidayService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a holiday. A second holiday on the same date is a `Conflict`.
    pub async fn add(&self, holiday: Holiday) -> PayrollResult<Holiday> {
        let holiday = self.store.add_holiday(holiday).await?;
        info!(date = %holiday.date, name = %holiday.name, "Holiday added");
        Ok(holiday)
    }

    /// Holidays in `[start, end]`, in date order.
    pub async fn list(&self, start: NaiveDate, end: NaiveDate) -> PayrollResult<Vec<Holiday>> {
        self.store.holidays_in_range(start, end).await
    }
}
