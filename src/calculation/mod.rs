//! Pure calculation logic for the payroll engine.
//!
//! This module contains the day classifier, attendance reconciliation,
//! progressive tax slabs, salary structure resolution and the payroll run
//! state machine. Nothing here touches a store.

mod calendar;
mod reconciliation;
mod run_status;
mod salary;
mod tax_slab;

pub use calendar::{
    CalendarSummary, DayKind, WeekendHolidayOverlap, classify_day, classify_range, is_weekend,
};
pub use reconciliation::{
    AttendanceCalculationResult, DailyAttendanceStats, LeaveOverlap, leave_overlap_days,
    reconcile, tally_daily_stats,
};
pub use run_status::{RunAction, transition};
pub use salary::{SalaryFigures, compute_salary, resolve_salary};
pub use tax_slab::{
    TAX_DECIMAL_PLACES, TaxBreakdown, calculate_annual_tax, calculate_tax_by_slabs,
    monthly_from_annual,
};
