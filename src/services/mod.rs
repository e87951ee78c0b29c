//! Async services that load data from an [`HrStore`](crate::store::HrStore),
//! run the pure calculations, and write results back.
//!
//! Every service holds an `Arc` of the store and is cheap to clone. Wall-clock
//! inputs ("today", "now") and the acting user are always parameters.

mod attendance;
mod holiday;
mod leave;
mod payroll;
mod salary;
mod tax;

pub use attendance::{AttendanceCorrection, AttendanceService};
pub use holiday::HolidayService;
pub use leave::{LeaveApplication, LeaveService};
pub use payroll::{NewPayrollRun, PayrollService, RunConsistency};
pub use salary::SalaryStructureService;
pub use tax::TaxService;
