//! Core data models for the payroll engine.
//!
//! Entities reference each other by `i64` id; none embeds another.

mod attendance;
mod employee;
mod holiday;
mod leave;
mod payroll;
mod payslip;
mod salary;
mod shift;
mod tax;

pub use attendance::{Attendance, AttendanceStatus, EntryType};
pub use employee::{Employee, EmployeeStatus, Gender};
pub use holiday::{Holiday, HolidayType};
pub use leave::{HalfDayPortion, Leave, LeaveBalance, LeaveStatus, LeaveType};
pub use payroll::{
    PaymentStatus, PayrollDetail, PayrollRun, PayrollRunStatus, RunTotals, month_bounds,
};
pub use payslip::Payslip;
pub use salary::SalaryStructure;
pub use shift::Shift;
pub use tax::{TaxConfig, TaxSlab};
