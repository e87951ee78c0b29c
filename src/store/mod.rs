//! Data-store traits for every entity the engine reads or writes.
//!
//! Lookups return `Ok(None)` or an empty `Vec` when nothing matches. Adds
//! assign a fresh id and return the stored entity; they fail with
//! `Conflict` when a uniqueness rule is violated. Updates fail with
//! `NotFound` when the id is unknown.
//!
//! [`InMemoryStore`] is the reference implementation.

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PayrollResult;
use crate::models::{
    Attendance, Employee, Holiday, Leave, LeaveBalance, LeaveType, PayrollDetail, PayrollRun,
    SalaryStructure, Shift, TaxConfig, TaxSlab,
};

pub use memory::InMemoryStore;

/// Employee records.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Looks up an employee by id.
    async fn get_employee(&self, id: i64) -> PayrollResult<Option<Employee>>;
    /// Lists every employee, in id order.
    async fn list_employees(&self) -> PayrollResult<Vec<Employee>>;
    /// Lists employees whose status is Active, in id order.
    async fn list_active_employees(&self) -> PayrollResult<Vec<Employee>>;
    /// Adds an employee. Employee codes are unique.
    async fn add_employee(&self, employee: Employee) -> PayrollResult<Employee>;
    /// Replaces an employee.
    async fn update_employee(&self, employee: Employee) -> PayrollResult<Employee>;
}

/// Attendance rows, unique per (employee, date).
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Looks up an attendance row by id.
    async fn get_attendance(&self, id: i64) -> PayrollResult<Option<Attendance>>;
    /// Looks up an employee's row for one date.
    async fn attendance_for_day(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> PayrollResult<Option<Attendance>>;
    /// Lists an employee's rows in `[start, end]`, in date order.
    async fn attendance_in_range(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Vec<Attendance>>;
    /// Lists every employee's row for one date.
    async fn attendance_on(&self, date: NaiveDate) -> PayrollResult<Vec<Attendance>>;
    /// Adds a row.
    async fn add_attendance(&self, attendance: Attendance) -> PayrollResult<Attendance>;
    /// Replaces a row.
    async fn update_attendance(&self, attendance: Attendance) -> PayrollResult<Attendance>;
}

/// Leave requests, leave types and leave balances.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Looks up a leave request by id.
    async fn get_leave(&self, id: i64) -> PayrollResult<Option<Leave>>;
    /// Lists an employee's leave requests, in start-date order.
    async fn leaves_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<Leave>>;
    /// Adds a leave request.
    async fn add_leave(&self, leave: Leave) -> PayrollResult<Leave>;
    /// Replaces a leave request.
    async fn update_leave(&self, leave: Leave) -> PayrollResult<Leave>;

    /// Looks up a leave type by id.
    async fn get_leave_type(&self, id: i64) -> PayrollResult<Option<LeaveType>>;
    /// Lists every leave type.
    async fn list_leave_types(&self) -> PayrollResult<Vec<LeaveType>>;
    /// Adds a leave type. Codes are unique.
    async fn add_leave_type(&self, leave_type: LeaveType) -> PayrollResult<LeaveType>;

    /// Looks up the balance for (employee, leave type, year).
    async fn leave_balance(
        &self,
        employee_id: i64,
        leave_type_id: i64,
        year: i32,
    ) -> PayrollResult<Option<LeaveBalance>>;
    /// Lists an employee's balances for a year.
    async fn leave_balances(&self, employee_id: i64, year: i32)
    -> PayrollResult<Vec<LeaveBalance>>;
    /// Adds a balance, unique per (employee, leave type, year).
    async fn add_leave_balance(&self, balance: LeaveBalance) -> PayrollResult<LeaveBalance>;
    /// Replaces a balance.
    async fn update_leave_balance(&self, balance: LeaveBalance) -> PayrollResult<LeaveBalance>;
}

/// Holidays, unique per date.
#[async_trait]
pub trait HolidayStore: Send + Sync {
    /// Lists holidays in `[start, end]`, in date order.
    async fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate)
    -> PayrollResult<Vec<Holiday>>;
    /// Lists every holiday.
    async fn list_holidays(&self) -> PayrollResult<Vec<Holiday>>;
    /// Adds a holiday.
    async fn add_holiday(&self, holiday: Holiday) -> PayrollResult<Holiday>;
}

/// Work shifts.
#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Looks up a shift by id.
    async fn get_shift(&self, id: i64) -> PayrollResult<Option<Shift>>;
    /// Adds a shift.
    async fn add_shift(&self, shift: Shift) -> PayrollResult<Shift>;
}

/// Salary structures, one per employee.
#[async_trait]
pub trait SalaryStructureStore: Send + Sync {
    /// Looks up the structure for an employee.
    async fn salary_structure_for(&self, employee_id: i64)
    -> PayrollResult<Option<SalaryStructure>>;
    /// Adds a structure.
    async fn add_salary_structure(
        &self,
        structure: SalaryStructure,
    ) -> PayrollResult<SalaryStructure>;
    /// Replaces a structure.
    async fn update_salary_structure(
        &self,
        structure: SalaryStructure,
    ) -> PayrollResult<SalaryStructure>;
}

/// Tax configurations (one per tax year) and their slabs.
#[async_trait]
pub trait TaxStore: Send + Sync {
    /// Looks up a configuration by id.
    async fn get_tax_config(&self, id: i64) -> PayrollResult<Option<TaxConfig>>;
    /// Looks up the configuration for a tax year.
    async fn tax_config_for_year(&self, tax_year: i32) -> PayrollResult<Option<TaxConfig>>;
    /// Lists every configuration, in tax-year order.
    async fn list_tax_configs(&self) -> PayrollResult<Vec<TaxConfig>>;
    /// Adds a configuration.
    async fn add_tax_config(&self, config: TaxConfig) -> PayrollResult<TaxConfig>;
    /// Replaces a configuration.
    async fn update_tax_config(&self, config: TaxConfig) -> PayrollResult<TaxConfig>;
    /// Lists a configuration's slabs, in `min_income` order.
    async fn tax_slabs_for(&self, tax_config_id: i64) -> PayrollResult<Vec<TaxSlab>>;
    /// Adds a slab.
    async fn add_tax_slab(&self, slab: TaxSlab) -> PayrollResult<TaxSlab>;
}

/// Payroll runs and their detail rows.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Looks up a run by id.
    async fn get_payroll_run(&self, id: i64) -> PayrollResult<Option<PayrollRun>>;
    /// Lists every run for a month, including cancelled ones, in id order.
    async fn payroll_runs_for_month(&self, month: u32, year: i32)
    -> PayrollResult<Vec<PayrollRun>>;
    /// Adds a run.
    async fn add_payroll_run(&self, run: PayrollRun) -> PayrollResult<PayrollRun>;
    /// Replaces a run.
    async fn update_payroll_run(&self, run: PayrollRun) -> PayrollResult<PayrollRun>;

    /// Looks up a detail by id.
    async fn get_payroll_detail(&self, id: i64) -> PayrollResult<Option<PayrollDetail>>;
    /// Looks up the detail for (run, employee).
    async fn payroll_detail(
        &self,
        payroll_run_id: i64,
        employee_id: i64,
    ) -> PayrollResult<Option<PayrollDetail>>;
    /// Lists a run's details, in id order.
    async fn payroll_details_for_run(
        &self,
        payroll_run_id: i64,
    ) -> PayrollResult<Vec<PayrollDetail>>;
    /// Adds a detail, unique per (run, employee).
    async fn add_payroll_detail(&self, detail: PayrollDetail) -> PayrollResult<PayrollDetail>;
    /// Replaces a detail.
    async fn update_payroll_detail(&self, detail: PayrollDetail) -> PayrollResult<PayrollDetail>;
}

/// Every store the engine needs, as one bound.
pub trait HrStore:
    EmployeeStore
    + AttendanceStore
    + LeaveStore
    + HolidayStore
    + ShiftStore
    + SalaryStructureStore
    + TaxStore
    + PayrollStore
{
}

impl<T> HrStore for T where
    T: EmployeeStore
        + AttendanceStore
        + LeaveStore
        + HolidayStore
        + ShiftStore
        + SalaryStructureStore
        + TaxStore
        + PayrollStore
{
}
