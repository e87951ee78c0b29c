//! In-memory reference store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    Attendance, Employee, Holiday, Leave, LeaveBalance, LeaveType, PayrollDetail, PayrollRun,
    PayrollRunStatus, SalaryStructure, Shift, TaxConfig, TaxSlab,
};

use super::{
    AttendanceStore, EmployeeStore, HolidayStore, LeaveStore, PayrollStore, SalaryStructureStore,
    ShiftStore, TaxStore,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    employees: BTreeMap<i64, Employee>,
    attendance: BTreeMap<i64, Attendance>,
    leaves: BTreeMap<i64, Leave>,
    leave_types: BTreeMap<i64, LeaveType>,
    leave_balances: BTreeMap<i64, LeaveBalance>,
    holidays: BTreeMap<i64, Holiday>,
    shifts: BTreeMap<i64, Shift>,
    salary_structures: BTreeMap<i64, SalaryStructure>,
    tax_configs: BTreeMap<i64, TaxConfig>,
    tax_slabs: BTreeMap<i64, TaxSlab>,
    payroll_runs: BTreeMap<i64, PayrollRun>,
    payroll_details: BTreeMap<i64, PayrollDetail>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn replace<T: Clone>(
    table: &mut BTreeMap<i64, T>,
    id: i64,
    value: T,
    entity: &'static str,
) -> PayrollResult<T> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(value)
        }
        None => Err(PayrollError::not_found(entity, id)),
    }
}

/// A thread-safe, process-local store holding every entity in ordered maps.
///
/// Ids are allocated from one counter shared by all tables, starting at 1.
/// Uniqueness rules are enforced on add and reported as `Conflict`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Employee;
/// use payroll_engine::store::{EmployeeStore, InMemoryStore};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = InMemoryStore::new();
/// let added = store
///     .add_employee(Employee::new(0, "E001", "Rahim", "Uddin"))
///     .await
///     .unwrap();
/// assert_eq!(added.id, 1);
/// assert!(store.get_employee(1).await.unwrap().is_some());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for InMemoryStore {
    async fn get_employee(&self, id: i64) -> PayrollResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn list_employees(&self) -> PayrollResult<Vec<Employee>> {
        Ok(self.tables.read().await.employees.values().cloned().collect())
    }

    async fn list_active_employees(&self) -> PayrollResult<Vec<Employee>> {
        Ok(self
            .tables
            .read()
            .await
            .employees
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect())
    }

    async fn add_employee(&self, mut employee: Employee) -> PayrollResult<Employee> {
        let mut tables = self.tables.write().await;
        if tables
            .employees
            .values()
            .any(|e| e.employee_code == employee.employee_code)
        {
            return Err(PayrollError::conflict(format!(
                "employee code {} already exists",
                employee.employee_code
            )));
        }
        employee.id = tables.allocate_id();
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, employee: Employee) -> PayrollResult<Employee> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.employees, employee.id, employee, "employee")
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn get_attendance(&self, id: i64) -> PayrollResult<Option<Attendance>> {
        Ok(self.tables.read().await.attendance.get(&id).cloned())
    }

    async fn attendance_for_day(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> PayrollResult<Option<Attendance>> {
        Ok(self
            .tables
            .read()
            .await
            .attendance
            .values()
            .find(|a| a.employee_id == employee_id && a.date == date)
            .cloned())
    }

    async fn attendance_in_range(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Vec<Attendance>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Attendance> = tables
            .attendance
            .values()
            .filter(|a| a.employee_id == employee_id && a.date >= start && a.date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.date);
        Ok(rows)
    }

    async fn attendance_on(&self, date: NaiveDate) -> PayrollResult<Vec<Attendance>> {
        Ok(self
            .tables
            .read()
            .await
            .attendance
            .values()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }

    async fn add_attendance(&self, mut attendance: Attendance) -> PayrollResult<Attendance> {
        let mut tables = self.tables.write().await;
        if tables
            .attendance
            .values()
            .any(|a| a.employee_id == attendance.employee_id && a.date == attendance.date)
        {
            return Err(PayrollError::conflict(format!(
                "attendance for employee {} on {} already exists",
                attendance.employee_id, attendance.date
            )));
        }
        attendance.id = tables.allocate_id();
        tables.attendance.insert(attendance.id, attendance.clone());
        Ok(attendance)
    }

    async fn update_attendance(&self, attendance: Attendance) -> PayrollResult<Attendance> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.attendance, attendance.id, attendance, "attendance")
    }
}

#[async_trait]
impl LeaveStore for InMemoryStore {
    async fn get_leave(&self, id: i64) -> PayrollResult<Option<Leave>> {
        Ok(self.tables.read().await.leaves.get(&id).cloned())
    }

    async fn leaves_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<Leave>> {
        let tables = self.tables.read().await;
        let mut leaves: Vec<Leave> = tables
            .leaves
            .values()
            .filter(|l| l.employee_id == employee_id)
            .cloned()
            .collect();
        leaves.sort_by_key(|l| l.start_date);
        Ok(leaves)
    }

    async fn add_leave(&self, mut leave: Leave) -> PayrollResult<Leave> {
        let mut tables = self.tables.write().await;
        leave.id = tables.allocate_id();
        tables.leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn update_leave(&self, leave: Leave) -> PayrollResult<Leave> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.leaves, leave.id, leave, "leave")
    }

    async fn get_leave_type(&self, id: i64) -> PayrollResult<Option<LeaveType>> {
        Ok(self.tables.read().await.leave_types.get(&id).cloned())
    }

    async fn list_leave_types(&self) -> PayrollResult<Vec<LeaveType>> {
        Ok(self.tables.read().await.leave_types.values().cloned().collect())
    }

    async fn add_leave_type(&self, mut leave_type: LeaveType) -> PayrollResult<LeaveType> {
        let mut tables = self.tables.write().await;
        if tables.leave_types.values().any(|t| t.code == leave_type.code) {
            return Err(PayrollError::conflict(format!(
                "leave type code {} already exists",
                leave_type.code
            )));
        }
        leave_type.id = tables.allocate_id();
        tables.leave_types.insert(leave_type.id, leave_type.clone());
        Ok(leave_type)
    }

    async fn leave_balance(
        &self,
        employee_id: i64,
        leave_type_id: i64,
        year: i32,
    ) -> PayrollResult<Option<LeaveBalance>> {
        Ok(self
            .tables
            .read()
            .await
            .leave_balances
            .values()
            .find(|b| {
                b.employee_id == employee_id && b.leave_type_id == leave_type_id && b.year == year
            })
            .cloned())
    }

    async fn leave_balances(
        &self,
        employee_id: i64,
        year: i32,
    ) -> PayrollResult<Vec<LeaveBalance>> {
        Ok(self
            .tables
            .read()
            .await
            .leave_balances
            .values()
            .filter(|b| b.employee_id == employee_id && b.year == year)
            .cloned()
            .collect())
    }

    async fn add_leave_balance(&self, mut balance: LeaveBalance) -> PayrollResult<LeaveBalance> {
        let mut tables = self.tables.write().await;
        if tables.leave_balances.values().any(|b| {
            b.employee_id == balance.employee_id
                && b.leave_type_id == balance.leave_type_id
                && b.year == balance.year
        }) {
            return Err(PayrollError::conflict(format!(
                "leave balance for employee {} type {} year {} already exists",
                balance.employee_id, balance.leave_type_id, balance.year
            )));
        }
        balance.id = tables.allocate_id();
        tables.leave_balances.insert(balance.id, balance.clone());
        Ok(balance)
    }

    async fn update_leave_balance(&self, balance: LeaveBalance) -> PayrollResult<LeaveBalance> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.leave_balances, balance.id, balance, "leave balance")
    }
}

#[async_trait]
impl HolidayStore for InMemoryStore {
    async fn holidays_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Vec<Holiday>> {
        let tables = self.tables.read().await;
        let mut holidays: Vec<Holiday> = tables
            .holidays
            .values()
            .filter(|h| h.falls_within(start, end))
            .cloned()
            .collect();
        holidays.sort_by_key(|h| h.date);
        Ok(holidays)
    }

    async fn list_holidays(&self) -> PayrollResult<Vec<Holiday>> {
        let tables = self.tables.read().await;
        let mut holidays: Vec<Holiday> = tables.holidays.values().cloned().collect();
        holidays.sort_by_key(|h| h.date);
        Ok(holidays)
    }

    async fn add_holiday(&self, mut holiday: Holiday) -> PayrollResult<Holiday> {
        let mut tables = self.tables.write().await;
        if tables.holidays.values().any(|h| h.date == holiday.date) {
            return Err(PayrollError::conflict(format!(
                "a holiday on {} already exists",
                holiday.date
            )));
        }
        holiday.id = tables.allocate_id();
        tables.holidays.insert(holiday.id, holiday.clone());
        Ok(holiday)
    }
}

#[async_trait]
impl ShiftStore for InMemoryStore {
    async fn get_shift(&self, id: i64) -> PayrollResult<Option<Shift>> {
        Ok(self.tables.read().await.shifts.get(&id).cloned())
    }

    async fn add_shift(&self, mut shift: Shift) -> PayrollResult<Shift> {
        let mut tables = self.tables.write().await;
        shift.id = tables.allocate_id();
        tables.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }
}

#[async_trait]
impl SalaryStructureStore for InMemoryStore {
    async fn salary_structure_for(
        &self,
        employee_id: i64,
    ) -> PayrollResult<Option<SalaryStructure>> {
        Ok(self
            .tables
            .read()
            .await
            .salary_structures
            .values()
            .find(|s| s.employee_id == employee_id)
            .cloned())
    }

    async fn add_salary_structure(
        &self,
        mut structure: SalaryStructure,
    ) -> PayrollResult<SalaryStructure> {
        let mut tables = self.tables.write().await;
        if tables
            .salary_structures
            .values()
            .any(|s| s.employee_id == structure.employee_id)
        {
            return Err(PayrollError::conflict(format!(
                "employee {} already has a salary structure",
                structure.employee_id
            )));
        }
        structure.id = tables.allocate_id();
        tables.salary_structures.insert(structure.id, structure.clone());
        Ok(structure)
    }

    async fn update_salary_structure(
        &self,
        structure: SalaryStructure,
    ) -> PayrollResult<SalaryStructure> {
        let mut tables = self.tables.write().await;
        replace(
            &mut tables.salary_structures,
            structure.id,
            structure,
            "salary structure",
        )
    }
}

#[async_trait]
impl TaxStore for InMemoryStore {
    async fn get_tax_config(&self, id: i64) -> PayrollResult<Option<TaxConfig>> {
        Ok(self.tables.read().await.tax_configs.get(&id).cloned())
    }

    async fn tax_config_for_year(&self, tax_year: i32) -> PayrollResult<Option<TaxConfig>> {
        Ok(self
            .tables
            .read()
            .await
            .tax_configs
            .values()
            .find(|c| c.tax_year == tax_year)
            .cloned())
    }

    async fn list_tax_configs(&self) -> PayrollResult<Vec<TaxConfig>> {
        let tables = self.tables.read().await;
        let mut configs: Vec<TaxConfig> = tables.tax_configs.values().cloned().collect();
        configs.sort_by_key(|c| c.tax_year);
        Ok(configs)
    }

    async fn add_tax_config(&self, mut config: TaxConfig) -> PayrollResult<TaxConfig> {
        let mut tables = self.tables.write().await;
        if tables
            .tax_configs
            .values()
            .any(|c| c.tax_year == config.tax_year)
        {
            return Err(PayrollError::conflict(format!(
                "tax configuration for {} already exists",
                config.tax_year
            )));
        }
        config.id = tables.allocate_id();
        tables.tax_configs.insert(config.id, config.clone());
        Ok(config)
    }

    async fn update_tax_config(&self, config: TaxConfig) -> PayrollResult<TaxConfig> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.tax_configs, config.id, config, "tax configuration")
    }

    async fn tax_slabs_for(&self, tax_config_id: i64) -> PayrollResult<Vec<TaxSlab>> {
        let tables = self.tables.read().await;
        let mut slabs: Vec<TaxSlab> = tables
            .tax_slabs
            .values()
            .filter(|s| s.tax_config_id == tax_config_id)
            .cloned()
            .collect();
        slabs.sort_by(|a, b| a.min_income.cmp(&b.min_income));
        Ok(slabs)
    }

    async fn add_tax_slab(&self, mut slab: TaxSlab) -> PayrollResult<TaxSlab> {
        let mut tables = self.tables.write().await;
        if !tables.tax_configs.contains_key(&slab.tax_config_id) {
            return Err(PayrollError::not_found(
                "tax configuration",
                slab.tax_config_id,
            ));
        }
        slab.id = tables.allocate_id();
        tables.tax_slabs.insert(slab.id, slab.clone());
        Ok(slab)
    }
}

#[async_trait]
impl PayrollStore for InMemoryStore {
    async fn get_payroll_run(&self, id: i64) -> PayrollResult<Option<PayrollRun>> {
        Ok(self.tables.read().await.payroll_runs.get(&id).cloned())
    }

    async fn payroll_runs_for_month(
        &self,
        month: u32,
        year: i32,
    ) -> PayrollResult<Vec<PayrollRun>> {
        Ok(self
            .tables
            .read()
            .await
            .payroll_runs
            .values()
            .filter(|r| r.month == month && r.year == year)
            .cloned()
            .collect())
    }

    async fn add_payroll_run(&self, mut run: PayrollRun) -> PayrollResult<PayrollRun> {
        let mut tables = self.tables.write().await;
        let live = tables.payroll_runs.values().find(|r| {
            r.month == run.month && r.year == run.year && r.status != PayrollRunStatus::Cancelled
        });
        if let Some(live) = live.filter(|_| run.status != PayrollRunStatus::Cancelled) {
            return Err(PayrollError::conflict(format!(
                "Payroll run {} already exists for {}-{:02}",
                live.run_code, run.year, run.month
            )));
        }
        run.id = tables.allocate_id();
        tables.payroll_runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn update_payroll_run(&self, run: PayrollRun) -> PayrollResult<PayrollRun> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.payroll_runs, run.id, run, "payroll run")
    }

    async fn get_payroll_detail(&self, id: i64) -> PayrollResult<Option<PayrollDetail>> {
        Ok(self.tables.read().await.payroll_details.get(&id).cloned())
    }

    async fn payroll_detail(
        &self,
        payroll_run_id: i64,
        employee_id: i64,
    ) -> PayrollResult<Option<PayrollDetail>> {
        Ok(self
            .tables
            .read()
            .await
            .payroll_details
            .values()
            .find(|d| d.payroll_run_id == payroll_run_id && d.employee_id == employee_id)
            .cloned())
    }

    async fn payroll_details_for_run(
        &self,
        payroll_run_id: i64,
    ) -> PayrollResult<Vec<PayrollDetail>> {
        Ok(self
            .tables
            .read()
            .await
            .payroll_details
            .values()
            .filter(|d| d.payroll_run_id == payroll_run_id)
            .cloned()
            .collect())
    }

    async fn add_payroll_detail(&self, mut detail: PayrollDetail) -> PayrollResult<PayrollDetail> {
        let mut tables = self.tables.write().await;
        if tables.payroll_details.values().any(|d| {
            d.payroll_run_id == detail.payroll_run_id && d.employee_id == detail.employee_id
        }) {
            return Err(PayrollError::conflict(format!(
                "payroll detail for run {} and employee {} already exists",
                detail.payroll_run_id, detail.employee_id
            )));
        }
        detail.id = tables.allocate_id();
        tables.payroll_details.insert(detail.id, detail.clone());
        Ok(detail)
    }

    async fn update_payroll_detail(&self, detail: PayrollDetail) -> PayrollResult<PayrollDetail> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.payroll_details, detail.id, detail, "payroll detail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{AttendanceStatus, HolidayType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_allocated_sequentially() {
        let store = InMemoryStore::new();
        let first = store
            .add_employee(Employee::new(0, "E001", "Rahim", "Uddin"))
            .await
            .unwrap();
        let second = store
            .add_employee(Employee::new(0, "E002", "Karim", "Hossain"))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_employee_code_conflicts() {
        let store = InMemoryStore::new();
        store
            .add_employee(Employee::new(0, "E001", "Rahim", "Uddin"))
            .await
            .unwrap();
        let err = store
            .add_employee(Employee::new(0, "E001", "Other", "Person"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_duplicate_attendance_conflicts() {
        let store = InMemoryStore::new();
        let day = date(2024, 1, 2);
        store
            .add_attendance(Attendance::with_status(1, day, AttendanceStatus::Present))
            .await
            .unwrap();
        let err = store
            .add_attendance(Attendance::with_status(1, day, AttendanceStatus::Late))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // Another employee on the same day is fine
        store
            .add_attendance(Attendance::with_status(2, day, AttendanceStatus::Present))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_attendance_in_range_is_inclusive_and_sorted() {
        let store = InMemoryStore::new();
        for d in [5, 1, 31, 15] {
            store
                .add_attendance(Attendance::with_status(
                    1,
                    date(2024, 1, d),
                    AttendanceStatus::Present,
                ))
                .await
                .unwrap();
        }
        store
            .add_attendance(Attendance::with_status(
                1,
                date(2024, 2, 1),
                AttendanceStatus::Present,
            ))
            .await
            .unwrap();

        let rows = store
            .attendance_in_range(1, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        let days: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(
            days,
            vec![date(2024, 1, 1), date(2024, 1, 5), date(2024, 1, 15), date(2024, 1, 31)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_holiday_date_conflicts() {
        let store = InMemoryStore::new();
        let holiday = Holiday {
            id: 0,
            date: date(2024, 3, 26),
            name: "Independence Day".to_string(),
            holiday_type: HolidayType::National,
            is_repeat_annually: true,
        };
        store.add_holiday(holiday.clone()).await.unwrap();
        let err = store.add_holiday(holiday).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    fn draft_run(code: &str) -> PayrollRun {
        PayrollRun {
            id: 0,
            month: 1,
            year: 2024,
            name: "Payroll January 2024".to_string(),
            run_code: code.to_string(),
            status: PayrollRunStatus::Draft,
            totals: Default::default(),
            start_date: None,
            end_date: None,
            payment_date: None,
            notes: None,
            approved_by: None,
            approved_date: None,
            processed_by: None,
            processed_date: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_second_live_run_for_month_conflicts() {
        let store = InMemoryStore::new();
        let first = store.add_payroll_run(draft_run("PR-2024-01-001")).await.unwrap();

        let err = store
            .add_payroll_run(draft_run("PR-2024-01-002"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("PR-2024-01-001"));

        let mut cancelled = first;
        cancelled.status = PayrollRunStatus::Cancelled;
        store.update_payroll_run(cancelled).await.unwrap();
        let replacement = store
            .add_payroll_run(draft_run("PR-2024-01-002"))
            .await
            .unwrap();
        assert_eq!(store.payroll_runs_for_month(1, 2024).await.unwrap().len(), 2);
        assert_eq!(replacement.status, PayrollRunStatus::Draft);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = InMemoryStore::new();
        let mut employee = Employee::new(0, "E001", "Rahim", "Uddin");
        employee.id = 99;
        let err = store.update_employee(employee).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_slab_requires_existing_config() {
        let store = InMemoryStore::new();
        let slab = TaxSlab {
            id: 0,
            tax_config_id: 42,
            slab_order: 1,
            min_income: rust_decimal::Decimal::ZERO,
            max_income: None,
            tax_percentage: rust_decimal::Decimal::new(5, 0),
            fixed_amount: rust_decimal::Decimal::ZERO,
        };
        let err = store.add_tax_slab(slab).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
