//! Payroll run orchestration: creation, approval workflow, processing into
//! detail rows, payslips and cost reporting.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Month, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{RunAction, compute_salary, transition};
use crate::config::{EngineSettings, MissingStructurePolicy};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    PaymentStatus, PayrollDetail, PayrollRun, PayrollRunStatus, Payslip, RunTotals,
    SalaryStructure, month_bounds,
};
use crate::store::HrStore;

use super::AttendanceService;

/// Parameters for a new payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPayrollRun {
    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Display name; defaults to "Payroll <Month> <Year>".
    #[serde(default)]
    pub name: Option<String>,
    /// Period start, when not the first of the month.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Period end, when not the last of the month.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Planned payment date.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Whether an approved run was interrupted part-way through processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunConsistency {
    /// Status and detail rows agree.
    Consistent,
    /// The run is still Approved but already has detail rows.
    PartiallyProcessed {
        /// Detail rows written before processing stopped.
        detail_count: usize,
    },
}

/// Drives payroll runs through their lifecycle.
pub struct PayrollService<S> {
    store: Arc<S>,
    attendance: AttendanceService<S>,
    settings: EngineSettings,
}

impl<S> Clone for PayrollService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            attendance: self.attendance.clone(),
            settings: self.settings,
        }
    }
}

impl<S: HrStore> PayrollService<S> {
    /// Creates a service over `store` with the given engine policies.
    pub fn new(store: Arc<S>, settings: EngineSettings) -> Self {
        let attendance = AttendanceService::new(Arc::clone(&store), settings.weekend_holiday_overlap);
        Self {
            store,
            attendance,
            settings,
        }
    }

    async fn load_run(&self, run_id: i64) -> PayrollResult<PayrollRun> {
        self.store
            .get_payroll_run(run_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("payroll run", run_id))
    }

    /// The month's live run: the newest one that is not cancelled.
    async fn run_for_month(&self, month: u32, year: i32) -> PayrollResult<Option<PayrollRun>> {
        Ok(self
            .store
            .payroll_runs_for_month(month, year)
            .await?
            .into_iter()
            .filter(|r| r.status != PayrollRunStatus::Cancelled)
            .max_by_key(|r| r.id))
    }

    /// Creates a Draft run for a month and snapshots current salary totals.
    ///
    /// # Errors
    ///
    /// `Validation` for an impossible month or an inverted period, `Conflict`
    /// if the month already has a run that is not cancelled.
    pub async fn create_run(
        &self,
        request: NewPayrollRun,
        now: DateTime<Utc>,
    ) -> PayrollResult<PayrollRun> {
        month_bounds(request.year, request.month)?;
        if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
            if end < start {
                return Err(PayrollError::validation(
                    "end_date",
                    format!("{} is before start date {}", end, start),
                ));
            }
        }

        let existing = self
            .store
            .payroll_runs_for_month(request.month, request.year)
            .await?;
        if let Some(live) = existing
            .iter()
            .find(|r| r.status != PayrollRunStatus::Cancelled)
        {
            return Err(PayrollError::conflict(format!(
                "Payroll run {} already exists for {}-{:02}",
                live.run_code, request.year, request.month
            )));
        }

        let mut totals = RunTotals::default();
        for employee in self.store.list_active_employees().await? {
            if let Some(structure) = self.store.salary_structure_for(employee.id).await? {
                totals.add(
                    structure.gross_salary,
                    structure.total_deductions,
                    structure.net_salary,
                );
            }
        }

        let run = PayrollRun {
            id: 0,
            month: request.month,
            year: request.year,
            name: request
                .name
                .unwrap_or_else(|| format!("Payroll {} {}", month_name(request.month), request.year)),
            run_code: format!(
                "PR-{}-{:02}-{:03}",
                request.year,
                request.month,
                existing.len() + 1
            ),
            status: PayrollRunStatus::Draft,
            totals,
            start_date: request.start_date,
            end_date: request.end_date,
            payment_date: request.payment_date,
            notes: request.notes,
            approved_by: None,
            approved_date: None,
            processed_by: None,
            processed_date: None,
            created_at: now,
        };

        let run = self.store.add_payroll_run(run).await?;
        info!(
            run_id = run.id,
            run_code = %run.run_code,
            employees = run.totals.total_employees,
            gross = %run.totals.total_gross_salary,
            "Payroll run created"
        );
        Ok(run)
    }

    async fn apply(&self, run_id: i64, action: RunAction) -> PayrollResult<PayrollRun> {
        let mut run = self.load_run(run_id).await?;
        let from = run.status;
        run.status = transition(from, action)?;
        let run = self.store.update_payroll_run(run).await?;
        info!(run_id, ?action, %from, to = %run.status, "Payroll run status changed");
        Ok(run)
    }

    /// Draft to PendingApproval.
    pub async fn submit(&self, run_id: i64) -> PayrollResult<PayrollRun> {
        self.apply(run_id, RunAction::Submit).await
    }

    /// PendingApproval to Approved, recording who approved and when.
    pub async fn approve(
        &self,
        run_id: i64,
        approver_id: i64,
        now: DateTime<Utc>,
    ) -> PayrollResult<PayrollRun> {
        let mut run = self.load_run(run_id).await?;
        run.status = transition(run.status, RunAction::Approve)?;
        run.approved_by = Some(approver_id);
        run.approved_date = Some(now);
        let run = self.store.update_payroll_run(run).await?;
        info!(run_id, approver_id, "Payroll run approved");
        Ok(run)
    }

    /// Processed to Paid.
    pub async fn mark_paid(&self, run_id: i64) -> PayrollResult<PayrollRun> {
        self.apply(run_id, RunAction::MarkPaid).await
    }

    /// Abandons a run that has not been processed.
    pub async fn cancel(&self, run_id: i64) -> PayrollResult<PayrollRun> {
        self.apply(run_id, RunAction::Cancel).await
    }

    /// Materialises one detail row per active employee and moves the run to
    /// Processed.
    ///
    /// Employees are handled one at a time with no enclosing transaction. If
    /// a row fails to write (for example a `Conflict` because the run was
    /// already partly processed) the error is returned and the run stays
    /// Approved with the rows written so far; see
    /// [`PayrollService::check_consistency`].
    ///
    /// Under [`MissingStructurePolicy::Fail`] every active employee is checked
    /// for a salary structure first; any gaps return `Unprocessable` naming
    /// the employees and nothing is written.
    pub async fn process(
        &self,
        run_id: i64,
        processed_by: i64,
        now: DateTime<Utc>,
    ) -> PayrollResult<PayrollRun> {
        let mut run = self.load_run(run_id).await?;
        let next = transition(run.status, RunAction::Process)?;
        let (start, end) = run.period()?;

        let mut roster = Vec::new();
        for employee in self.store.list_active_employees().await? {
            let structure = self.store.salary_structure_for(employee.id).await?;
            roster.push((employee, structure));
        }
        if self.settings.missing_salary_structure == MissingStructurePolicy::Fail {
            let missing: Vec<String> = roster
                .iter()
                .filter(|(_, structure)| structure.is_none())
                .map(|(employee, _)| employee.id.to_string())
                .collect();
            if !missing.is_empty() {
                warn!(run_id, missing = missing.len(), "Payroll run blocked by missing salary structures");
                return Err(PayrollError::Unprocessable {
                    message: format!(
                        "No salary structure for employees {}",
                        missing.join(", ")
                    ),
                });
            }
        }

        let mut written = 0usize;
        for (employee, structure) in roster {
            let structure = match structure {
                Some(structure) => structure,
                None => match self.settings.missing_salary_structure {
                    MissingStructurePolicy::Skip => {
                        warn!(run_id, employee_id = employee.id, "No salary structure; employee skipped");
                        continue;
                    }
                    MissingStructurePolicy::ZeroFill | MissingStructurePolicy::Fail => {
                        warn!(run_id, employee_id = employee.id, "No salary structure; writing zero detail");
                        SalaryStructure::empty_for(employee.id)
                    }
                },
            };

            let days = self.attendance.calculate(employee.id, start, end).await?;
            let figures = compute_salary(&structure);

            let detail = PayrollDetail {
                id: 0,
                payroll_run_id: run.id,
                employee_id: employee.id,
                basic_salary: structure.basic_salary,
                gross_salary: structure.gross_salary,
                total_earnings: figures.total_earnings,
                total_deductions: structure.total_deductions,
                net_salary: structure.net_salary,
                tax_amount: structure.tax_deduction,
                provident_fund: figures.provident_fund,
                other_deductions: structure.other_deductions,
                overtime_amount: None,
                working_days: days.working_days,
                paid_days: days.paid_days,
                bank_account_no: employee.bank_account_no.clone(),
                bank_name: employee.bank_name.clone(),
                payment_status: PaymentStatus::Pending,
            };
            self.store.add_payroll_detail(detail).await?;
            written += 1;
        }

        let mut totals = RunTotals::default();
        for detail in self.store.payroll_details_for_run(run.id).await? {
            totals.add(detail.gross_salary, detail.total_deductions, detail.net_salary);
        }

        run.status = next;
        run.totals = totals;
        run.processed_by = Some(processed_by);
        run.processed_date = Some(now);
        let run = self.store.update_payroll_run(run).await?;

        info!(
            run_id,
            processed_by,
            details = written,
            net = %run.totals.total_net_salary,
            "Payroll run processed"
        );
        Ok(run)
    }

    /// Looks up a run.
    pub async fn get_run(&self, run_id: i64) -> PayrollResult<Option<PayrollRun>> {
        self.store.get_payroll_run(run_id).await
    }

    /// A run's detail rows. `NotFound` if the run does not exist.
    pub async fn details_for_run(&self, run_id: i64) -> PayrollResult<Vec<PayrollDetail>> {
        self.load_run(run_id).await?;
        self.store.payroll_details_for_run(run_id).await
    }

    /// Net salary paid out by the month's run, zero when there is none.
    pub async fn month_cost(&self, month: u32, year: i32) -> PayrollResult<Decimal> {
        let Some(run) = self.run_for_month(month, year).await? else {
            return Ok(Decimal::ZERO);
        };
        Ok(self
            .store
            .payroll_details_for_run(run.id)
            .await?
            .iter()
            .map(|d| d.net_salary)
            .sum())
    }

    /// Net salary of a run grouped by department. Employees without a
    /// department are grouped under id 0.
    pub async fn cost_by_department(&self, run_id: i64) -> PayrollResult<BTreeMap<i64, Decimal>> {
        let mut costs = BTreeMap::new();
        for detail in self.details_for_run(run_id).await? {
            let department_id = self
                .store
                .get_employee(detail.employee_id)
                .await?
                .and_then(|e| e.department_id)
                .unwrap_or(0);
            *costs.entry(department_id).or_insert(Decimal::ZERO) += detail.net_salary;
        }
        Ok(costs)
    }

    /// Sets the payment status of a single detail row.
    pub async fn update_detail_payment_status(
        &self,
        detail_id: i64,
        status: PaymentStatus,
    ) -> PayrollResult<PayrollDetail> {
        let mut detail = self
            .store
            .get_payroll_detail(detail_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("payroll detail", detail_id))?;
        detail.payment_status = status;
        info!(detail_id, ?status, "Payment status updated");
        self.store.update_payroll_detail(detail).await
    }

    /// Assembles an employee's payslip for a month.
    ///
    /// Returns `None` when the month has no live run, the run has no row for
    /// the employee, or the employee does not exist.
    pub async fn payslip(
        &self,
        employee_id: i64,
        month: u32,
        year: i32,
    ) -> PayrollResult<Option<Payslip>> {
        let Some(run) = self.run_for_month(month, year).await? else {
            return Ok(None);
        };
        let Some(detail) = self.store.payroll_detail(run.id, employee_id).await? else {
            return Ok(None);
        };
        let Some(employee) = self.store.get_employee(employee_id).await? else {
            return Ok(None);
        };
        let structure = self
            .store
            .salary_structure_for(employee_id)
            .await?
            .unwrap_or_else(|| SalaryStructure::empty_for(employee_id));

        let or_na = |primary: Option<&String>, fallback: Option<&String>| {
            primary
                .or(fallback)
                .cloned()
                .unwrap_or_else(|| "N/A".to_string())
        };

        Ok(Some(Payslip {
            employee_id,
            employee_name: employee.full_name(),
            employee_code: employee.employee_code.clone(),
            department_id: employee.department_id,
            join_date: employee.date_of_joining,
            bank_name: or_na(detail.bank_name.as_ref(), employee.bank_name.as_ref()),
            bank_account_no: or_na(
                detail.bank_account_no.as_ref(),
                employee.bank_account_no.as_ref(),
            ),
            branch_name: or_na(employee.branch_name.as_ref(), None),
            month,
            year,
            month_name: month_name(month).to_string(),
            working_days: detail.working_days,
            days_present: detail.paid_days,
            days_absent: detail.working_days - detail.paid_days,
            basic_salary: detail.basic_salary,
            house_rent_allowance: structure.house_rent_allowance,
            transport_allowance: structure.transport_allowance,
            medical_allowance: structure.medical_allowance,
            overtime_amount: detail.overtime_amount.unwrap_or(Decimal::ZERO),
            total_earnings: detail.total_earnings,
            provident_fund: detail.provident_fund,
            tax_deduction: detail.tax_amount,
            other_deductions: detail.other_deductions,
            total_deductions: detail.total_deductions,
            gross_salary: detail.gross_salary,
            net_salary: detail.net_salary,
        }))
    }

    /// Detects an Approved run that already has detail rows, which is what
    /// an interrupted [`PayrollService::process`] leaves behind.
    pub async fn check_consistency(&self, run_id: i64) -> PayrollResult<RunConsistency> {
        let run = self.load_run(run_id).await?;
        if run.status != PayrollRunStatus::Approved {
            return Ok(RunConsistency::Consistent);
        }
        let detail_count = self.store.payroll_details_for_run(run_id).await?.len();
        if detail_count == 0 {
            Ok(RunConsistency::Consistent)
        } else {
            warn!(run_id, detail_count, "Approved run already has detail rows");
            Ok(RunConsistency::PartiallyProcessed { detail_count })
        }
    }
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{
        Attendance, AttendanceStatus, Employee, EmployeeStatus, Holiday, HolidayType,
    };
    use crate::store::{
        AttendanceStore, EmployeeStore, HolidayStore, InMemoryStore, PayrollStore,
        SalaryStructureStore,
    };
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> NewPayrollRun {
        NewPayrollRun {
            month: 1,
            year: 2024,
            name: None,
            start_date: None,
            end_date: None,
            payment_date: None,
            notes: None,
        }
    }

    fn structure(employee_id: i64, basic: &str) -> SalaryStructure {
        let mut structure = SalaryStructure {
            employee_id,
            basic_salary: dec(basic),
            house_rent_allowance: dec(basic) / Decimal::TWO,
            medical_allowance: dec("3000"),
            provident_fund_percentage: dec("10"),
            tax_deduction: dec("1000"),
            is_active: true,
            ..SalaryStructure::default()
        };
        crate::calculation::resolve_salary(&mut structure);
        structure
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: PayrollService<InMemoryStore>,
        alice: i64,
        bob: i64,
    }

    async fn setup_with(settings: EngineSettings) -> Fixture {
        let store = Arc::new(InMemoryStore::new());

        let mut alice = Employee::new(0, "E001", "Ayesha", "Rahman");
        alice.department_id = Some(10);
        alice.bank_name = Some("Sonali Bank".to_string());
        alice.bank_account_no = Some("0011223344".to_string());
        let alice = store.add_employee(alice).await.unwrap();

        let bob = store
            .add_employee(Employee::new(0, "E002", "Bashir", "Khan"))
            .await
            .unwrap();

        let mut gone = Employee::new(0, "E003", "Chanchal", "Das");
        gone.status = EmployeeStatus::Resigned;
        let gone = store.add_employee(gone).await.unwrap();

        store.add_salary_structure(structure(alice.id, "30000")).await.unwrap();
        store.add_salary_structure(structure(bob.id, "20000")).await.unwrap();
        store.add_salary_structure(structure(gone.id, "90000")).await.unwrap();

        store
            .add_holiday(Holiday {
                id: 0,
                date: date(2024, 1, 26),
                name: "Holiday".to_string(),
                holiday_type: HolidayType::National,
                is_repeat_annually: false,
            })
            .await
            .unwrap();

        Fixture {
            service: PayrollService::new(Arc::clone(&store), settings),
            store,
            alice: alice.id,
            bob: bob.id,
        }
    }

    async fn setup() -> Fixture {
        setup_with(EngineSettings::default()).await
    }

    async fn approved_run(f: &Fixture) -> PayrollRun {
        let run = f.service.create_run(january(), Utc::now()).await.unwrap();
        f.service.submit(run.id).await.unwrap();
        f.service.approve(run.id, 500, Utc::now()).await.unwrap()
    }

    // ==========================================================================
    // Creation
    // ==========================================================================

    #[tokio::test]
    async fn test_create_snapshots_active_totals() {
        let f = setup().await;
        let run = f.service.create_run(january(), Utc::now()).await.unwrap();

        assert_eq!(run.status, PayrollRunStatus::Draft);
        assert_eq!(run.run_code, "PR-2024-01-001");
        assert_eq!(run.name, "Payroll January 2024");
        assert_eq!(run.totals.total_employees, 2);
        // (30000 + 15000 + 3000) + (20000 + 10000 + 3000)
        assert_eq!(run.totals.total_gross_salary, dec("81000"));
    }

    #[tokio::test]
    async fn test_second_live_run_for_month_conflicts() {
        let f = setup().await;
        f.service.create_run(january(), Utc::now()).await.unwrap();
        let err = f.service.create_run(january(), Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_run_after_cancellation_gets_next_code() {
        let f = setup().await;
        let first = f.service.create_run(january(), Utc::now()).await.unwrap();
        f.service.cancel(first.id).await.unwrap();

        let second = f.service.create_run(january(), Utc::now()).await.unwrap();
        assert_eq!(second.run_code, "PR-2024-01-002");
    }

    #[tokio::test]
    async fn test_invalid_month_is_validation_error() {
        let f = setup().await;
        let mut request = january();
        request.month = 13;
        let err = f.service.create_run(request, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    // ==========================================================================
    // Lifecycle
    // ==========================================================================

    #[tokio::test]
    async fn test_process_draft_is_invalid_transition() {
        let f = setup().await;
        let run = f.service.create_run(january(), Utc::now()).await.unwrap();
        let err = f.service.process(run.id, 1, Utc::now()).await.unwrap_err();
        assert_eq!(err.to_string(), "Only approved payroll runs can be processed");
    }

    #[tokio::test]
    async fn test_mark_paid_on_draft_is_invalid_transition() {
        let f = setup().await;
        let run = f.service.create_run(january(), Utc::now()).await.unwrap();
        let err = f.service.mark_paid(run.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    }

    #[tokio::test]
    async fn test_approve_records_approver() {
        let f = setup().await;
        let run = approved_run(&f).await;
        assert_eq!(run.status, PayrollRunStatus::Approved);
        assert_eq!(run.approved_by, Some(500));
        assert!(run.approved_date.is_some());
    }

    #[tokio::test]
    async fn test_cancel_processed_run_is_rejected() {
        let f = setup().await;
        let run = approved_run(&f).await;
        f.service.process(run.id, 7, Utc::now()).await.unwrap();
        let err = f.service.cancel(run.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Only unprocessed payroll runs can be cancelled");
    }

    #[tokio::test]
    async fn test_unknown_run_is_not_found() {
        let f = setup().await;
        let err = f.service.submit(404).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // ==========================================================================
    // Processing
    // ==========================================================================

    #[tokio::test]
    async fn test_process_materialises_active_employees() {
        let f = setup().await;
        for day in [2, 3, 4] {
            f.store
                .add_attendance(Attendance::with_status(
                    f.alice,
                    date(2024, 1, day),
                    AttendanceStatus::Present,
                ))
                .await
                .unwrap();
        }
        let run = approved_run(&f).await;

        let processed = f.service.process(run.id, 7, Utc::now()).await.unwrap();
        assert_eq!(processed.status, PayrollRunStatus::Processed);
        assert_eq!(processed.processed_by, Some(7));
        assert_eq!(processed.totals.total_employees, 2);

        let details = f.service.details_for_run(run.id).await.unwrap();
        assert_eq!(details.len(), 2);

        let alice = details.iter().find(|d| d.employee_id == f.alice).unwrap();
        assert_eq!(alice.working_days, 22);
        // 3 present + 1 holiday
        assert_eq!(alice.paid_days, 4);
        assert_eq!(alice.gross_salary, dec("48000"));
        assert_eq!(alice.provident_fund, dec("3000"));
        assert_eq!(alice.net_salary, dec("44000"));
        assert_eq!(alice.tax_amount, dec("1000"));
        assert_eq!(alice.bank_name.as_deref(), Some("Sonali Bank"));
        assert_eq!(alice.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_detail_during_process_conflicts() {
        let f = setup().await;
        let run = approved_run(&f).await;
        f.store
            .add_payroll_detail(PayrollDetail {
                id: 0,
                payroll_run_id: run.id,
                employee_id: f.bob,
                basic_salary: Decimal::ZERO,
                gross_salary: Decimal::ZERO,
                total_earnings: Decimal::ZERO,
                total_deductions: Decimal::ZERO,
                net_salary: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
                provident_fund: Decimal::ZERO,
                other_deductions: Decimal::ZERO,
                overtime_amount: None,
                working_days: 0,
                paid_days: 0,
                bank_account_no: None,
                bank_name: None,
                payment_status: PaymentStatus::Pending,
            })
            .await
            .unwrap();

        let err = f.service.process(run.id, 7, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let run = f.service.get_run(run.id).await.unwrap().unwrap();
        assert_eq!(run.status, PayrollRunStatus::Approved);
        assert_eq!(
            f.service.check_consistency(run.id).await.unwrap(),
            RunConsistency::PartiallyProcessed { detail_count: 2 }
        );
    }

    #[tokio::test]
    async fn test_missing_structure_policies() {
        let f = setup().await;
        let carol = f
            .store
            .add_employee(Employee::new(0, "E004", "Dilruba", "Begum"))
            .await
            .unwrap();
        let run = approved_run(&f).await;
        f.service.process(run.id, 7, Utc::now()).await.unwrap();
        let zero = f.store.payroll_detail(run.id, carol.id).await.unwrap().unwrap();
        assert_eq!(zero.net_salary, Decimal::ZERO);

        let skip = PayrollService::new(
            Arc::clone(&f.store),
            EngineSettings {
                missing_salary_structure: MissingStructurePolicy::Skip,
                ..EngineSettings::default()
            },
        );
        let mut february = january();
        february.month = 2;
        let run = skip.create_run(february, Utc::now()).await.unwrap();
        skip.submit(run.id).await.unwrap();
        skip.approve(run.id, 1, Utc::now()).await.unwrap();
        let run = skip.process(run.id, 7, Utc::now()).await.unwrap();
        assert_eq!(run.totals.total_employees, 2);

        let fail = PayrollService::new(
            Arc::clone(&f.store),
            EngineSettings {
                missing_salary_structure: MissingStructurePolicy::Fail,
                ..EngineSettings::default()
            },
        );
        let mut march = january();
        march.month = 3;
        let run = fail.create_run(march, Utc::now()).await.unwrap();
        fail.submit(run.id).await.unwrap();
        fail.approve(run.id, 1, Utc::now()).await.unwrap();
        let err = fail.process(run.id, 7, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unprocessable);
        assert!(err.to_string().contains(&carol.id.to_string()));
        assert!(f.store.payroll_details_for_run(run.id).await.unwrap().is_empty());
        assert_eq!(
            fail.check_consistency(run.id).await.unwrap(),
            RunConsistency::Consistent
        );
        let run = fail.get_run(run.id).await.unwrap().unwrap();
        assert_eq!(run.status, PayrollRunStatus::Approved);
    }

    #[tokio::test]
    async fn test_full_lifecycle_to_paid() {
        let f = setup().await;
        let run = approved_run(&f).await;
        f.service.process(run.id, 7, Utc::now()).await.unwrap();
        let paid = f.service.mark_paid(run.id).await.unwrap();
        assert_eq!(paid.status, PayrollRunStatus::Paid);
        assert_eq!(
            f.service.check_consistency(run.id).await.unwrap(),
            RunConsistency::Consistent
        );
    }

    // ==========================================================================
    // Reporting
    // ==========================================================================

    #[tokio::test]
    async fn test_costs_and_payment_status() {
        let f = setup().await;
        assert_eq!(f.service.month_cost(1, 2024).await.unwrap(), Decimal::ZERO);

        let run = approved_run(&f).await;
        f.service.process(run.id, 7, Utc::now()).await.unwrap();

        // 44000 + 30000
        assert_eq!(f.service.month_cost(1, 2024).await.unwrap(), dec("74000"));

        let by_department = f.service.cost_by_department(run.id).await.unwrap();
        assert_eq!(by_department.get(&10), Some(&dec("44000")));
        assert_eq!(by_department.get(&0), Some(&dec("30000")));

        let detail = f.store.payroll_detail(run.id, f.bob).await.unwrap().unwrap();
        let updated = f
            .service
            .update_detail_payment_status(detail.id, PaymentStatus::OnHold)
            .await
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::OnHold);
    }

    #[tokio::test]
    async fn test_payslip_flattens_detail_and_structure() {
        let f = setup().await;
        let run = approved_run(&f).await;
        f.service.process(run.id, 7, Utc::now()).await.unwrap();

        let payslip = f.service.payslip(f.alice, 1, 2024).await.unwrap().unwrap();
        assert_eq!(payslip.employee_name, "Ayesha Rahman");
        assert_eq!(payslip.month_name, "January");
        assert_eq!(payslip.bank_name, "Sonali Bank");
        assert_eq!(payslip.branch_name, "N/A");
        assert_eq!(payslip.house_rent_allowance, dec("15000"));
        assert_eq!(payslip.tax_deduction, dec("1000"));
        assert_eq!(payslip.working_days, 22);
        // 1 holiday counted as paid
        assert_eq!(payslip.days_present, 1);
        assert_eq!(payslip.days_absent, 21);

        let bob = f.service.payslip(f.bob, 1, 2024).await.unwrap().unwrap();
        assert_eq!(bob.bank_account_no, "N/A");
    }

    #[tokio::test]
    async fn test_payslip_missing_pieces_is_none() {
        let f = setup().await;
        assert!(f.service.payslip(f.alice, 1, 2024).await.unwrap().is_none());

        let run = approved_run(&f).await;
        f.service.process(run.id, 7, Utc::now()).await.unwrap();
        assert!(f.service.payslip(999, 1, 2024).await.unwrap().is_none());
    }
}
