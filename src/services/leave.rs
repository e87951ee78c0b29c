//! Leave request workflow and balance bookkeeping.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{HalfDayPortion, Leave, LeaveBalance, LeaveStatus};
use crate::store::HrStore;

/// A new leave request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaveApplication {
    /// The requesting employee.
    pub employee_id: i64,
    /// The leave type requested.
    pub leave_type_id: i64,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Whether only half a day is requested.
    #[serde(default)]
    pub is_half_day: bool,
    /// Which half, for half-day requests.
    #[serde(default)]
    pub half_day_portion: Option<HalfDayPortion>,
    /// Reason given by the employee.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Drives leave requests through Pending, Approved, Rejected and Cancelled.
pub struct LeaveService<S> {
    store: Arc<S>,
}

impl<S> Clone for LeaveService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: HrStore> LeaveService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn load(&self, leave_id: i64) -> PayrollResult<Leave> {
        self.store
            .get_leave(leave_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("leave", leave_id))
    }

    /// Files a leave request as Pending.
    ///
    /// Fails with `Conflict` when it overlaps another of the employee's
    /// requests that is still pending or approved.
    pub async fn apply(
        &self,
        application: LeaveApplication,
        now: DateTime<Utc>,
    ) -> PayrollResult<Leave> {
        if application.end_date < application.start_date {
            return Err(PayrollError::validation(
                "end_date",
                format!(
                    "{} is before start date {}",
                    application.end_date, application.start_date
                ),
            ));
        }
        self.store
            .get_employee(application.employee_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("employee", application.employee_id))?;
        self.store
            .get_leave_type(application.leave_type_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("leave type", application.leave_type_id))?;

        let clash = self
            .store
            .leaves_for_employee(application.employee_id)
            .await?
            .into_iter()
            .filter(|l| matches!(l.status, LeaveStatus::Pending | LeaveStatus::Approved))
            .find(|l| l.overlaps(application.start_date, application.end_date));
        if let Some(existing) = clash {
            return Err(PayrollError::conflict(format!(
                "Leave request overlaps existing request {} ({} to {})",
                existing.id, existing.start_date, existing.end_date
            )));
        }

        let leave = Leave {
            id: 0,
            employee_id: application.employee_id,
            leave_type_id: application.leave_type_id,
            start_date: application.start_date,
            end_date: application.end_date,
            total_days: Leave::requested_days(
                application.start_date,
                application.end_date,
                application.is_half_day,
            ),
            reason: application.reason,
            status: LeaveStatus::Pending,
            applied_on: now,
            approved_by: None,
            approval_date: None,
            approval_remarks: None,
            is_half_day: application.is_half_day,
            half_day_portion: application.half_day_portion,
            cancelled_by: None,
            cancelled_date: None,
            cancellation_reason: None,
        };

        let leave = self.store.add_leave(leave).await?;
        info!(
            leave_id = leave.id,
            employee_id = leave.employee_id,
            total_days = %leave.total_days,
            "Leave requested"
        );
        Ok(leave)
    }

    /// Approves a pending request and charges it to the employee's balance
    /// for the start year, opening an empty balance if none exists.
    pub async fn approve(
        &self,
        leave_id: i64,
        approver_id: i64,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> PayrollResult<Leave> {
        let mut leave = self.load(leave_id).await?;
        if leave.status != LeaveStatus::Pending {
            return Err(PayrollError::invalid_transition(
                "Only pending leave requests can be approved",
            ));
        }

        leave.status = LeaveStatus::Approved;
        leave.approved_by = Some(approver_id);
        leave.approval_date = Some(now);
        leave.approval_remarks = remarks;
        let leave = self.store.update_leave(leave).await?;

        self.adjust_used_days(&leave, leave.total_days).await?;

        info!(leave_id, approver_id, "Leave approved");
        Ok(leave)
    }

    /// Rejects a pending request.
    pub async fn reject(
        &self,
        leave_id: i64,
        approver_id: i64,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> PayrollResult<Leave> {
        let mut leave = self.load(leave_id).await?;
        if leave.status != LeaveStatus::Pending {
            return Err(PayrollError::invalid_transition(
                "Only pending leave requests can be rejected",
            ));
        }

        leave.status = LeaveStatus::Rejected;
        leave.approved_by = Some(approver_id);
        leave.approval_date = Some(now);
        leave.approval_remarks = remarks;

        info!(leave_id, approver_id, "Leave rejected");
        self.store.update_leave(leave).await
    }

    /// Cancels the employee's own pending or approved request, returning
    /// approved days to the balance.
    pub async fn cancel(
        &self,
        leave_id: i64,
        employee_id: i64,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> PayrollResult<Leave> {
        let mut leave = self.load(leave_id).await?;
        if leave.employee_id != employee_id {
            return Err(PayrollError::validation(
                "employee_id",
                "You can only cancel your own leave requests",
            ));
        }
        let previous = leave.status;
        if !matches!(previous, LeaveStatus::Pending | LeaveStatus::Approved) {
            return Err(PayrollError::invalid_transition(
                "Only pending or approved leaves can be cancelled",
            ));
        }

        leave.status = LeaveStatus::Cancelled;
        leave.cancelled_by = Some(employee_id);
        leave.cancelled_date = Some(now);
        leave.cancellation_reason = reason;
        let leave = self.store.update_leave(leave).await?;

        if previous == LeaveStatus::Approved {
            self.adjust_used_days(&leave, -leave.total_days).await?;
        }

        info!(leave_id, employee_id, was = ?previous, "Leave cancelled");
        Ok(leave)
    }

    /// The employee's balances for a year.
    pub async fn balances(&self, employee_id: i64, year: i32) -> PayrollResult<Vec<LeaveBalance>> {
        self.store.leave_balances(employee_id, year).await
    }

    async fn adjust_used_days(&self, leave: &Leave, delta: Decimal) -> PayrollResult<()> {
        let year = leave.balance_year();
        match self
            .store
            .leave_balance(leave.employee_id, leave.leave_type_id, year)
            .await?
        {
            Some(mut balance) => {
                balance.used_days = (balance.used_days + delta).max(Decimal::ZERO);
                self.store.update_leave_balance(balance).await?;
            }
            None if delta > Decimal::ZERO => {
                self.store
                    .add_leave_balance(LeaveBalance {
                        id: 0,
                        employee_id: leave.employee_id,
                        leave_type_id: leave.leave_type_id,
                        year,
                        total_days: Decimal::ZERO,
                        used_days: delta,
                        pending_days: Decimal::ZERO,
                        carry_forward_days: Decimal::ZERO,
                    })
                    .await?;
            }
            None => {}
        }
        Ok(())
    }
}
