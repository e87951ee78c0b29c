//! Payroll run state machine.
//!
//! ```text
//! Draft -> PendingApproval -> Approved -> Processed -> Paid
//!   \            |               /
//!    +------> Cancelled <-------+
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};
use crate::models::PayrollRunStatus;

/// An action that moves a payroll run between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAction {
    /// Draft to PendingApproval.
    Submit,
    /// PendingApproval to Approved.
    Approve,
    /// Approved to Processed.
    Process,
    /// Processed to Paid.
    MarkPaid,
    /// Draft, PendingApproval or Approved to Cancelled.
    Cancel,
}

impl RunAction {
    fn precondition(self) -> &'static str {
        match self {
            RunAction::Submit => "Only draft payroll runs can be submitted for approval",
            RunAction::Approve => "Only pending payroll runs can be approved",
            RunAction::Process => "Only approved payroll runs can be processed",
            RunAction::MarkPaid => "Only processed payroll runs can be marked as paid",
            RunAction::Cancel => "Only unprocessed payroll runs can be cancelled",
        }
    }
}

/// Returns the status a run moves to when `action` is applied in `current`.
///
/// # Errors
///
/// Returns `InvalidStateTransition` naming the violated precondition.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{RunAction, transition};
/// use payroll_engine::models::PayrollRunStatus;
///
/// assert_eq!(
///     transition(PayrollRunStatus::Draft, RunAction::Submit).unwrap(),
///     PayrollRunStatus::PendingApproval
/// );
///
/// let err = transition(PayrollRunStatus::Draft, RunAction::Process).unwrap_err();
/// assert_eq!(err.to_string(), "Only approved payroll runs can be processed");
/// ```
pub fn transition(current: PayrollRunStatus, action: RunAction) -> PayrollResult<PayrollRunStatus> {
    use PayrollRunStatus::*;

    let next = match (action, current) {
        (RunAction::Submit, Draft) => PendingApproval,
        (RunAction::Approve, PendingApproval) => Approved,
        (RunAction::Process, Approved) => Processed,
        (RunAction::MarkPaid, Processed) => Paid,
        (RunAction::Cancel, Draft | PendingApproval | Approved) => Cancelled,
        _ => return Err(PayrollError::invalid_transition(action.precondition())),
    };
    Ok(next)
}
