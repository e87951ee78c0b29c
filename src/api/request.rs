//! Request types for the payroll API.
//!
//! Run creation takes [`NewPayrollRun`](crate::services::NewPayrollRun)
//! directly; the types here cover the remaining bodies and query strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /payroll-runs/:id/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRunRequest {
    /// The approving user.
    pub approver_id: i64,
}

/// Body of `POST /payroll-runs/:id/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRunRequest {
    /// The processing user.
    pub processed_by: i64,
}

/// Body of `POST /attendance/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceCalculationRequest {
    /// The employee to reconcile.
    pub employee_id: i64,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
}

/// Query string of `GET /attendance/today-stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayStatsQuery {
    /// The day to tally.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_request_deserialization() {
        let json = r#"{"employee_id": 3, "start_date": "2024-01-01", "end_date": "2024-01-31"}"#;
        let request: AttendanceCalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.employee_id, 3);
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_approve_request_requires_approver() {
        let result: Result<ApproveRunRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }
}
