//! Employee model and related types.
//!
//! This module defines the Employee struct together with the EmployeeStatus
//! and Gender enums. Employees are never removed; they move through statuses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employment status of an employee.
///
/// Leaving the organisation is recorded as a status change rather than a
/// deletion so that payroll history stays intact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed and included in payroll runs.
    #[default]
    Active,
    /// Temporarily inactive.
    Inactive,
    /// On extended leave.
    OnLeave,
    /// Employment terminated by the employer.
    Terminated,
    /// Employee resigned.
    Resigned,
    /// Employee retired.
    Retired,
    /// Employee suspended.
    Suspended,
}

/// Gender of an employee, used for the female tax rebate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other.
    Other,
    /// Not disclosed.
    #[default]
    PreferNotToSay,
}

/// Represents an employee on the payroll.
///
/// Related entities (department, manager, supervisor, shift) are referenced by
/// id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: i64,
    /// Human-facing employee code (e.g., "EMP-0001").
    pub employee_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Work email address.
    pub email: String,
    /// Gender, used for tax rebates.
    #[serde(default)]
    pub gender: Gender,
    /// The date the employee joined.
    pub date_of_joining: Option<NaiveDate>,
    /// The date employment ended, if it has.
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    /// Whether the employee is exempt from income tax.
    #[serde(default)]
    pub is_tax_exempted: bool,
    /// Bank name for salary transfer.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Bank account number for salary transfer.
    #[serde(default)]
    pub bank_account_no: Option<String>,
    /// Bank branch name.
    #[serde(default)]
    pub branch_name: Option<String>,
    /// Current employment status.
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Department the employee belongs to.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// Direct manager.
    #[serde(default)]
    pub manager_id: Option<i64>,
    /// Supervisor.
    #[serde(default)]
    pub supervisor_id: Option<i64>,
    /// Assigned work shift.
    #[serde(default)]
    pub shift_id: Option<i64>,
}

impl Employee {
    /// Returns the employee's full name.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    ///
    /// let employee = Employee::new(1, "EMP-0001", "Nusrat", "Jahan");
    /// assert_eq!(employee.full_name(), "Nusrat Jahan");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if the employee is included in payroll runs.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Creates an active employee with only identity fields filled in.
    pub fn new(
        id: i64,
        employee_code: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let employee_code = employee_code.into();
        Self {
            id,
            email: format!("{}@example.com", employee_code.to_lowercase()),
            employee_code,
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: Gender::default(),
            date_of_joining: None,
            termination_date: None,
            is_tax_exempted: false,
            bank_name: None,
            bank_account_no: None,
            branch_name: None,
            status: EmployeeStatus::Active,
            department_id: None,
            manager_id: None,
            supervisor_id: None,
            shift_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_with_defaults() {
        let json = r#"{
            "id": 1,
            "employee_code": "EMP-0001",
            "first_name": "Nusrat",
            "last_name": "Jahan",
            "email": "nusrat@example.com",
            "date_of_joining": "2022-03-01"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, 1);
        assert_eq!(employee.status, EmployeeStatus::Active);
        assert_eq!(employee.gender, Gender::PreferNotToSay);
        assert!(!employee.is_tax_exempted);
        assert_eq!(
            employee.date_of_joining,
            Some(NaiveDate::from_ymd_opt(2022, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_only_active_status_is_active() {
        let mut employee = Employee::new(1, "EMP-0001", "Nusrat", "Jahan");
        assert!(employee.is_active());

        for status in [
            EmployeeStatus::Inactive,
            EmployeeStatus::OnLeave,
            EmployeeStatus::Terminated,
            EmployeeStatus::Resigned,
            EmployeeStatus::Retired,
            EmployeeStatus::Suspended,
        ] {
            employee.status = status;
            assert!(!employee.is_active(), "{:?} should not be active", status);
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EmployeeStatus::OnLeave).unwrap(),
            "\"on_leave\""
        );
        assert_eq!(
            serde_json::to_string(&Gender::Female).unwrap(),
            "\"female\""
        );
    }
}
