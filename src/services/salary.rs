//! Salary structure lifecycle.

use std::sync::Arc;

use tracing::info;

use crate::calculation::resolve_salary;
use crate::error::{PayrollError, PayrollResult};
use crate::models::SalaryStructure;
use crate::store::HrStore;

/// Creates and updates salary structures, keeping their derived totals in step.
pub struct SalaryStructureService<S> {
    store: Arc<S>,
}

impl<S> Clone for SalaryStructureService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: HrStore> SalaryStructureService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stores a new structure for an existing employee.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown employee, `Conflict` if the employee already
    /// has a structure.
    pub async fn create(&self, mut structure: SalaryStructure) -> PayrollResult<SalaryStructure> {
        let employee_id = structure.employee_id;
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("employee", employee_id))?;
        if self.store.salary_structure_for(employee_id).await?.is_some() {
            return Err(PayrollError::conflict(format!(
                "Salary structure already exists for employee {}",
                employee_id
            )));
        }

        let figures = resolve_salary(&mut structure);
        let structure = self.store.add_salary_structure(structure).await?;
        info!(
            employee_id,
            gross = %figures.gross_salary,
            net = %figures.net_salary,
            "Salary structure created"
        );
        Ok(structure)
    }

    /// Replaces the components of the employee's structure and recomputes
    /// its totals. The stored id is kept.
    pub async fn update(&self, mut structure: SalaryStructure) -> PayrollResult<SalaryStructure> {
        let employee_id = structure.employee_id;
        let existing = self
            .store
            .salary_structure_for(employee_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("salary structure", employee_id))?;

        structure.id = existing.id;
        let figures = resolve_salary(&mut structure);
        let structure = self.store.update_salary_structure(structure).await?;
        info!(
            employee_id,
            gross = %figures.gross_salary,
            net = %figures.net_salary,
            "Salary structure updated"
        );
        Ok(structure)
    }

    /// The employee's structure, if configured.
    pub async fn get(&self, employee_id: i64) -> PayrollResult<Option<SalaryStructure>> {
        self.store.salary_structure_for(employee_id).await
    }
}
