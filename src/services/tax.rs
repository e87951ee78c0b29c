//! Employee income tax calculation against the stored tax tables.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculation::{TaxBreakdown, calculate_annual_tax};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{TaxConfig, TaxSlab};
use crate::store::HrStore;

/// Computes employee tax and maintains tax configurations.
pub struct TaxService<S> {
    store: Arc<S>,
}

impl<S> Clone for TaxService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: HrStore> TaxService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Annual and monthly tax for an employee in a tax year.
    ///
    /// Annual income is twelve times the gross of the employee's salary
    /// structure. Exempt employees short-circuit to zero before any
    /// configuration is consulted.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing employee, tax configuration or salary
    /// structure; `Unprocessable` when the configuration has no slabs.
    pub async fn annual_tax(&self, employee_id: i64, tax_year: i32) -> PayrollResult<TaxBreakdown> {
        let employee = self
            .store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("employee", employee_id))?;
        if employee.is_tax_exempted {
            debug!(employee_id, tax_year, "Employee is tax exempt");
            return Ok(TaxBreakdown::exempt(Decimal::ZERO));
        }

        let config = self
            .store
            .tax_config_for_year(tax_year)
            .await?
            .ok_or_else(|| PayrollError::not_found("tax configuration", tax_year))?;
        let slabs = self.store.tax_slabs_for(config.id).await?;
        let structure = self
            .store
            .salary_structure_for(employee_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("salary structure", employee_id))?;

        let annual_income = structure.gross_salary * Decimal::from(12);
        let breakdown = calculate_annual_tax(
            annual_income,
            employee.gender,
            employee.is_tax_exempted,
            &config,
            &slabs,
        )?;

        debug!(
            employee_id,
            tax_year,
            annual_income = %breakdown.annual_income,
            annual_tax = %breakdown.annual_tax,
            "Tax calculated"
        );
        Ok(breakdown)
    }

    /// Monthly tax for an employee in a tax year.
    pub async fn monthly_tax(&self, employee_id: i64, tax_year: i32) -> PayrollResult<Decimal> {
        Ok(self.annual_tax(employee_id, tax_year).await?.monthly_tax)
    }

    /// The active configuration whose effective range covers `today`.
    pub async fn current_config(&self, today: NaiveDate) -> PayrollResult<Option<TaxConfig>> {
        Ok(self
            .store
            .list_tax_configs()
            .await?
            .into_iter()
            .filter(|c| c.is_active && c.effective_from <= today)
            .filter(|c| c.effective_to.is_none_or(|to| today <= to))
            .max_by_key(|c| c.effective_from))
    }

    /// Stores a new tax year with its slabs.
    ///
    /// Fails with `Conflict` if the year already exists.
    pub async fn create_config(
        &self,
        config: TaxConfig,
        slabs: Vec<TaxSlab>,
    ) -> PayrollResult<TaxConfig> {
        for slab in &slabs {
            if slab.max_income.is_some_and(|max| max <= slab.min_income) {
                return Err(PayrollError::validation(
                    "max_income",
                    format!("slab starting at {} does not end above it", slab.min_income),
                ));
            }
        }

        let config = self.store.add_tax_config(config).await?;
        let slab_count = slabs.len();
        for (position, mut slab) in slabs.into_iter().enumerate() {
            slab.tax_config_id = config.id;
            if slab.slab_order == 0 {
                slab.slab_order = position as i32 + 1;
            }
            self.store.add_tax_slab(slab).await?;
        }

        info!(tax_year = config.tax_year, slab_count, "Tax configuration created");
        Ok(config)
    }

    /// Replaces a stored configuration's parameters.
    pub async fn update_config(&self, config: TaxConfig) -> PayrollResult<TaxConfig> {
        let config = self.store.update_tax_config(config).await?;
        info!(tax_year = config.tax_year, "Tax configuration updated");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Employee, Gender, SalaryStructure};
    use crate::store::{EmployeeStore, InMemoryStore, SalaryStructureStore, TaxStore};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config_2024() -> TaxConfig {
        TaxConfig {
            id: 0,
            tax_year: 2024,
            basic_tax_free_limit: dec("300000"),
            female_rebate_percentage: dec("10"),
            senior_citizen_rebate_percentage: Decimal::ZERO,
            effective_from: date(2024, 1, 1),
            effective_to: Some(date(2024, 12, 31)),
            is_active: true,
        }
    }

    fn slab(min: &str, max: Option<&str>, pct: &str) -> TaxSlab {
        TaxSlab {
            id: 0,
            tax_config_id: 0,
            slab_order: 0,
            min_income: dec(min),
            max_income: max.map(dec),
            tax_percentage: dec(pct),
            fixed_amount: Decimal::ZERO,
        }
    }

    async fn setup(gender: Gender, exempt: bool) -> (Arc<InMemoryStore>, TaxService<InMemoryStore>, i64) {
        let store = Arc::new(InMemoryStore::new());
        let mut employee = Employee::new(0, "E001", "Farhana", "Islam");
        employee.gender = gender;
        employee.is_tax_exempted = exempt;
        let employee = store.add_employee(employee).await.unwrap();
        store
            .add_salary_structure(SalaryStructure {
                employee_id: employee.id,
                basic_salary: dec("50000"),
                gross_salary: dec("50000"),
                net_salary: dec("50000"),
                ..SalaryStructure::default()
            })
            .await
            .unwrap();
        (Arc::clone(&store), TaxService::new(store), employee.id)
    }

    #[tokio::test]
    async fn test_female_employee_monthly_tax() {
        let (_store, service, employee_id) = setup(Gender::Female, false).await;
        service
            .create_config(
                config_2024(),
                vec![slab("0", Some("400000"), "5"), slab("400000", None, "10")],
            )
            .await
            .unwrap();

        let breakdown = service.annual_tax(employee_id, 2024).await.unwrap();
        assert_eq!(breakdown.annual_income, dec("600000"));
        assert_eq!(breakdown.taxable_income, dec("300000"));
        assert_eq!(breakdown.annual_tax, dec("13500"));
        assert_eq!(service.monthly_tax(employee_id, 2024).await.unwrap(), dec("1125"));
    }

    #[tokio::test]
    async fn test_exempt_employee_pays_nothing_without_config() {
        let (_store, service, employee_id) = setup(Gender::Male, true).await;
        let breakdown = service.annual_tax(employee_id, 2030).await.unwrap();
        assert_eq!(breakdown.annual_tax, Decimal::ZERO);
        assert_eq!(breakdown.monthly_tax, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_missing_year_is_not_found() {
        let (_store, service, employee_id) = setup(Gender::Male, false).await;
        let err = service.monthly_tax(employee_id, 2024).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_config_without_slabs_is_unprocessable() {
        let (_store, service, employee_id) = setup(Gender::Male, false).await;
        service.create_config(config_2024(), Vec::new()).await.unwrap();
        let err = service.monthly_tax(employee_id, 2024).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unprocessable);
    }

    #[tokio::test]
    async fn test_unknown_employee_is_not_found() {
        let (_store, service, _) = setup(Gender::Male, false).await;
        let err = service.annual_tax(404, 2024).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_current_config_by_effective_range() {
        let (_store, service, _) = setup(Gender::Male, false).await;
        service.create_config(config_2024(), Vec::new()).await.unwrap();
        let mut open_ended = config_2024();
        open_ended.tax_year = 2025;
        open_ended.effective_from = date(2025, 1, 1);
        open_ended.effective_to = None;
        service.create_config(open_ended, Vec::new()).await.unwrap();

        let current = service.current_config(date(2024, 6, 1)).await.unwrap().unwrap();
        assert_eq!(current.tax_year, 2024);
        let current = service.current_config(date(2027, 6, 1)).await.unwrap().unwrap();
        assert_eq!(current.tax_year, 2025);
        assert!(service.current_config(date(2023, 6, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_year_conflicts() {
        let (_store, service, _) = setup(Gender::Male, false).await;
        service.create_config(config_2024(), Vec::new()).await.unwrap();
        let err = service.create_config(config_2024(), Vec::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_config_changes_limit() {
        let (store, service, employee_id) = setup(Gender::Male, false).await;
        let mut config = service
            .create_config(
                config_2024(),
                vec![slab("0", Some("400000"), "5"), slab("400000", None, "10")],
            )
            .await
            .unwrap();
        config.basic_tax_free_limit = dec("600000");
        service.update_config(config).await.unwrap();

        let breakdown = service.annual_tax(employee_id, 2024).await.unwrap();
        assert_eq!(breakdown.annual_tax, Decimal::ZERO);
        assert!(store.tax_config_for_year(2024).await.unwrap().is_some());
    }
}
