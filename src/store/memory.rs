//! In-memory implementation of the [`LeaveStore`] repository.
//!
//! Backs the test suite and the bundled server. A single mutex guards the
//! tables; no lock is ever held across an await point, and the critical
//! sections are plain map operations.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, LeaveBalance, LeaveRequest, LeaveType, PublicHoliday};

use super::{LeaveRequestFilter, LeaveStore};

#[derive(Default)]
struct Tables {
    employees: HashMap<Uuid, Employee>,
    leave_types: HashMap<Uuid, LeaveType>,
    leave_requests: HashMap<Uuid, LeaveRequest>,
    // keyed by (employee, leave type, cycle year)
    balances: HashMap<(Uuid, Uuid, i32), LeaveBalance>,
    holidays: Vec<PublicHoliday>,
}

/// A [`LeaveStore`] holding everything in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the policy's leave-type catalogue.
    pub fn with_policy(policy: &LeavePolicy) -> Self {
        let store = Self::new();
        {
            let mut tables = store.lock();
            for definition in &policy.leave_types {
                let leave_type = definition.materialize();
                tables.leave_types.insert(leave_type.id, leave_type);
            }
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned mutex means a writer panicked mid-operation; the tables
        // are plain maps, so the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LeaveStore for InMemoryStore {
    fn employee(&self, id: Uuid) -> EngineResult<Option<Employee>> {
        Ok(self.lock().employees.get(&id).cloned())
    }

    fn upsert_employee(&self, employee: Employee) -> EngineResult<()> {
        self.lock().employees.insert(employee.id, employee);
        Ok(())
    }

    fn active_employees(&self, as_of: NaiveDate) -> EngineResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .lock()
            .employees
            .values()
            .filter(|e| e.is_active(as_of))
            .cloned()
            .collect();
        employees.sort_by_key(|e| e.id);
        Ok(employees)
    }

    fn leave_type(&self, id: Uuid) -> EngineResult<Option<LeaveType>> {
        Ok(self.lock().leave_types.get(&id).cloned())
    }

    fn leave_types(&self) -> EngineResult<Vec<LeaveType>> {
        let mut types: Vec<LeaveType> = self.lock().leave_types.values().cloned().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    fn insert_leave_type(&self, leave_type: LeaveType) -> EngineResult<()> {
        self.lock().leave_types.insert(leave_type.id, leave_type);
        Ok(())
    }

    fn leave_request(&self, id: Uuid) -> EngineResult<Option<LeaveRequest>> {
        Ok(self.lock().leave_requests.get(&id).cloned())
    }

    fn leave_requests(&self, filter: &LeaveRequestFilter) -> EngineResult<Vec<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self
            .lock()
            .leave_requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(requests)
    }

    fn insert_leave_request(&self, request: LeaveRequest) -> EngineResult<()> {
        self.lock().leave_requests.insert(request.id, request);
        Ok(())
    }

    fn update_leave_request(&self, request: LeaveRequest) -> EngineResult<()> {
        let mut tables = self.lock();
        if !tables.leave_requests.contains_key(&request.id) {
            return Err(EngineError::RequestNotFound { id: request.id });
        }
        tables.leave_requests.insert(request.id, request);
        Ok(())
    }

    fn delete_leave_request(&self, id: Uuid) -> EngineResult<()> {
        let mut tables = self.lock();
        tables
            .leave_requests
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::RequestNotFound { id })
    }

    fn balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> EngineResult<Option<LeaveBalance>> {
        Ok(self
            .lock()
            .balances
            .get(&(employee_id, leave_type_id, year))
            .cloned())
    }

    fn balances_for_employee(
        &self,
        employee_id: Uuid,
        year: Option<i32>,
    ) -> EngineResult<Vec<LeaveBalance>> {
        let mut balances: Vec<LeaveBalance> = self
            .lock()
            .balances
            .values()
            .filter(|b| b.employee_id == employee_id && year.is_none_or(|y| b.year == y))
            .cloned()
            .collect();
        balances.sort_by_key(|b| (b.leave_type_id, b.year));
        Ok(balances)
    }

    fn insert_balance(&self, balance: LeaveBalance) -> EngineResult<LeaveBalance> {
        let mut tables = self.lock();
        let key = (balance.employee_id, balance.leave_type_id, balance.year);
        if tables.balances.contains_key(&key) {
            return Err(EngineError::Persistence {
                message: format!(
                    "balance row already exists for employee {}, type {}, cycle {}",
                    balance.employee_id, balance.leave_type_id, balance.year
                ),
            });
        }
        tables.balances.insert(key, balance.clone());
        Ok(balance)
    }

    fn update_balance(
        &self,
        mut balance: LeaveBalance,
        expected_version: u64,
    ) -> EngineResult<LeaveBalance> {
        let mut tables = self.lock();
        let key = (balance.employee_id, balance.leave_type_id, balance.year);
        let stored = tables
            .balances
            .get(&key)
            .ok_or(EngineError::BalanceNotFound {
                employee_id: balance.employee_id,
                leave_type_id: balance.leave_type_id,
                year: balance.year,
            })?;

        if stored.version != expected_version {
            return Err(EngineError::ConcurrencyConflict {
                message: format!(
                    "balance row for employee {}, type {}, cycle {} changed (expected version {}, found {})",
                    balance.employee_id,
                    balance.leave_type_id,
                    balance.year,
                    expected_version,
                    stored.version
                ),
            });
        }

        balance.version = expected_version + 1;
        balance.updated_at = Utc::now();
        tables.balances.insert(key, balance.clone());
        Ok(balance)
    }

    fn holidays_for_year(&self, year: i32) -> EngineResult<Vec<PublicHoliday>> {
        let mut holidays: Vec<PublicHoliday> = self
            .lock()
            .holidays
            .iter()
            .filter(|h| h.year() == year)
            .cloned()
            .collect();
        holidays.sort_by_key(|h| h.date);
        Ok(holidays)
    }

    fn insert_holiday(&self, holiday: PublicHoliday) -> EngineResult<()> {
        self.lock().holidays.push(holiday);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use rust_decimal::Decimal;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_employee(start: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            full_name: "Sipho Dlamini".to_string(),
            email: "sipho@example.com".to_string(),
            department: None,
            role: Role::Employee,
            start_date: make_date(start),
            end_date: None,
            work_days_per_week: 5,
            last_forfeiture_processed_at: None,
        }
    }

    fn create_balance(employee_id: Uuid, leave_type_id: Uuid, year: i32) -> LeaveBalance {
        LeaveBalance::open_cycle(
            employee_id,
            leave_type_id,
            year,
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            Decimal::from(21),
        )
    }

    #[test]
    fn test_employee_round_trip() {
        let store = InMemoryStore::new();
        let employee = create_employee("2023-06-01");
        let id = employee.id;

        store.upsert_employee(employee.clone()).unwrap();
        assert_eq!(store.employee(id).unwrap(), Some(employee));
        assert_eq!(store.employee(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_active_employees_excludes_ended() {
        let store = InMemoryStore::new();
        let active = create_employee("2023-06-01");
        let mut ended = create_employee("2020-01-01");
        ended.end_date = Some(make_date("2024-12-31"));

        store.upsert_employee(active.clone()).unwrap();
        store.upsert_employee(ended).unwrap();

        let employees = store.active_employees(make_date("2025-06-01")).unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].id, active.id);
    }

    #[test]
    fn test_with_policy_seeds_leave_types() {
        let store = InMemoryStore::with_policy(&LeavePolicy::default());
        let types = store.leave_types().unwrap();
        assert_eq!(types.len(), 4);
    }

    #[test]
    fn test_balance_cas_succeeds_on_matching_version() {
        let store = InMemoryStore::new();
        let balance = create_balance(Uuid::new_v4(), Uuid::new_v4(), 2025);
        let stored = store.insert_balance(balance).unwrap();

        let mut updated = stored.clone();
        updated.record_usage(Decimal::from(5)).unwrap();
        let written = store.update_balance(updated, stored.version).unwrap();

        assert_eq!(written.version, stored.version + 1);
        assert_eq!(written.used_days, Decimal::from(5));
    }

    #[test]
    fn test_balance_cas_rejects_stale_version() {
        let store = InMemoryStore::new();
        let balance = create_balance(Uuid::new_v4(), Uuid::new_v4(), 2025);
        let stored = store.insert_balance(balance).unwrap();

        // First writer wins.
        let mut first = stored.clone();
        first.record_usage(Decimal::ONE).unwrap();
        store.update_balance(first, stored.version).unwrap();

        // Second writer read the same version and must be refused.
        let mut second = stored.clone();
        second.record_usage(Decimal::ONE).unwrap();
        let err = store.update_balance(second, stored.version).unwrap_err();
        assert!(matches!(err, EngineError::ConcurrencyConflict { .. }));
    }

    #[test]
    fn test_duplicate_balance_row_rejected() {
        let store = InMemoryStore::new();
        let balance = create_balance(Uuid::new_v4(), Uuid::new_v4(), 2025);
        store.insert_balance(balance.clone()).unwrap();
        assert!(store.insert_balance(balance).is_err());
    }

    #[test]
    fn test_holidays_filtered_by_year() {
        let store = InMemoryStore::new();
        for (date, name) in [
            ("2024-12-25", "Christmas Day"),
            ("2025-01-01", "New Year's Day"),
        ] {
            store
                .insert_holiday(PublicHoliday {
                    id: Uuid::new_v4(),
                    date: make_date(date),
                    name: name.to_string(),
                    observed: true,
                    original_date: None,
                })
                .unwrap();
        }

        let holidays = store.holidays_for_year(2025).unwrap();
        assert_eq!(holidays.len(), 1);
        assert_eq!(holidays[0].name, "New Year's Day");
    }

    #[test]
    fn test_update_missing_request_fails() {
        let store = InMemoryStore::new();
        let err = store.delete_leave_request(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::RequestNotFound { .. }));
    }
}
