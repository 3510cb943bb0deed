//! The 18-month annual-leave forfeiture rule.
//!
//! Annual leave must be taken within its 12-month cycle plus a 6-month
//! carry-over grace period. Once a cycle's grace period has passed, the
//! cycle's remaining days become subject to forfeiture; the employee must
//! explicitly acknowledge the write-down before it is applied, and applying
//! it is irreversible.
//!
//! The days subject to forfeiture are the cycle's *current* remaining days
//! at preview/processing time, not a snapshot taken at the 18-month mark.
//! Usage recorded inside a stale cycle after the deadline therefore reduces
//! the forfeiture amount.

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::LeaveCategory;
use crate::store::LeaveStore;

use super::ledger;

/// One cycle's pending forfeiture, computed on demand and not stored until
/// processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForfeitureItem {
    /// The cycle key year the stale balance belongs to.
    pub year: i32,
    /// Days that will be removed from the balance.
    pub days_forfeited: Decimal,
    /// The day the carry-over grace period ended.
    pub due_date: NaiveDate,
    /// A human-readable explanation for the write-down.
    pub reason: String,
    /// Whether the employee must acknowledge before processing. Always true
    /// for statutory forfeiture.
    pub requires_acknowledgment: bool,
}

/// Computes the cycles currently subject to forfeiture for an employee.
///
/// A cycle qualifies when it tracks annual leave, its grace deadline
/// (`cycle_end` + the policy's carry-over months) has passed, and it still
/// has days remaining.
pub fn preview_forfeiture(
    store: &dyn LeaveStore,
    policy: &LeavePolicy,
    employee_id: Uuid,
    today: NaiveDate,
) -> EngineResult<Vec<ForfeitureItem>> {
    store
        .employee(employee_id)?
        .ok_or(EngineError::EmployeeNotFound { id: employee_id })?;

    let annual_type_ids: Vec<Uuid> = store
        .leave_types()?
        .into_iter()
        .filter(|t| t.category == LeaveCategory::Annual)
        .map(|t| t.id)
        .collect();

    let mut items = Vec::new();
    for balance in store.balances_for_employee(employee_id, None)? {
        if !annual_type_ids.contains(&balance.leave_type_id) {
            continue;
        }
        if balance.remaining_days <= Decimal::ZERO {
            continue;
        }

        let due_date = balance
            .cycle_end
            .checked_add_months(Months::new(policy.carry_over_grace_months))
            .ok_or_else(|| EngineError::validation("grace deadline out of representable range"))?;

        if today > due_date {
            items.push(ForfeitureItem {
                year: balance.year,
                days_forfeited: balance.remaining_days,
                due_date,
                reason: format!(
                    "Annual leave from the {} cycle was not taken by {} \
                     (12-month cycle plus {}-month carry-over) and must be \
                     forfeited under the BCEA",
                    balance.year, due_date, policy.carry_over_grace_months
                ),
                requires_acknowledgment: true,
            });
        }
    }

    items.sort_by_key(|i| i.year);
    Ok(items)
}

/// Applies the pending forfeitures after explicit acknowledgment.
///
/// Refuses to run unless `acknowledged` is set: the transition from
/// forfeiture-due to processed is never automatic. Once processed, the
/// affected balances are written down permanently and the employee record
/// is stamped; there is no path back.
pub fn acknowledge_and_process(
    store: &dyn LeaveStore,
    policy: &LeavePolicy,
    employee_id: Uuid,
    acknowledged: bool,
    today: NaiveDate,
) -> EngineResult<Vec<ForfeitureItem>> {
    if !acknowledged {
        return Err(EngineError::validation(
            "forfeiture requires explicit acknowledgment before processing",
        ));
    }

    let mut employee = store
        .employee(employee_id)?
        .ok_or(EngineError::EmployeeNotFound { id: employee_id })?;

    let items = preview_forfeiture(store, policy, employee_id, today)?;
    if items.is_empty() {
        return Ok(items);
    }

    let annual_ids: Vec<Uuid> = store
        .leave_types()?
        .into_iter()
        .filter(|t| t.category == LeaveCategory::Annual)
        .map(|t| t.id)
        .collect();

    for item in &items {
        // An employee normally has one annual-leave balance row per cycle
        // year; apply against whichever annual type carries it.
        let balance = store
            .balances_for_employee(employee_id, Some(item.year))?
            .into_iter()
            .find(|b| annual_ids.contains(&b.leave_type_id))
            .ok_or(EngineError::BalanceNotFound {
                employee_id,
                leave_type_id: annual_ids.first().copied().unwrap_or_default(),
                year: item.year,
            })?;

        ledger::apply_forfeiture(
            store,
            employee_id,
            balance.leave_type_id,
            item.year,
            item.days_forfeited,
        )?;

        info!(
            %employee_id,
            year = item.year,
            days = %item.days_forfeited,
            "processed annual-leave forfeiture"
        );
    }

    employee.last_forfeiture_processed_at = Some(Utc::now());
    store.upsert_employee(employee)?;

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccrualMethod, Employee, LeaveBalance, LeaveType, Role,
    };
    use crate::store::InMemoryStore;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        store: InMemoryStore,
        policy: LeavePolicy,
        employee: Employee,
        annual: LeaveType,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let employee = Employee {
            id: Uuid::new_v4(),
            full_name: "Pieter van der Merwe".to_string(),
            email: "pieter@example.com".to_string(),
            department: None,
            role: Role::Employee,
            start_date: make_date("2022-01-01"),
            end_date: None,
            work_days_per_week: 5,
            last_forfeiture_processed_at: None,
        };
        store.upsert_employee(employee.clone()).unwrap();

        let annual = LeaveType {
            id: Uuid::new_v4(),
            name: "Annual Leave".to_string(),
            color: "#2563eb".to_string(),
            statutory: true,
            category: LeaveCategory::Annual,
            cycle_months: 12,
            accrual_method: AccrualMethod::Monthly,
            max_days_per_cycle: dec("21"),
        };
        store.insert_leave_type(annual.clone()).unwrap();

        Fixture {
            store,
            policy: LeavePolicy::default(),
            employee,
            annual,
        }
    }

    fn seed_cycle_balance(f: &Fixture, year: i32, total: &str, used: &str) -> LeaveBalance {
        let total = dec(total);
        let used = dec(used);
        f.store
            .insert_balance(LeaveBalance {
                id: Uuid::new_v4(),
                employee_id: f.employee.id,
                leave_type_id: f.annual.id,
                year,
                cycle_start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                cycle_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
                total_days: total,
                used_days: used,
                remaining_days: total - used,
                accrued_days: total,
                carried_over_days: Decimal::ZERO,
                version: 0,
                updated_at: Utc::now(),
            })
            .unwrap()
    }

    // =========================================================================
    // FF-001: a stale cycle's remainder is previewed for forfeiture
    // =========================================================================
    #[test]
    fn test_ff_001_stale_cycle_previewed() {
        let f = fixture();
        seed_cycle_balance(&f, 2023, "21", "11");

        // The 2023 cycle's grace ran out on 2024-06-30.
        let items =
            preview_forfeiture(&f.store, &f.policy, f.employee.id, make_date("2025-07-01"))
                .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].year, 2023);
        assert_eq!(items[0].days_forfeited, dec("10"));
        assert_eq!(items[0].due_date, make_date("2024-06-30"));
        assert!(items[0].requires_acknowledgment);
    }

    // =========================================================================
    // FF-002: cycles inside their grace period are compliant
    // =========================================================================
    #[test]
    fn test_ff_002_cycle_within_grace_not_previewed() {
        let f = fixture();
        seed_cycle_balance(&f, 2024, "21", "0");

        // 2024 cycle's grace runs to 2025-06-30.
        let items =
            preview_forfeiture(&f.store, &f.policy, f.employee.id, make_date("2025-06-30"))
                .unwrap();
        assert!(items.is_empty());

        let items =
            preview_forfeiture(&f.store, &f.policy, f.employee.id, make_date("2025-07-01"))
                .unwrap();
        assert_eq!(items.len(), 1);
    }

    // =========================================================================
    // FF-003: processing writes the balance down and leaves used untouched
    // =========================================================================
    #[test]
    fn test_ff_003_processing_writes_down_balance() {
        let f = fixture();
        seed_cycle_balance(&f, 2023, "21", "11");

        let items = acknowledge_and_process(
            &f.store,
            &f.policy,
            f.employee.id,
            true,
            make_date("2025-07-01"),
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].days_forfeited, dec("10"));

        let balance = f
            .store
            .balance(f.employee.id, f.annual.id, 2023)
            .unwrap()
            .unwrap();
        assert_eq!(balance.total_days, dec("11"));
        assert_eq!(balance.remaining_days, Decimal::ZERO);
        assert_eq!(balance.used_days, dec("11"));
        assert!(balance.is_consistent());

        let employee = f.store.employee(f.employee.id).unwrap().unwrap();
        assert!(employee.last_forfeiture_processed_at.is_some());
    }

    // =========================================================================
    // FF-004: processing without acknowledgment is refused
    // =========================================================================
    #[test]
    fn test_ff_004_unacknowledged_processing_refused() {
        let f = fixture();
        seed_cycle_balance(&f, 2023, "21", "11");

        let err = acknowledge_and_process(
            &f.store,
            &f.policy,
            f.employee.id,
            false,
            make_date("2025-07-01"),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));

        // Nothing was written down.
        let balance = f
            .store
            .balance(f.employee.id, f.annual.id, 2023)
            .unwrap()
            .unwrap();
        assert_eq!(balance.remaining_days, dec("10"));
    }

    // =========================================================================
    // FF-005: processing is terminal; a second pass finds nothing
    // =========================================================================
    #[test]
    fn test_ff_005_processing_is_terminal() {
        let f = fixture();
        seed_cycle_balance(&f, 2023, "21", "11");

        acknowledge_and_process(
            &f.store,
            &f.policy,
            f.employee.id,
            true,
            make_date("2025-07-01"),
        )
        .unwrap();

        let again = acknowledge_and_process(
            &f.store,
            &f.policy,
            f.employee.id,
            true,
            make_date("2025-07-01"),
        )
        .unwrap();
        assert!(again.is_empty());
    }

    // =========================================================================
    // FF-006: usage inside a stale cycle reduces the eager forfeiture amount
    // =========================================================================
    #[test]
    fn test_ff_006_forfeiture_is_eager_not_snapshotted() {
        let f = fixture();
        seed_cycle_balance(&f, 2023, "21", "11");

        // Leave taken against the stale cycle after the deadline shrinks
        // what is left to forfeit.
        ledger::apply_usage(&f.store, f.employee.id, f.annual.id, 2023, dec("4")).unwrap();

        let items =
            preview_forfeiture(&f.store, &f.policy, f.employee.id, make_date("2025-07-01"))
                .unwrap();
        assert_eq!(items[0].days_forfeited, dec("6"));
    }

    #[test]
    fn test_multiple_stale_cycles_all_previewed() {
        let f = fixture();
        seed_cycle_balance(&f, 2022, "21", "21");
        seed_cycle_balance(&f, 2023, "21", "16");
        seed_cycle_balance(&f, 2024, "21", "1");

        let items =
            preview_forfeiture(&f.store, &f.policy, f.employee.id, make_date("2025-07-01"))
                .unwrap();

        // 2022 is fully used, 2023 has 5 left, 2024's grace just lapsed.
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].year, 2023);
        assert_eq!(items[0].days_forfeited, dec("5"));
        assert_eq!(items[1].year, 2024);
        assert_eq!(items[1].days_forfeited, dec("20"));
    }

    #[test]
    fn test_unknown_employee_is_an_error() {
        let f = fixture();
        let err = preview_forfeiture(&f.store, &f.policy, Uuid::new_v4(), make_date("2025-07-01"))
            .unwrap_err();
        assert!(matches!(err, EngineError::EmployeeNotFound { .. }));
    }
}
