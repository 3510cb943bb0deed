//! The balance ledger: the only writer of leave-balance rows.
//!
//! Approval, cancellation, forfeiture, and accrual all mutate balances
//! through the operations here. Each operation reads the row, applies an
//! invariant-preserving mutation, and writes it back with a compare-and-set
//! on the row's version. A lost race is retried once against fresh state,
//! then surfaced as a conflict.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AccrualMethod, Employee, LeaveBalance, LeaveType};
use crate::store::LeaveStore;

use super::accrual::current_cycle;

/// Records `days` of usage against a balance row (approval path).
///
/// Fails with [`EngineError::Eligibility`] if the remainder would go
/// negative, and with [`EngineError::ConcurrencyConflict`] if a competing
/// writer wins twice in a row.
pub fn apply_usage(
    store: &dyn LeaveStore,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    days: Decimal,
) -> EngineResult<LeaveBalance> {
    mutate_with_retry(store, employee_id, leave_type_id, year, |balance| {
        balance.record_usage(days)
    })
}

/// Reverses previously recorded usage (cancellation of an approved request).
pub fn reverse_usage(
    store: &dyn LeaveStore,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    days: Decimal,
) -> EngineResult<LeaveBalance> {
    mutate_with_retry(store, employee_id, leave_type_id, year, |balance| {
        balance.reverse_usage(days)
    })
}

/// Removes `days` of unused entitlement (forfeiture path). Leaves
/// `used_days` untouched.
pub fn apply_forfeiture(
    store: &dyn LeaveStore,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    days: Decimal,
) -> EngineResult<LeaveBalance> {
    mutate_with_retry(store, employee_id, leave_type_id, year, |balance| {
        balance.forfeit(days)
    })
}

/// Credits `days` of accrued entitlement (monthly accrual path).
pub fn credit_accrual(
    store: &dyn LeaveStore,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    days: Decimal,
) -> EngineResult<LeaveBalance> {
    mutate_with_retry(store, employee_id, leave_type_id, year, |balance| {
        balance.credit_accrual(days)
    })
}

/// Returns the balance row for the cycle containing `as_of`, creating it if
/// the employee does not have one yet.
///
/// Lump-sum leave types open with the full cycle entitlement; monthly
/// accrual types open empty and fill as the accrual batch runs.
pub fn ensure_cycle_balance(
    store: &dyn LeaveStore,
    employee: &Employee,
    leave_type: &LeaveType,
    as_of: NaiveDate,
) -> EngineResult<LeaveBalance> {
    let cycle = current_cycle(leave_type, employee.start_date, as_of)?;

    if let Some(balance) = store.balance(employee.id, leave_type.id, cycle.year)? {
        return Ok(balance);
    }

    let opening_days = match leave_type.accrual_method {
        AccrualMethod::Monthly => Decimal::ZERO,
        AccrualMethod::LumpSum => leave_type.max_days_per_cycle,
    };

    store.insert_balance(LeaveBalance::open_cycle(
        employee.id,
        leave_type.id,
        cycle.year,
        cycle.start,
        cycle.end,
        opening_days,
    ))
}

/// Read-mutate-CAS with a single retry on version conflict.
fn mutate_with_retry(
    store: &dyn LeaveStore,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    mutate: impl Fn(&mut LeaveBalance) -> EngineResult<()>,
) -> EngineResult<LeaveBalance> {
    for attempt in 0..2 {
        let stored = store
            .balance(employee_id, leave_type_id, year)?
            .ok_or(EngineError::BalanceNotFound {
                employee_id,
                leave_type_id,
                year,
            })?;

        let mut updated = stored.clone();
        mutate(&mut updated)?;

        match store.update_balance(updated, stored.version) {
            Ok(written) => return Ok(written),
            Err(EngineError::ConcurrencyConflict { message }) if attempt == 0 => {
                warn!(
                    %employee_id,
                    %leave_type_id,
                    year,
                    "balance update lost a race, retrying against fresh state: {message}"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(EngineError::ConcurrencyConflict {
        message: format!(
            "balance update for employee {employee_id}, type {leave_type_id}, cycle {year} \
             lost the race twice"
        ),
    })
}
