//! Monthly annual-leave accrual.
//!
//! Annual leave accrues at a fixed monthly rate (1.75 days under the BCEA)
//! for every complete month of employment. The batch runs once per month
//! over all active employees and is idempotent: each balance row's
//! `accrued_days` records what has already been credited, and a run only
//! adds the shortfall between that watermark and the elapsed-months
//! entitlement.

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AccrualMethod, Employee, LeaveCategory, LeaveType};
use crate::store::LeaveStore;

use super::ledger;

/// The entitlement cycle a date falls in for a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveCycle {
    /// The cycle key: the calendar year the cycle starts in.
    pub year: i32,
    /// First day of the cycle.
    pub start: NaiveDate,
    /// Last day of the cycle.
    pub end: NaiveDate,
}

/// Counts the complete months between two dates, anniversary-based.
///
/// A month is complete once the start date's day-of-month comes around
/// again, so an employee starting mid-month accrues from their own start
/// date rather than the calendar month.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::complete_months_between;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let april = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
/// assert_eq!(complete_months_between(start, april), 3);
///
/// let mid_month = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
/// let feb_first = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
/// assert_eq!(complete_months_between(mid_month, feb_first), 0);
/// ```
pub fn complete_months_between(start: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of <= start {
        return 0;
    }
    let mut months =
        (as_of.year() - start.year()) * 12 + as_of.month() as i32 - start.month() as i32;
    if as_of.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Returns the cycle containing `as_of` for the given leave type.
///
/// Twelve-month cycles follow the calendar year (the convention the
/// forfeiture timeline is phrased in); longer cycles are anchored at the
/// employment start date.
pub fn current_cycle(
    leave_type: &LeaveType,
    employment_start: NaiveDate,
    as_of: NaiveDate,
) -> EngineResult<LeaveCycle> {
    if leave_type.cycle_months == 12 {
        let year = as_of.year();
        return Ok(LeaveCycle {
            year,
            start: NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1st always exists"),
            end: NaiveDate::from_ymd_opt(year, 12, 31).expect("December 31st always exists"),
        });
    }

    let elapsed = complete_months_between(employment_start, as_of);
    let cycle_index = elapsed / leave_type.cycle_months;
    let start = employment_start
        .checked_add_months(Months::new(cycle_index * leave_type.cycle_months))
        .ok_or_else(|| EngineError::validation("cycle start out of representable range"))?;
    let end = start
        .checked_add_months(Months::new(leave_type.cycle_months))
        .ok_or_else(|| EngineError::validation("cycle end out of representable range"))?
        - Duration::days(1);

    Ok(LeaveCycle {
        year: start.year(),
        start,
        end,
    })
}

/// One employee's failure during an accrual run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualFailure {
    /// The employee whose accrual failed.
    pub employee_id: Uuid,
    /// What went wrong.
    pub message: String,
}

/// The outcome of one monthly accrual batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualRun {
    /// The as-of date the run was computed for.
    pub as_of: NaiveDate,
    /// Employees processed without error.
    pub processed: u32,
    /// Total days credited across all employees this run.
    pub credited_days: Decimal,
    /// Per-employee failures; never aborts the rest of the batch.
    pub failures: Vec<AccrualFailure>,
}

/// Runs the monthly annual-leave accrual for every active employee.
///
/// Idempotent per as-of month: re-running credits nothing further. One
/// employee's failure is collected and the batch continues.
pub fn run_monthly_accrual(
    store: &dyn LeaveStore,
    policy: &LeavePolicy,
    as_of: NaiveDate,
) -> EngineResult<AccrualRun> {
    let annual_type = store
        .leave_types()?
        .into_iter()
        .find(|t| t.category == LeaveCategory::Annual && t.accrual_method == AccrualMethod::Monthly)
        .ok_or_else(|| {
            EngineError::validation("no monthly-accruing annual leave type is configured")
        })?;

    let employees = store.active_employees(as_of)?;
    let mut run = AccrualRun {
        as_of,
        processed: 0,
        credited_days: Decimal::ZERO,
        failures: Vec::new(),
    };

    for employee in &employees {
        match accrue_for_employee(store, policy, &annual_type, employee, as_of) {
            Ok(credited) => {
                run.processed += 1;
                run.credited_days += credited;
            }
            Err(e) => {
                warn!(employee_id = %employee.id, error = %e, "accrual failed for employee");
                run.failures.push(AccrualFailure {
                    employee_id: employee.id,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        as_of = %as_of,
        processed = run.processed,
        credited_days = %run.credited_days,
        failures = run.failures.len(),
        "monthly accrual run complete"
    );
    Ok(run)
}

/// Credits one employee's accrual shortfall, returning the days credited.
fn accrue_for_employee(
    store: &dyn LeaveStore,
    policy: &LeavePolicy,
    annual_type: &LeaveType,
    employee: &Employee,
    as_of: NaiveDate,
) -> EngineResult<Decimal> {
    // The month completing on `as_of` belongs to the cycle containing the
    // day before it, so a January 1st run credits December into the old
    // cycle instead of opening the new one.
    let accrual_date = as_of - Duration::days(1);
    if employee.start_date > accrual_date {
        return Ok(Decimal::ZERO);
    }

    let balance = ledger::ensure_cycle_balance(store, employee, annual_type, accrual_date)?;

    // Accrual within the cycle runs from the later of the employment start
    // and the cycle start.
    let anchor = employee.start_date.max(balance.cycle_start);
    let months = complete_months_between(anchor, as_of).min(annual_type.cycle_months);

    let expected = (Decimal::from(months) * policy.annual_accrual_per_month)
        .min(annual_type.max_days_per_cycle);
    let shortfall = expected - balance.accrued_days;

    if shortfall <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    ledger::credit_accrual(store, employee.id, annual_type.id, balance.year, shortfall)?;
    Ok(shortfall)
}
