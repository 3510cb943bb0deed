//! Calculation logic for the Leave Entitlement Engine.
//!
//! This module contains the rule implementations: working-day counting,
//! the South African holiday calendar, monthly annual-leave accrual,
//! request eligibility validation, the balance ledger, the 18-month
//! forfeiture rule, and the approval workflow.

mod accrual;
mod eligibility;
mod forfeiture;
mod holiday_calendar;
mod ledger;
mod working_days;
mod workflow;

pub use accrual::{
    AccrualFailure, AccrualRun, LeaveCycle, complete_months_between, current_cycle,
    run_monthly_accrual,
};
pub use eligibility::{
    FamilyResponsibilityReason, RequestDetails, ValidationOutcome, holidays_for_range,
    validate_request,
};
pub use forfeiture::{ForfeitureItem, acknowledge_and_process, preview_forfeiture};
pub use holiday_calendar::south_african_holidays;
pub use ledger::{
    apply_forfeiture, apply_usage, credit_accrual, ensure_cycle_balance, reverse_usage,
};
pub use working_days::{count_working_days, is_weekday, leave_request_days};
pub use workflow::{TransitionAction, TransitionOptions, transition};
