//! The leave service: the engine's public operations.
//!
//! Thin orchestration over the injected [`LeaveStore`] and the calculation
//! modules. The service is what API handlers (or a CLI, or a scheduler)
//! call; it re-validates every write itself rather than trusting callers.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calculation::{
    self, AccrualRun, FamilyResponsibilityReason, ForfeitureItem, RequestDetails,
    TransitionAction, TransitionOptions, ValidationOutcome,
};
use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, HalfDayPeriod, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, PublicHoliday,
};
use crate::store::{LeaveRequestFilter, LeaveStore};

/// Input for creating (or preflight-validating) a leave request.
#[derive(Debug, Clone)]
pub struct CreateLeaveRequest {
    /// The employee the leave is for.
    pub employee_id: Uuid,
    /// The requested leave type.
    pub leave_type_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Whether this is a half-day request.
    pub half_day: bool,
    /// Morning or afternoon for half-day requests.
    pub half_day_period: Option<HalfDayPeriod>,
    /// The requester's stated reason.
    pub reason: Option<String>,
    /// Qualifying reason, required for family-responsibility leave.
    pub frl_reason: Option<FamilyResponsibilityReason>,
}

/// Changes to apply to a still-pending leave request.
#[derive(Debug, Clone, Default)]
pub struct UpdateLeaveRequest {
    /// New start date, if changing.
    pub start_date: Option<NaiveDate>,
    /// New end date, if changing.
    pub end_date: Option<NaiveDate>,
    /// New half-day flag, if changing.
    pub half_day: Option<bool>,
    /// New half-day period, if changing.
    pub half_day_period: Option<HalfDayPeriod>,
    /// New reason, if changing.
    pub reason: Option<String>,
}

/// An employee's cumulative position for one leave type, summed across all
/// cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeBalance {
    /// The leave type.
    pub leave_type_id: Uuid,
    /// The leave type's display name.
    pub leave_type_name: String,
    /// Total entitled days across all cycles.
    pub total_days: Decimal,
    /// Total used days across all cycles.
    pub used_days: Decimal,
    /// Total remaining days across all cycles.
    pub remaining_days: Decimal,
}

/// An employee's leave position at a glance: request counts plus cumulative
/// balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveSummary {
    /// All requests ever made.
    pub total_requests: u32,
    /// Requests awaiting a decision.
    pub pending: u32,
    /// Approved requests.
    pub approved: u32,
    /// Rejected requests.
    pub rejected: u32,
    /// Cancelled requests.
    pub cancelled: u32,
    /// Approved requests that have not started yet.
    pub upcoming: u32,
    /// Cumulative entitled days across all types and cycles.
    pub total_days: Decimal,
    /// Cumulative used days.
    pub used_days: Decimal,
    /// Cumulative remaining days.
    pub remaining_days: Decimal,
    /// Per-type cumulative balances.
    pub balances_by_type: Vec<CumulativeBalance>,
}

/// The engine's public operations over an injected store.
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    policy: LeavePolicy,
    fixed_today: Option<NaiveDate>,
}

impl LeaveService {
    /// Creates a service over the given store and policy.
    pub fn new(store: Arc<dyn LeaveStore>, policy: LeavePolicy) -> Self {
        Self {
            store,
            policy,
            fixed_today: None,
        }
    }

    /// Pins the service's notion of "today" to a fixed date. Temporal rules
    /// (service length, forfeiture deadlines, upcoming counts) become
    /// deterministic; production callers leave this unset.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// The policy the service runs on.
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn details_of(input: &CreateLeaveRequest) -> RequestDetails {
        RequestDetails {
            employee_id: input.employee_id,
            leave_type_id: input.leave_type_id,
            start_date: input.start_date,
            end_date: input.end_date,
            half_day: input.half_day,
            half_day_period: input.half_day_period,
            frl_reason: input.frl_reason,
        }
    }

    /// Validates a request without creating it (UI preflight).
    pub fn validate_leave_request(
        &self,
        input: &CreateLeaveRequest,
    ) -> EngineResult<ValidationOutcome> {
        calculation::validate_request(
            self.store.as_ref(),
            &self.policy,
            &Self::details_of(input),
            self.today(),
            None,
        )
    }

    /// Creates a leave request in the pending state.
    ///
    /// The write path runs the full validator itself; a request the
    /// validator rejects is never persisted.
    pub fn create_leave_request(&self, input: CreateLeaveRequest) -> EngineResult<LeaveRequest> {
        let outcome = self.validate_leave_request(&input)?;
        if !outcome.valid {
            return Err(EngineError::eligibility(outcome.message));
        }

        let now = Utc::now();
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            leave_type_id: input.leave_type_id,
            start_date: input.start_date,
            end_date: input.end_date,
            total_days: outcome.working_days,
            half_day: input.half_day,
            half_day_period: input.half_day_period,
            reason: input.reason,
            status: LeaveStatus::Pending,
            approved_by: None,
            approved_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_leave_request(request.clone())?;

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            total_days = %request.total_days,
            "leave request created"
        );
        Ok(request)
    }

    /// Edits a still-pending request, re-validating and recomputing its
    /// working-day cost. Allowed for the requester or an admin.
    pub fn update_leave_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        changes: UpdateLeaveRequest,
    ) -> EngineResult<LeaveRequest> {
        let request = self.load_request(request_id)?;
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::validation(
                "only pending leave requests can be edited",
            ));
        }
        self.require_owner_or_admin(&request, actor_id, "edit")?;

        let mut updated = request.clone();
        if let Some(start) = changes.start_date {
            updated.start_date = start;
        }
        if let Some(end) = changes.end_date {
            updated.end_date = end;
        }
        if let Some(half_day) = changes.half_day {
            updated.half_day = half_day;
            if !half_day {
                updated.half_day_period = None;
            }
        }
        if let Some(period) = changes.half_day_period {
            updated.half_day_period = Some(period);
        }
        if let Some(reason) = changes.reason {
            updated.reason = Some(reason);
        }

        let details = RequestDetails {
            employee_id: updated.employee_id,
            leave_type_id: updated.leave_type_id,
            start_date: updated.start_date,
            end_date: updated.end_date,
            half_day: updated.half_day,
            half_day_period: updated.half_day_period,
            // Edits keep whatever qualifying reason the original carried;
            // family-responsibility requests are re-checked on transition.
            frl_reason: None,
        };
        let leave_type = self.load_leave_type(updated.leave_type_id)?;
        let outcome = if leave_type.category
            == crate::models::LeaveCategory::FamilyResponsibility
        {
            // Date edits on FRL requests re-run only the date arithmetic;
            // the qualifying reason was vetted at creation.
            let holidays = calculation::holidays_for_range(
                self.store.as_ref(),
                updated.start_date,
                updated.end_date,
            )?;
            let days = calculation::leave_request_days(
                updated.start_date,
                updated.end_date,
                updated.half_day,
                updated.half_day_period,
                &holidays,
            )?;
            ValidationOutcome {
                valid: days > Decimal::ZERO,
                message: if days > Decimal::ZERO {
                    "request is valid".to_string()
                } else {
                    "the requested range contains no working days".to_string()
                },
                working_days: days,
                requires_medical_certificate: false,
            }
        } else {
            calculation::validate_request(
                self.store.as_ref(),
                &self.policy,
                &details,
                self.today(),
                Some(request_id),
            )?
        };
        if !outcome.valid {
            return Err(EngineError::eligibility(outcome.message));
        }

        updated.total_days = outcome.working_days;
        updated.updated_at = Utc::now();
        self.store.update_leave_request(updated.clone())?;
        Ok(updated)
    }

    /// Deletes a still-pending request (administrative cleanup or the
    /// requester changing their mind before review). Never touches balances.
    pub fn delete_leave_request(&self, request_id: Uuid, actor_id: Uuid) -> EngineResult<()> {
        let request = self.load_request(request_id)?;
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::validation(
                "only pending leave requests can be deleted",
            ));
        }
        self.require_owner_or_admin(&request, actor_id, "delete")?;
        self.store.delete_leave_request(request_id)
    }

    /// Applies a workflow transition (approve, reject, cancel) to a request.
    pub fn transition_leave_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        action: TransitionAction,
        options: TransitionOptions,
    ) -> EngineResult<LeaveRequest> {
        let request = self.load_request(request_id)?;
        let actor = self.load_employee(actor_id)?;
        calculation::transition(
            self.store.as_ref(),
            &request,
            &actor,
            action,
            &options,
            Utc::now(),
        )
    }

    /// Fetches a single leave request by id.
    pub fn get_leave_request(&self, request_id: Uuid) -> EngineResult<LeaveRequest> {
        self.load_request(request_id)
    }

    /// Lists an employee's balance rows, optionally for one cycle year.
    pub fn get_balances(
        &self,
        employee_id: Uuid,
        year: Option<i32>,
    ) -> EngineResult<Vec<LeaveBalance>> {
        self.load_employee(employee_id)?;
        self.store.balances_for_employee(employee_id, year)
    }

    /// Lists leave requests matching the filter.
    pub fn get_leave_requests(
        &self,
        filter: &LeaveRequestFilter,
    ) -> EngineResult<Vec<LeaveRequest>> {
        self.store.leave_requests(filter)
    }

    /// Summarizes an employee's requests and cumulative balances.
    pub fn leave_summary(&self, employee_id: Uuid) -> EngineResult<LeaveSummary> {
        self.load_employee(employee_id)?;
        let today = self.today();

        let requests = self
            .store
            .leave_requests(&LeaveRequestFilter::for_employee(employee_id))?;

        let mut summary = LeaveSummary {
            total_requests: requests.len() as u32,
            pending: 0,
            approved: 0,
            rejected: 0,
            cancelled: 0,
            upcoming: 0,
            total_days: Decimal::ZERO,
            used_days: Decimal::ZERO,
            remaining_days: Decimal::ZERO,
            balances_by_type: Vec::new(),
        };

        for request in &requests {
            match request.status {
                LeaveStatus::Pending => summary.pending += 1,
                LeaveStatus::Approved => {
                    summary.approved += 1;
                    if request.start_date >= today {
                        summary.upcoming += 1;
                    }
                }
                LeaveStatus::Rejected => summary.rejected += 1,
                LeaveStatus::Cancelled => summary.cancelled += 1,
            }
        }

        let leave_types = self.store.leave_types()?;
        for balance in self.store.balances_for_employee(employee_id, None)? {
            summary.total_days += balance.total_days;
            summary.used_days += balance.used_days;
            summary.remaining_days += balance.remaining_days;

            match summary
                .balances_by_type
                .iter_mut()
                .find(|b| b.leave_type_id == balance.leave_type_id)
            {
                Some(entry) => {
                    entry.total_days += balance.total_days;
                    entry.used_days += balance.used_days;
                    entry.remaining_days += balance.remaining_days;
                }
                None => {
                    let name = leave_types
                        .iter()
                        .find(|t| t.id == balance.leave_type_id)
                        .map(|t| t.name.clone())
                        .unwrap_or_default();
                    summary.balances_by_type.push(CumulativeBalance {
                        leave_type_id: balance.leave_type_id,
                        leave_type_name: name,
                        total_days: balance.total_days,
                        used_days: balance.used_days,
                        remaining_days: balance.remaining_days,
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Previews the cycles currently subject to the 18-month forfeiture rule.
    pub fn preview_forfeiture(&self, employee_id: Uuid) -> EngineResult<Vec<ForfeitureItem>> {
        calculation::preview_forfeiture(self.store.as_ref(), &self.policy, employee_id, self.today())
    }

    /// Applies pending forfeitures after the employee's explicit
    /// acknowledgment. Irreversible.
    pub fn acknowledge_and_process_forfeiture(
        &self,
        employee_id: Uuid,
        acknowledged: bool,
    ) -> EngineResult<Vec<ForfeitureItem>> {
        calculation::acknowledge_and_process(
            self.store.as_ref(),
            &self.policy,
            employee_id,
            acknowledged,
            self.today(),
        )
    }

    /// Runs the monthly annual-leave accrual batch for all active employees.
    pub fn run_monthly_accrual(&self, as_of: NaiveDate) -> EngineResult<AccrualRun> {
        calculation::run_monthly_accrual(self.store.as_ref(), &self.policy, as_of)
    }

    /// Onboards an employee: stores the record and opens current-cycle
    /// balances for every tracked leave type.
    pub fn register_employee(&self, employee: Employee) -> EngineResult<Employee> {
        self.store.upsert_employee(employee.clone())?;
        let as_of = self.today().max(employee.start_date);
        for leave_type in self.store.leave_types()? {
            if leave_type.tracks_balance() {
                calculation::ensure_cycle_balance(
                    self.store.as_ref(),
                    &employee,
                    &leave_type,
                    as_of,
                )?;
            }
        }
        Ok(employee)
    }

    /// Lists the public holidays observed in a year, generating and storing
    /// the statutory calendar on first access.
    pub fn holidays(&self, year: i32) -> EngineResult<Vec<PublicHoliday>> {
        let existing = self.store.holidays_for_year(year)?;
        if !existing.is_empty() {
            return Ok(existing);
        }
        for holiday in calculation::south_african_holidays(year) {
            // Entries shifted off a December Sunday stay in the same year,
            // so the generated set lands entirely in `year`.
            debug_assert_eq!(holiday.date.year(), year);
            self.store.insert_holiday(holiday)?;
        }
        self.store.holidays_for_year(year)
    }

    fn load_request(&self, id: Uuid) -> EngineResult<LeaveRequest> {
        self.store
            .leave_request(id)?
            .ok_or(EngineError::RequestNotFound { id })
    }

    fn load_employee(&self, id: Uuid) -> EngineResult<Employee> {
        self.store
            .employee(id)?
            .ok_or(EngineError::EmployeeNotFound { id })
    }

    fn load_leave_type(&self, id: Uuid) -> EngineResult<LeaveType> {
        self.store
            .leave_type(id)?
            .ok_or(EngineError::LeaveTypeNotFound { id })
    }

    fn require_owner_or_admin(
        &self,
        request: &LeaveRequest,
        actor_id: Uuid,
        verb: &str,
    ) -> EngineResult<()> {
        if actor_id == request.employee_id {
            return Ok(());
        }
        let actor = self.load_employee(actor_id)?;
        if actor.role.can_manage_users() {
            return Ok(());
        }
        Err(EngineError::Forbidden {
            message: format!("only the requester or an admin may {verb} a leave request"),
        })
    }
}
