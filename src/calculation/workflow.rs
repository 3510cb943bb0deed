//! The leave request approval workflow.
//!
//! Legal transitions: pending → approved, rejected, or cancelled; approved →
//! cancelled. Approval is the only transition that debits the balance
//! ledger, and cancelling an approved request credits it back *before* the
//! cancellation is recorded, so a failed reversal leaves the request
//! approved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, LeaveRequest, LeaveStatus, LeaveType};
use crate::store::LeaveStore;

use super::accrual::current_cycle;
use super::ledger;

/// The action an actor takes on a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    /// Approve a pending request, debiting the balance.
    Approve,
    /// Reject a pending request.
    Reject,
    /// Cancel a pending or approved request.
    Cancel,
}

impl TransitionAction {
    /// The status this action moves a request into.
    pub fn target_status(&self) -> LeaveStatus {
        match self {
            TransitionAction::Approve => LeaveStatus::Approved,
            TransitionAction::Reject => LeaveStatus::Rejected,
            TransitionAction::Cancel => LeaveStatus::Cancelled,
        }
    }
}

/// Options accompanying a transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionOptions {
    /// Why the request is being cancelled. Required for cancellations.
    pub cancellation_reason: Option<String>,
}

/// Applies a workflow transition to a leave request.
///
/// Guards, in order: the transition must be legal for the request's current
/// status; approve/reject require an approver role; cancel requires the
/// requester themselves or an admin, plus a non-empty reason. Balance
/// mutations happen before the status is persisted, so a ledger failure
/// leaves the request untouched.
pub fn transition(
    store: &dyn LeaveStore,
    request: &LeaveRequest,
    actor: &Employee,
    action: TransitionAction,
    options: &TransitionOptions,
    now: DateTime<Utc>,
) -> EngineResult<LeaveRequest> {
    let to = action.target_status();
    if !request.status.can_transition_to(to) {
        return Err(EngineError::InvalidTransition {
            from: request.status,
            to,
        });
    }

    match action {
        TransitionAction::Approve | TransitionAction::Reject => {
            if !actor.role.can_approve() {
                return Err(EngineError::Forbidden {
                    message: format!(
                        "only managers and admins may {} leave requests",
                        if action == TransitionAction::Approve {
                            "approve"
                        } else {
                            "reject"
                        }
                    ),
                });
            }
        }
        TransitionAction::Cancel => {
            if actor.id != request.employee_id && !actor.role.can_manage_users() {
                return Err(EngineError::Forbidden {
                    message: "only the requester or an admin may cancel a leave request"
                        .to_string(),
                });
            }
            if options
                .cancellation_reason
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
            {
                return Err(EngineError::validation(
                    "a cancellation reason is required",
                ));
            }
        }
    }

    let leave_type =
        store
            .leave_type(request.leave_type_id)?
            .ok_or(EngineError::LeaveTypeNotFound {
                id: request.leave_type_id,
            })?;

    let mut updated = request.clone();
    match action {
        TransitionAction::Approve => {
            debit_on_approval(store, request, &leave_type)?;
            updated.approved_by = Some(actor.id);
            updated.approved_at = Some(now);
        }
        TransitionAction::Reject => {
            updated.approved_by = Some(actor.id);
            updated.approved_at = Some(now);
        }
        TransitionAction::Cancel => {
            if request.status == LeaveStatus::Approved {
                credit_on_cancellation(store, request, &leave_type)?;
            }
            updated.cancellation_reason = options.cancellation_reason.clone();
        }
    }

    updated.status = to;
    updated.updated_at = now;
    store.update_leave_request(updated.clone())?;

    info!(
        request_id = %request.id,
        employee_id = %request.employee_id,
        actor_id = %actor.id,
        from = %request.status,
        to = %to,
        "leave request transitioned"
    );
    Ok(updated)
}

fn request_cycle_year(
    store: &dyn LeaveStore,
    request: &LeaveRequest,
    leave_type: &LeaveType,
) -> EngineResult<i32> {
    let employee =
        store
            .employee(request.employee_id)?
            .ok_or(EngineError::EmployeeNotFound {
                id: request.employee_id,
            })?;
    Ok(current_cycle(leave_type, employee.start_date, request.start_date)?.year)
}

fn debit_on_approval(
    store: &dyn LeaveStore,
    request: &LeaveRequest,
    leave_type: &LeaveType,
) -> EngineResult<()> {
    if !leave_type.tracks_balance() || request.total_days <= Decimal::ZERO {
        return Ok(());
    }
    let year = request_cycle_year(store, request, leave_type)?;
    ledger::apply_usage(
        store,
        request.employee_id,
        request.leave_type_id,
        year,
        request.total_days,
    )?;
    Ok(())
}

fn credit_on_cancellation(
    store: &dyn LeaveStore,
    request: &LeaveRequest,
    leave_type: &LeaveType,
) -> EngineResult<()> {
    if !leave_type.tracks_balance() || request.total_days <= Decimal::ZERO {
        return Ok(());
    }
    let year = request_cycle_year(store, request, leave_type)?;
    ledger::reverse_usage(
        store,
        request.employee_id,
        request.leave_type_id,
        year,
        request.total_days,
    )?;
    Ok(())
}
