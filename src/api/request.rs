//! Request types for the Leave Entitlement Engine API.
//!
//! Wire-format DTOs, converted into service inputs via `From` impls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{FamilyResponsibilityReason, TransitionAction};
use crate::models::{HalfDayPeriod, LeaveStatus};
use crate::service::CreateLeaveRequest;
use crate::store::LeaveRequestFilter;

/// Body for creating or preflight-validating a leave request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeaveBody {
    /// The employee the leave is for.
    pub employee_id: Uuid,
    /// The requested leave type.
    pub leave_type_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Whether this is a half-day request.
    #[serde(default)]
    pub half_day: bool,
    /// Morning or afternoon for half-day requests.
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
    /// The requester's stated reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Qualifying reason for family-responsibility leave.
    #[serde(default)]
    pub frl_reason: Option<FamilyResponsibilityReason>,
}

impl From<CreateLeaveBody> for CreateLeaveRequest {
    fn from(body: CreateLeaveBody) -> Self {
        Self {
            employee_id: body.employee_id,
            leave_type_id: body.leave_type_id,
            start_date: body.start_date,
            end_date: body.end_date,
            half_day: body.half_day,
            half_day_period: body.half_day_period,
            reason: body.reason,
            frl_reason: body.frl_reason,
        }
    }
}

/// Body for editing a still-pending leave request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLeaveBody {
    /// Who is making the edit (the requester or an admin).
    pub actor_id: Uuid,
    /// New start date, if changing.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New end date, if changing.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// New half-day flag, if changing.
    #[serde(default)]
    pub half_day: Option<bool>,
    /// New half-day period, if changing.
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
    /// New reason, if changing.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for deleting a pending leave request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteLeaveQuery {
    /// Who is performing the deletion (the requester or an admin).
    pub actor_id: Uuid,
}

/// Body for transitioning a leave request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionBody {
    /// Who is performing the transition.
    pub actor_id: Uuid,
    /// The action to perform.
    pub action: TransitionAction,
    /// Why the request is being cancelled (required for cancellations).
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

/// Body for processing pending forfeitures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForfeitureProcessBody {
    /// The employee's explicit acknowledgment of the write-down.
    pub acknowledged: bool,
}

/// Body for triggering a monthly accrual run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualRunBody {
    /// The as-of date the run is computed for.
    pub as_of_date: NaiveDate,
}

/// Query parameters for listing leave requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLeavesQuery {
    /// Restrict to one employee.
    pub employee_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<LeaveStatus>,
    /// Restrict to one leave type.
    pub leave_type_id: Option<Uuid>,
    /// Only requests ending on or after this date.
    pub from: Option<NaiveDate>,
    /// Only requests starting on or before this date.
    pub to: Option<NaiveDate>,
}

impl From<ListLeavesQuery> for LeaveRequestFilter {
    fn from(query: ListLeavesQuery) -> Self {
        Self {
            employee_id: query.employee_id,
            statuses: query.status.map(|s| vec![s]),
            leave_type_id: query.leave_type_id,
            from: query.from,
            to: query.to,
        }
    }
}

/// Query parameters for listing balances.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalancesQuery {
    /// Restrict to one cycle year.
    pub year: Option<i32>,
}
