//! Leave request validation and statutory eligibility rules.
//!
//! The validator answers whether a request is legally valid, what it costs
//! in working days, and whether a medical certificate is advised. The
//! outcome is advisory for UI preflight, but the write path re-runs it and
//! refuses to create invalid requests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{HalfDayPeriod, LeaveCategory, PublicHoliday};
use crate::store::{LeaveRequestFilter, LeaveStore};

use super::accrual::{complete_months_between, current_cycle};
use super::working_days::leave_request_days;

/// The closed set of reasons that qualify for family-responsibility leave
/// under section 27 of the BCEA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyResponsibilityReason {
    /// Birth of the employee's child.
    ChildBirth,
    /// The employee's child is ill and requires care.
    ChildIllness,
    /// Death of the employee's spouse.
    DeathSpouse,
    /// Death of the employee's life partner.
    DeathLifePartner,
    /// Death of the employee's parent.
    DeathParent,
    /// Death of the employee's grandparent.
    DeathGrandparent,
    /// Death of the employee's child.
    DeathChild,
    /// Death of the employee's grandchild.
    DeathGrandchild,
    /// Death of the employee's sibling.
    DeathSibling,
}

impl FamilyResponsibilityReason {
    /// A display label for the reason.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChildBirth => "Birth of child",
            Self::ChildIllness => "Child is ill (requires care)",
            Self::DeathSpouse => "Death of spouse",
            Self::DeathLifePartner => "Death of life partner",
            Self::DeathParent => "Death of parent",
            Self::DeathGrandparent => "Death of grandparent",
            Self::DeathChild => "Death of child",
            Self::DeathGrandchild => "Death of grandchild",
            Self::DeathSibling => "Death of sibling",
        }
    }
}

/// The details of a leave request under validation.
#[derive(Debug, Clone)]
pub struct RequestDetails {
    /// The employee requesting leave.
    pub employee_id: Uuid,
    /// The leave type requested.
    pub leave_type_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Whether this is a half-day request.
    pub half_day: bool,
    /// Morning or afternoon for half-day requests.
    pub half_day_period: Option<HalfDayPeriod>,
    /// Qualifying reason, required for family-responsibility leave.
    pub frl_reason: Option<FamilyResponsibilityReason>,
}

/// The validator's verdict on a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the request may be submitted.
    pub valid: bool,
    /// A human-readable explanation of the verdict.
    pub message: String,
    /// The working-day cost of the request.
    pub working_days: Decimal,
    /// Whether a medical certificate is advised (sick leave of two or more
    /// consecutive working days). Advisory, never a hard block.
    pub requires_medical_certificate: bool,
}

impl ValidationOutcome {
    fn invalid(message: impl Into<String>, working_days: Decimal) -> Self {
        Self {
            valid: false,
            message: message.into(),
            working_days,
            requires_medical_certificate: false,
        }
    }
}

/// Validates a leave request against the statutory rules.
///
/// Hard lookup failures (unknown employee or leave type) are errors; rule
/// violations come back as `valid == false` with the reason in `message`.
/// `exclude_request` skips one request id during overlap detection, for
/// re-validating an edit of a still-pending request against its siblings.
pub fn validate_request(
    store: &dyn LeaveStore,
    policy: &LeavePolicy,
    details: &RequestDetails,
    today: NaiveDate,
    exclude_request: Option<Uuid>,
) -> EngineResult<ValidationOutcome> {
    let employee = store
        .employee(details.employee_id)?
        .ok_or(EngineError::EmployeeNotFound {
            id: details.employee_id,
        })?;
    let leave_type =
        store
            .leave_type(details.leave_type_id)?
            .ok_or(EngineError::LeaveTypeNotFound {
                id: details.leave_type_id,
            })?;

    if details.end_date < details.start_date {
        return Ok(ValidationOutcome::invalid(
            format!(
                "end date {} is before start date {}",
                details.end_date, details.start_date
            ),
            Decimal::ZERO,
        ));
    }

    if details.half_day {
        if details.start_date != details.end_date {
            return Ok(ValidationOutcome::invalid(
                "half-day leave must start and end on the same date",
                Decimal::ZERO,
            ));
        }
        if details.half_day_period.is_none() {
            return Ok(ValidationOutcome::invalid(
                "half-day leave requires a morning or afternoon period",
                Decimal::ZERO,
            ));
        }
    }

    let holidays = holidays_for_range(store, details.start_date, details.end_date)?;
    let working_days = leave_request_days(
        details.start_date,
        details.end_date,
        details.half_day,
        details.half_day_period,
        &holidays,
    )?;

    if working_days <= Decimal::ZERO {
        return Ok(ValidationOutcome::invalid(
            "the requested range contains no working days",
            working_days,
        ));
    }

    // Overlap with the employee's own pending or approved leave.
    let open = store.leave_requests(&LeaveRequestFilter::open_requests(details.employee_id))?;
    if let Some(existing) = open
        .iter()
        .filter(|r| exclude_request != Some(r.id))
        .find(|r| r.overlaps(details.start_date, details.end_date))
    {
        return Ok(ValidationOutcome::invalid(
            format!(
                "overlaps an existing {} request from {} to {}",
                existing.status, existing.start_date, existing.end_date
            ),
            working_days,
        ));
    }

    // Family-responsibility preconditions come before the balance check so
    // the employee learns about ineligibility rather than a balance number.
    if leave_type.category == LeaveCategory::FamilyResponsibility {
        let service_months = complete_months_between(employee.start_date, today);
        if service_months < policy.frl_min_service_months {
            return Ok(ValidationOutcome::invalid(
                format!(
                    "family-responsibility leave requires {} months of service; {} completed",
                    policy.frl_min_service_months, service_months
                ),
                working_days,
            ));
        }
        if employee.work_days_per_week < policy.frl_min_work_days_per_week {
            return Ok(ValidationOutcome::invalid(
                format!(
                    "family-responsibility leave requires working at least {} days per week",
                    policy.frl_min_work_days_per_week
                ),
                working_days,
            ));
        }
        if details.frl_reason.is_none() {
            return Ok(ValidationOutcome::invalid(
                "family-responsibility leave requires a qualifying reason",
                working_days,
            ));
        }
    }

    // Balance check for tracked leave types.
    if leave_type.tracks_balance() {
        let cycle = current_cycle(&leave_type, employee.start_date, details.start_date)?;
        let remaining = store
            .balance(employee.id, leave_type.id, cycle.year)?
            .map(|b| b.remaining_days)
            .unwrap_or(Decimal::ZERO);

        if working_days > remaining {
            return Ok(ValidationOutcome::invalid(
                format!(
                    "insufficient {} balance: requested {working_days}, remaining {remaining}",
                    leave_type.name
                ),
                working_days,
            ));
        }
    }

    let requires_medical_certificate = leave_type.category == LeaveCategory::Sick
        && working_days >= policy.medical_certificate_threshold_days;

    Ok(ValidationOutcome {
        valid: true,
        message: "request is valid".to_string(),
        working_days,
        requires_medical_certificate,
    })
}

/// Loads the holiday sets for every calendar year a range touches.
pub fn holidays_for_range(
    store: &dyn LeaveStore,
    start: NaiveDate,
    end: NaiveDate,
) -> EngineResult<Vec<PublicHoliday>> {
    use chrono::Datelike;

    let mut holidays = Vec::new();
    let first = start.year().min(end.year());
    let last = start.year().max(end.year());
    for year in first..=last {
        holidays.extend(store.holidays_for_year(year)?);
    }
    Ok(holidays)
}
