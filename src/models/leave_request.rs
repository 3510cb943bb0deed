//! Leave request model and its lifecycle states.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The lifecycle status of a leave request.
///
/// A request is created `Pending` and transitions exactly once to
/// `Approved` or `Rejected` by an approver, or to `Cancelled` by the
/// requester (or an admin). An approved request may still be cancelled;
/// rejected and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting an approval decision.
    Pending,
    /// Approved; the balance has been debited.
    Approved,
    /// Rejected; never touched the balance.
    Rejected,
    /// Cancelled; any prior debit has been reversed.
    Cancelled,
}

impl LeaveStatus {
    /// Whether a transition from this status to `to` is legal.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::LeaveStatus;
    ///
    /// assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
    /// assert!(LeaveStatus::Approved.can_transition_to(LeaveStatus::Cancelled));
    /// assert!(!LeaveStatus::Rejected.can_transition_to(LeaveStatus::Approved));
    /// ```
    pub fn can_transition_to(&self, to: LeaveStatus) -> bool {
        matches!(
            (self, to),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
                | (LeaveStatus::Pending, LeaveStatus::Cancelled)
                | (LeaveStatus::Approved, LeaveStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
            LeaveStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Which half of the day a half-day request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfDayPeriod {
    /// The morning half.
    Morning,
    /// The afternoon half.
    Afternoon,
}

/// A request for a period of leave.
///
/// `total_days` is computed by the validator at creation time and only
/// recomputed when a still-pending request is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The employee the leave is for.
    pub employee_id: Uuid,
    /// The type of leave requested.
    pub leave_type_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Working-day cost of the request (0.5 for half days).
    pub total_days: Decimal,
    /// Whether this is a half-day request.
    pub half_day: bool,
    /// Morning or afternoon, when `half_day` is set.
    pub half_day_period: Option<HalfDayPeriod>,
    /// The requester's stated reason, if given.
    pub reason: Option<String>,
    /// Current lifecycle status.
    pub status: LeaveStatus,
    /// Who approved or rejected the request.
    pub approved_by: Option<Uuid>,
    /// When the approval decision was made.
    pub approved_at: Option<DateTime<Utc>>,
    /// Why the request was cancelled. Required on cancellation.
    pub cancellation_reason: Option<String>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Whether this request's date range shares any calendar day with the
    /// given inclusive range.
    ///
    /// Date ordering on `NaiveDate` is timezone-independent, equivalent to
    /// comparing ISO-8601 strings lexicographically.
    ///
    /// # Examples
    ///
    /// ```
    /// # use leave_engine::models::{LeaveRequest, LeaveStatus};
    /// # use chrono::{NaiveDate, Utc};
    /// # use rust_decimal::Decimal;
    /// # use uuid::Uuid;
    /// # let request = LeaveRequest {
    /// #     id: Uuid::new_v4(),
    /// #     employee_id: Uuid::new_v4(),
    /// #     leave_type_id: Uuid::new_v4(),
    /// #     start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    /// #     end_date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
    /// #     total_days: Decimal::from(5),
    /// #     half_day: false,
    /// #     half_day_period: None,
    /// #     reason: None,
    /// #     status: LeaveStatus::Pending,
    /// #     approved_by: None,
    /// #     approved_at: None,
    /// #     cancellation_reason: None,
    /// #     created_at: Utc::now(),
    /// #     updated_at: Utc::now(),
    /// # };
    /// let june_6 = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
    /// let june_10 = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
    /// assert!(request.overlaps(june_6, june_10));
    /// ```
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}
