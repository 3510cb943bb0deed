//! Persistence interface for the Leave Entitlement Engine.
//!
//! The engine never talks to a backend directly: every read and write goes
//! through the [`LeaveStore`] trait, injected into the service at
//! construction time. Tests and the bundled server use the in-memory
//! implementation; a production adapter wraps its backend client with
//! bounded timeouts and maps failures to [`EngineError::Persistence`].
//!
//! [`EngineError::Persistence`]: crate::error::EngineError::Persistence

mod memory;

pub use memory::InMemoryStore;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{Employee, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, PublicHoliday};

/// Filter predicates for listing leave requests.
#[derive(Debug, Clone, Default)]
pub struct LeaveRequestFilter {
    /// Restrict to one employee.
    pub employee_id: Option<Uuid>,
    /// Restrict to any of these statuses.
    pub statuses: Option<Vec<LeaveStatus>>,
    /// Restrict to one leave type.
    pub leave_type_id: Option<Uuid>,
    /// Only requests ending on or after this date.
    pub from: Option<NaiveDate>,
    /// Only requests starting on or before this date.
    pub to: Option<NaiveDate>,
}

impl LeaveRequestFilter {
    /// A filter matching one employee's requests in any status.
    pub fn for_employee(employee_id: Uuid) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Self::default()
        }
    }

    /// A filter matching one employee's pending and approved requests,
    /// the set that blocks overlapping new requests.
    pub fn open_requests(employee_id: Uuid) -> Self {
        Self {
            employee_id: Some(employee_id),
            statuses: Some(vec![LeaveStatus::Pending, LeaveStatus::Approved]),
            ..Self::default()
        }
    }

    /// Whether the given request matches every predicate in this filter.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        if let Some(employee_id) = self.employee_id {
            if request.employee_id != employee_id {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&request.status) {
                return false;
            }
        }
        if let Some(leave_type_id) = self.leave_type_id {
            if request.leave_type_id != leave_type_id {
                return false;
            }
        }
        if let Some(from) = self.from {
            if request.end_date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if request.start_date > to {
                return false;
            }
        }
        true
    }
}

/// The repository the engine runs against.
///
/// Implementations must be safe to share across request handlers and batch
/// jobs. The single concurrency-sensitive operation is
/// [`update_balance`](LeaveStore::update_balance): a compare-and-set keyed
/// on the balance row's version, so racing writers are detected rather than
/// lost.
pub trait LeaveStore: Send + Sync {
    /// Fetches an employee by id.
    fn employee(&self, id: Uuid) -> EngineResult<Option<Employee>>;

    /// Inserts or replaces an employee record.
    fn upsert_employee(&self, employee: Employee) -> EngineResult<()>;

    /// Enumerates employees active on the given date, for batch jobs.
    fn active_employees(&self, as_of: NaiveDate) -> EngineResult<Vec<Employee>>;

    /// Fetches a leave type by id.
    fn leave_type(&self, id: Uuid) -> EngineResult<Option<LeaveType>>;

    /// Lists all leave types.
    fn leave_types(&self) -> EngineResult<Vec<LeaveType>>;

    /// Inserts a leave type.
    fn insert_leave_type(&self, leave_type: LeaveType) -> EngineResult<()>;

    /// Fetches a leave request by id.
    fn leave_request(&self, id: Uuid) -> EngineResult<Option<LeaveRequest>>;

    /// Lists leave requests matching the filter, most recent start first.
    fn leave_requests(&self, filter: &LeaveRequestFilter) -> EngineResult<Vec<LeaveRequest>>;

    /// Inserts a new leave request.
    fn insert_leave_request(&self, request: LeaveRequest) -> EngineResult<()>;

    /// Replaces an existing leave request.
    fn update_leave_request(&self, request: LeaveRequest) -> EngineResult<()>;

    /// Deletes a leave request.
    fn delete_leave_request(&self, id: Uuid) -> EngineResult<()>;

    /// Fetches the balance row for one employee, leave type, and cycle year.
    fn balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> EngineResult<Option<LeaveBalance>>;

    /// Lists balance rows for an employee, optionally restricted to a year.
    fn balances_for_employee(
        &self,
        employee_id: Uuid,
        year: Option<i32>,
    ) -> EngineResult<Vec<LeaveBalance>>;

    /// Inserts a new balance row, returning the stored row.
    fn insert_balance(&self, balance: LeaveBalance) -> EngineResult<LeaveBalance>;

    /// Compare-and-set update of a balance row.
    ///
    /// Succeeds only if the stored row's version equals `expected_version`;
    /// the stored version is bumped and the stored row returned. A version
    /// mismatch fails with [`EngineError::ConcurrencyConflict`], which the
    /// ledger retries once.
    ///
    /// [`EngineError::ConcurrencyConflict`]: crate::error::EngineError::ConcurrencyConflict
    fn update_balance(
        &self,
        balance: LeaveBalance,
        expected_version: u64,
    ) -> EngineResult<LeaveBalance>;

    /// Lists public holidays observed in the given year.
    fn holidays_for_year(&self, year: i32) -> EngineResult<Vec<PublicHoliday>>;

    /// Inserts a public holiday entry.
    fn insert_holiday(&self, holiday: PublicHoliday) -> EngineResult<()>;
}
