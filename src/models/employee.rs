//! Employee model and related types.
//!
//! This module defines the Employee struct and the closed Role enum with
//! its capability checks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role an employee holds in the organisation.
///
/// Authorization decisions go through the capability methods rather than
/// comparing role values at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular employee: may request and cancel their own leave.
    Employee,
    /// A manager: may additionally approve or reject requests.
    Manager,
    /// An administrator: full access, including cancelling on behalf of others.
    Admin,
}

impl Role {
    /// Whether this role may approve or reject leave requests.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::Role;
    ///
    /// assert!(Role::Manager.can_approve());
    /// assert!(Role::Admin.can_approve());
    /// assert!(!Role::Employee.can_approve());
    /// ```
    pub fn can_approve(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }

    /// Whether this role may act on records belonging to other users.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Represents an employee subject to leave entitlement rules.
///
/// The employment start date anchors all accrual and service-length
/// computations; it is never later than any as-of date used for the
/// employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The employee's full name.
    pub full_name: String,
    /// The employee's email address.
    pub email: String,
    /// The department the employee belongs to, if assigned.
    pub department: Option<String>,
    /// The employee's role.
    pub role: Role,
    /// The date employment started.
    pub start_date: NaiveDate,
    /// The date employment ended, if it has.
    pub end_date: Option<NaiveDate>,
    /// How many days per week the employee works. Family-responsibility
    /// leave requires at least four.
    pub work_days_per_week: u8,
    /// When stale annual leave was last forfeited for this employee.
    pub last_forfeiture_processed_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// Returns true if the employee is actively employed on the given date.
    ///
    /// An employee is active when they have no end date, or their end date
    /// is still in the future.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::{Employee, Role};
    /// use chrono::NaiveDate;
    /// use uuid::Uuid;
    ///
    /// let employee = Employee {
    ///     id: Uuid::new_v4(),
    ///     full_name: "Thandi Nkosi".to_string(),
    ///     email: "thandi@example.com".to_string(),
    ///     department: None,
    ///     role: Role::Employee,
    ///     start_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
    ///     end_date: None,
    ///     work_days_per_week: 5,
    ///     last_forfeiture_processed_at: None,
    /// };
    /// assert!(employee.is_active(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    /// ```
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| end > as_of)
    }
}
