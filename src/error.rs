//! Error types for the Leave Entitlement Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while processing leave.

use thiserror::Error;
use uuid::Uuid;

use crate::models::LeaveStatus;

/// The main error type for the Leave Entitlement Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
///
/// let error = EngineError::Validation {
///     message: "end date before start date".to_string(),
/// };
/// assert_eq!(error.to_string(), "Validation failed: end date before start date");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input was malformed or incomplete. Not retried.
    #[error("Validation failed: {message}")]
    Validation {
        /// A description of what made the input invalid.
        message: String,
    },

    /// A business rule rejected the request (insufficient balance,
    /// ineligible for family-responsibility leave, date overlap). Not retried.
    #[error("Not eligible: {message}")]
    Eligibility {
        /// A human-readable reason for the rejection.
        message: String,
    },

    /// An illegal workflow transition was attempted.
    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition {
        /// The request's current status.
        from: LeaveStatus,
        /// The status the caller tried to move to.
        to: LeaveStatus,
    },

    /// The acting user lacks the role required for the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// What the actor was not allowed to do.
        message: String,
    },

    /// An atomic balance update lost a race and the retry also failed.
    /// Safe to retry once at the call site before surfacing.
    #[error("Concurrent update conflict: {message}")]
    ConcurrencyConflict {
        /// Which balance row was contended.
        message: String,
    },

    /// The backing store was unavailable or timed out.
    #[error("Persistence failure: {message}")]
    Persistence {
        /// A description of the storage failure.
        message: String,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id that was not found.
        id: Uuid,
    },

    /// No leave type exists with the given id.
    #[error("Leave type not found: {id}")]
    LeaveTypeNotFound {
        /// The leave type id that was not found.
        id: Uuid,
    },

    /// No leave request exists with the given id.
    #[error("Leave request not found: {id}")]
    RequestNotFound {
        /// The request id that was not found.
        id: Uuid,
    },

    /// No balance row exists for the given employee, leave type, and cycle.
    #[error("No leave balance for employee {employee_id}, type {leave_type_id}, cycle {year}")]
    BalanceNotFound {
        /// The employee the balance belongs to.
        employee_id: Uuid,
        /// The leave type the balance tracks.
        leave_type_id: Uuid,
        /// The cycle key year.
        year: i32,
    },

    /// Policy configuration file was not found at the specified path.
    #[error("Policy file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Policy configuration file could not be parsed.
    #[error("Failed to parse policy file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Convenience constructor for [`EngineError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`EngineError::Eligibility`].
    pub fn eligibility(message: impl Into<String>) -> Self {
        Self::Eligibility {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
