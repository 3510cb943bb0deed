//! HTTP API module for the Leave Entitlement Engine.
//!
//! This module provides the REST endpoints for leave requests, balances,
//! forfeiture, the holiday calendar, and the scheduled accrual trigger.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AccrualRunBody, BalancesQuery, CreateLeaveBody, DeleteLeaveQuery, ForfeitureProcessBody,
    ListLeavesQuery, TransitionBody, UpdateLeaveBody,
};
pub use response::ApiError;
pub use state::AppState;
