//! Leave Entitlement Engine
//!
//! This crate implements the leave-balance and entitlement rules of the South
//! African Basic Conditions of Employment Act (BCEA): working-day counting,
//! monthly annual-leave accrual, request eligibility, balance bookkeeping,
//! the 18-month forfeiture rule, and the approval workflow.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
