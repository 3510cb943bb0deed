//! Application state for the Leave Entitlement Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::service::LeaveService;

/// Shared application state.
///
/// Carries the leave service and the shared token the scheduled accrual
/// trigger authenticates with.
#[derive(Clone)]
pub struct AppState {
    service: Arc<LeaveService>,
    accrual_token: Option<String>,
}

impl AppState {
    /// Creates a new application state around the given service.
    pub fn new(service: LeaveService) -> Self {
        Self {
            service: Arc::new(service),
            accrual_token: None,
        }
    }

    /// Sets the shared token the accrual endpoint requires. Without one the
    /// endpoint refuses all callers.
    pub fn with_accrual_token(mut self, token: impl Into<String>) -> Self {
        self.accrual_token = Some(token.into());
        self
    }

    /// Returns a reference to the leave service.
    pub fn service(&self) -> &LeaveService {
        &self.service
    }

    /// The expected accrual bearer token, if configured.
    pub fn accrual_token(&self) -> Option<&str> {
        self.accrual_token.as_deref()
    }
}
