//! Policy loading functionality.
//!
//! This module provides the [`PolicyLoader`] type for loading a
//! [`LeavePolicy`] from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::LeavePolicy;

/// Loads and provides access to the leave policy.
///
/// # Example
///
/// ```no_run
/// use leave_engine::config::PolicyLoader;
///
/// let loader = PolicyLoader::load("./config/bcea/policy.yaml").unwrap();
/// let policy = loader.policy();
/// println!("Annual accrual rate: {}", policy.annual_accrual_per_month);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    policy: LeavePolicy,
}

impl PolicyLoader {
    /// Loads the policy from the specified YAML file.
    ///
    /// Returns an error if the file is missing or contains invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let policy =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        Ok(Self { policy })
    }

    /// Returns a loader carrying the compiled-in BCEA defaults.
    pub fn with_defaults() -> Self {
        Self {
            policy: LeavePolicy::default(),
        }
    }

    /// Returns a reference to the loaded policy.
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    /// Consumes the loader, returning the policy.
    pub fn into_policy(self) -> LeavePolicy {
        self.policy
    }
}
