//! Errors raised by role parsing and authorisation.

use super::{AccessRole, Action};
use thiserror::Error;

/// Authorisation failure for a single action.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The caller holds no role on the resource.
    #[error("resource is not visible to the caller")]
    NotVisible,

    /// The caller's role is below the policy threshold.
    #[error("{action} requires at least the {required} role")]
    Forbidden {
        /// Action that was attempted.
        action: Action,
        /// Minimum role the policy demands.
        required: AccessRole,
    },
}

/// Error returned while parsing roles from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
