//! Error types for account validation.

use crate::shared::FieldError;
use thiserror::Error;

/// Errors returned while constructing or changing account values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountDomainError {
    /// The email address is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The password is shorter than the minimum length.
    #[error("password must contain at least {0} characters")]
    PasswordTooShort(usize),

    /// The password confirmation differs from the password.
    #[error("password fields didn't match")]
    PasswordMismatch,

    /// A free-text field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),
}
