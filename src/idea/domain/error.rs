//! Error types for idea validation.

use crate::shared::{FieldError, ParseChoiceError};
use thiserror::Error;

/// Errors returned while constructing or changing idea values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdeaDomainError {
    /// A field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl From<ParseChoiceError> for IdeaDomainError {
    fn from(err: ParseChoiceError) -> Self {
        Self::Field(err.into())
    }
}
