//! Error types for task validation.

use super::{TaskCommentId, TaskId};
use crate::shared::{FieldError, ParseChoiceError};
use thiserror::Error;

/// Errors returned while constructing or changing task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A reply names a parent comment on another task.
    #[error("comment {parent} does not belong to task {task}")]
    ForeignParentComment {
        /// Parent comment that was named.
        parent: TaskCommentId,
        /// Task the reply was posted on.
        task: TaskId,
    },
}

impl From<ParseChoiceError> for TaskDomainError {
    fn from(err: ParseChoiceError) -> Self {
        Self::Field(err.into())
    }
}

/// Error returned while parsing an hour amount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid hour amount: {0}")]
pub struct ParseHoursError(pub String);
