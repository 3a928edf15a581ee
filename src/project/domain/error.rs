//! Error types for project and topic validation.

use super::{TopicCommentId, TopicId};
use crate::shared::{FieldError, ParseChoiceError};
use thiserror::Error;

/// Errors returned while constructing or changing project values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// A field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A reply names a parent comment from another topic.
    #[error("comment {parent} does not belong to topic {topic}")]
    ForeignParentComment {
        /// Parent comment named by the reply.
        parent: TopicCommentId,
        /// Topic the reply was posted to.
        topic: TopicId,
    },
}

impl From<ParseChoiceError> for ProjectDomainError {
    fn from(err: ParseChoiceError) -> Self {
        Self::Field(err.into())
    }
}
