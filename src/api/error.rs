//! Mapping of service failures onto HTTP responses.
//!
//! Bodies follow two shapes: `{"detail": "..."}` for request-level failures
//! and `{"<field>": ["..."]}` for a rejected field. Callers without any role
//! on a resource receive the same 404 as for a missing one.

use crate::access::AccessError;
use crate::account::{
    domain::AccountDomainError,
    ports::{CredentialError, UserRepositoryError},
    services::AccountServiceError,
};
use crate::blob::ports::BlobStoreError;
use crate::idea::{
    domain::IdeaDomainError, ports::IdeaRepositoryError, services::IdeaServiceError,
};
use crate::project::{
    domain::ProjectDomainError,
    ports::{ProjectRepositoryError, TopicRepositoryError},
    services::{ProjectServiceError, TopicServiceError},
};
use crate::shared::FieldError;
use crate::task::{domain::TaskDomainError, ports::TaskRepositoryError, services::TaskServiceError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use thiserror::Error;

const NOT_FOUND: &str = "Not found.";
const FORBIDDEN: &str = "You do not have permission to perform this action.";
const INTERNAL: &str = "A server error occurred.";

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single request.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Missing, malformed or expired bearer token.
    #[error("{0}")]
    Unauthorized(&'static str),
    /// The resource does not exist or is not visible to the caller.
    #[error("not found")]
    NotFound,
    /// The caller's role is too low, or they do not own the record.
    #[error("{0}")]
    Forbidden(String),
    /// A request field was rejected.
    #[error(transparent)]
    Field(FieldError),
    /// The request could not be read.
    #[error("{0}")]
    BadRequest(String),
    /// Persistence or infrastructure failure.
    #[error("internal error: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Wraps an infrastructure failure.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Arc::new(err))
    }

    /// Shorthand for a rejected field.
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Field(FieldError::new(field, message))
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Field(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Unauthorized(detail) => json!({ "detail": detail }),
            Self::NotFound => json!({ "detail": NOT_FOUND }),
            Self::Forbidden(detail) | Self::BadRequest(detail) => json!({ "detail": detail }),
            Self::Field(err) => {
                let mut body = Map::new();
                body.insert(err.field.to_owned(), json!([err.message]));
                Value::Object(body)
            }
            Self::Internal(_) => json!({ "detail": INTERNAL }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            tracing::error!(error = %err, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotVisible => Self::NotFound,
            AccessError::Forbidden { .. } => Self::Forbidden(FORBIDDEN.to_owned()),
        }
    }
}

impl From<BlobStoreError> for ApiError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::InvalidKey(key) => {
                Self::BadRequest(format!("Invalid file name: {key}"))
            }
            BlobStoreError::Storage(source) => Self::Internal(source),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        Self::internal(err)
    }
}

impl From<UserRepositoryError> for ApiError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::DuplicateEmail(_) => {
                Self::field("email", "A user with this email already exists.")
            }
            UserRepositoryError::NotFound(_) => Self::NotFound,
            UserRepositoryError::Persistence(source) => Self::Internal(source),
        }
    }
}

impl From<ProjectRepositoryError> for ApiError {
    fn from(err: ProjectRepositoryError) -> Self {
        match err {
            ProjectRepositoryError::NotFound(_) => Self::NotFound,
            ProjectRepositoryError::DuplicateMember { .. } => Self::field(
                "non_field_errors",
                "User is already a member of this project.",
            ),
            ProjectRepositoryError::Persistence(source) => Self::Internal(source),
        }
    }
}

impl From<TopicRepositoryError> for ApiError {
    fn from(err: TopicRepositoryError) -> Self {
        match err {
            TopicRepositoryError::NotFound(_) => Self::NotFound,
            TopicRepositoryError::DuplicateTitle { .. } => Self::field(
                "title",
                "A topic with this title already exists in this project.",
            ),
            TopicRepositoryError::DuplicateTag { .. } => {
                Self::field("name", "This tag already exists on this topic.")
            }
            TopicRepositoryError::Persistence(source) => Self::Internal(source),
        }
    }
}

impl From<IdeaRepositoryError> for ApiError {
    fn from(err: IdeaRepositoryError) -> Self {
        match err {
            IdeaRepositoryError::NotFound(_) => Self::NotFound,
            IdeaRepositoryError::DuplicateMember { .. } => {
                Self::field("non_field_errors", "User is already a member of this idea")
            }
            IdeaRepositoryError::Persistence(source) => Self::Internal(source),
        }
    }
}

impl From<TaskRepositoryError> for ApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(_) => Self::NotFound,
            TaskRepositoryError::Persistence(source) => Self::Internal(source),
        }
    }
}

impl From<AccountDomainError> for ApiError {
    fn from(err: AccountDomainError) -> Self {
        match err {
            AccountDomainError::InvalidEmail(_) => {
                Self::field("email", "Enter a valid email address.")
            }
            AccountDomainError::PasswordTooShort(min) => Self::field(
                "password",
                format!("This password is too short. It must contain at least {min} characters."),
            ),
            AccountDomainError::PasswordMismatch => {
                Self::field("password", "Password fields didn't match.")
            }
            AccountDomainError::Field(field) => Self::Field(field),
        }
    }
}

impl From<ProjectDomainError> for ApiError {
    fn from(err: ProjectDomainError) -> Self {
        match err {
            ProjectDomainError::Field(field) => Self::Field(field),
            ProjectDomainError::ForeignParentComment { .. } => {
                Self::field("parent", "Parent comment must belong to the same topic.")
            }
        }
    }
}

impl From<IdeaDomainError> for ApiError {
    fn from(err: IdeaDomainError) -> Self {
        match err {
            IdeaDomainError::Field(field) => Self::Field(field),
        }
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        match err {
            TaskDomainError::Field(field) => Self::Field(field),
            TaskDomainError::ForeignParentComment { .. } => {
                Self::field("parent", "Parent comment must belong to the same task.")
            }
        }
    }
}

fn missing(what: &str) -> ApiError {
    tracing::debug!(what, "child record not found");
    ApiError::NotFound
}

impl From<AccountServiceError> for ApiError {
    fn from(err: AccountServiceError) -> Self {
        match err {
            AccountServiceError::Domain(inner) => inner.into(),
            AccountServiceError::Repository(inner) => inner.into(),
            AccountServiceError::Credential(inner) => inner.into(),
            AccountServiceError::EmailTaken(_) => {
                Self::field("email", "A user with this email already exists.")
            }
            AccountServiceError::InvalidCredentials => {
                Self::field("non_field_errors", "Invalid email or password.")
            }
            AccountServiceError::AccountDisabled => {
                Self::field("non_field_errors", "User account is disabled.")
            }
            AccountServiceError::UnknownUser(_) => Self::NotFound,
        }
    }
}

impl From<ProjectServiceError> for ApiError {
    fn from(err: ProjectServiceError) -> Self {
        match err {
            ProjectServiceError::Domain(inner) => inner.into(),
            ProjectServiceError::Repository(inner) => inner.into(),
            ProjectServiceError::Blob(inner) => inner.into(),
            ProjectServiceError::Access(inner) => inner.into(),
            ProjectServiceError::NotFound(what) => missing(what),
            ProjectServiceError::Validation(field) => Self::Field(field),
        }
    }
}

impl From<TopicServiceError> for ApiError {
    fn from(err: TopicServiceError) -> Self {
        match err {
            TopicServiceError::Domain(inner) => inner.into(),
            TopicServiceError::Repository(inner) => inner.into(),
            TopicServiceError::Project(inner) => inner.into(),
            TopicServiceError::Blob(inner) => inner.into(),
            TopicServiceError::Access(inner) => inner.into(),
            TopicServiceError::NotFound(what) => missing(what),
            TopicServiceError::Validation(field) => Self::Field(field),
            TopicServiceError::NotAuthor => {
                Self::Forbidden("You can only edit your own comments.".to_owned())
            }
        }
    }
}

impl From<IdeaServiceError> for ApiError {
    fn from(err: IdeaServiceError) -> Self {
        match err {
            IdeaServiceError::Domain(inner) => inner.into(),
            IdeaServiceError::Repository(inner) => inner.into(),
            IdeaServiceError::Project(inner) => inner.into(),
            IdeaServiceError::Access(inner) => inner.into(),
            IdeaServiceError::NotFound(what) => missing(what),
            IdeaServiceError::Validation(field) => Self::Field(field),
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Domain(inner) => inner.into(),
            TaskServiceError::Repository(inner) => inner.into(),
            TaskServiceError::Project(inner) => inner.into(),
            TaskServiceError::Idea(inner) => inner.into(),
            TaskServiceError::Blob(inner) => inner.into(),
            TaskServiceError::Access(inner) => inner.into(),
            TaskServiceError::NotFound(what) => missing(what),
            TaskServiceError::Validation(field) => Self::Field(field),
            TaskServiceError::NotAuthor => {
                Self::Forbidden("You can only edit your own comments.".to_owned())
            }
            TaskServiceError::NotCreator => {
                Self::Forbidden("You can only change templates you created.".to_owned())
            }
        }
    }
}
