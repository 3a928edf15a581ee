//! Comments, attachments and time logs recorded on a task.

use super::{Hours, TaskAttachmentId, TaskCommentId, TaskDomainError, TaskId, TimeLogId};
use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::shared::{FieldError, optional_text, required_text};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;

const MAX_COMMENT_CHARS: usize = 10_000;
const MAX_FILE_NAME_CHARS: usize = 255;
const MAX_FILE_TYPE_CHARS: usize = 100;
const MAX_LOG_DESCRIPTION_CHARS: usize = 5_000;
/// Smallest loggable amount, 0.10 hours.
const MIN_LOG_HUNDREDTHS: u32 = 10;

/// Comment on a task; replies point at their parent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskComment {
    /// Comment identifier.
    pub id: TaskCommentId,
    /// Task commented on.
    pub task_id: TaskId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub content: String,
    /// Parent comment for replies.
    pub parent: Option<TaskCommentId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskComment {
    /// Creates a comment, optionally replying to `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ForeignParentComment`] when `parent`
    /// belongs to another task, and [`TaskDomainError::Field`] for blank
    /// content.
    pub fn new(
        task_id: TaskId,
        author: UserId,
        content: String,
        parent: Option<&Self>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if let Some(parent_comment) = parent
            && parent_comment.task_id != task_id
        {
            return Err(TaskDomainError::ForeignParentComment {
                parent: parent_comment.id,
                task: task_id,
            });
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskCommentId::new(),
            task_id,
            author,
            content: required_text("content", content, MAX_COMMENT_CHARS)?,
            parent: parent.map(|comment| comment.id),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Replaces the body text.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for blank content.
    pub fn edit(&mut self, content: String, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.content = required_text("content", content, MAX_COMMENT_CHARS)?;
        self.updated_at = clock.utc();
        Ok(())
    }
}

/// File attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskAttachment {
    /// Attachment identifier.
    pub id: TaskAttachmentId,
    /// Task the file is attached to.
    pub task_id: TaskId,
    /// Stored content metadata.
    pub file: StoredFile,
    /// Uploader.
    pub uploaded_by: UserId,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl TaskAttachment {
    /// Checks the client-supplied name and type before any bytes are
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for a blank or oversized file
    /// name, or an oversized content type.
    pub fn check_upload(
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<(), TaskDomainError> {
        required_text("file", file_name, MAX_FILE_NAME_CHARS)?;
        optional_text("file_type", content_type.unwrap_or_default(), MAX_FILE_TYPE_CHARS)?;
        Ok(())
    }

    /// Records stored content as an attachment of `task_id`.
    #[must_use]
    pub fn new(task_id: TaskId, file: StoredFile, uploaded_by: UserId, clock: &impl Clock) -> Self {
        Self {
            id: TaskAttachmentId::new(),
            task_id,
            file,
            uploaded_by,
            uploaded_at: clock.utc(),
        }
    }
}

/// Time spent on a task by one user on one day.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskTimeLog {
    /// Entry identifier.
    pub id: TimeLogId,
    /// Task worked on.
    pub task_id: TaskId,
    /// User who logged the time.
    pub user: UserId,
    /// What was done.
    pub description: String,
    /// Time spent, at least 0.10 hours.
    pub hours: Hours,
    /// Day the work happened.
    pub date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Partial update of a time log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeLogChanges {
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub hours: Option<Hours>,
    /// New day.
    pub date: Option<NaiveDate>,
}

fn loggable(hours: Hours) -> Result<Hours, FieldError> {
    if hours.hundredths() < MIN_LOG_HUNDREDTHS {
        return Err(FieldError::new(
            "hours",
            "Ensure this value is greater than or equal to 0.1.",
        ));
    }
    Ok(hours)
}

impl TaskTimeLog {
    /// Creates a time log entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for less than 0.10 hours or an
    /// oversized description.
    pub fn new(
        task_id: TaskId,
        user: UserId,
        description: String,
        hours: Hours,
        date: NaiveDate,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id: TimeLogId::new(),
            task_id,
            user,
            description: optional_text("description", description, MAX_LOG_DESCRIPTION_CHARS)?,
            hours: loggable(hours)?,
            date,
            created_at: clock.utc(),
        })
    }

    /// Applies a partial update, validating every field first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for invalid values.
    pub fn apply(&mut self, changes: TimeLogChanges) -> Result<(), TaskDomainError> {
        let description = changes
            .description
            .map(|value| optional_text("description", value, MAX_LOG_DESCRIPTION_CHARS))
            .transpose()?;
        let hours = changes.hours.map(loggable).transpose()?;
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = hours {
            self.hours = value;
        }
        if let Some(value) = changes.date {
            self.date = value;
        }
        Ok(())
    }
}
