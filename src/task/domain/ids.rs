//! Identifier types for the task domain.

use crate::shared::uuid_id;

uuid_id! {
    /// Unique identifier for a task.
    TaskId
}

uuid_id! {
    /// Unique identifier for a task list.
    TaskListId
}

uuid_id! {
    /// Unique identifier for a task comment.
    TaskCommentId
}

uuid_id! {
    /// Unique identifier for a task attachment.
    TaskAttachmentId
}

uuid_id! {
    /// Unique identifier for a task activity entry.
    TaskActivityId
}

uuid_id! {
    /// Unique identifier for a time log entry.
    TimeLogId
}

uuid_id! {
    /// Unique identifier for a task template.
    TaskTemplateId
}
