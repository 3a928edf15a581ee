//! Diesel row models for tasks.

use super::schema::{
    task_activities, task_attachments, task_comments, task_dependencies, task_lists,
    task_templates, task_time_logs, tasks,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Task record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status string.
    pub status: String,
    /// Priority string.
    pub priority: String,
    /// Owning project.
    pub project_id: Option<Uuid>,
    /// Owning idea.
    pub idea_id: Option<Uuid>,
    /// Containing list.
    pub task_list_id: Option<Uuid>,
    /// Assignee.
    pub assignee_id: Option<Uuid>,
    /// Creator.
    pub created_by: Uuid,
    /// Parent task.
    pub parent_task_id: Option<Uuid>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Estimate in hundredths.
    pub estimated_hundredths: Option<i32>,
    /// Logged time in hundredths.
    pub actual_hundredths: Option<i32>,
    /// List position.
    pub position: i32,
    /// Comma-separated tags.
    pub tags: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Dependency edge.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskDependencyRow {
    /// Waiting task.
    pub task_id: Uuid,
    /// Task waited on.
    pub depends_on_id: Uuid,
}

/// Task list record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskListRow {
    /// List identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Option<Uuid>,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Ordering key.
    pub position: i32,
    /// Creator.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// History entry record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskActivityRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Action string.
    pub action: String,
    /// Summary.
    pub description: String,
    /// Previous value.
    pub old_value: String,
    /// New value.
    pub new_value: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Comment record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskCommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Uuid,
    /// Author.
    pub author_id: Uuid,
    /// Body.
    pub content: String,
    /// Parent comment.
    pub parent_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Attachment record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_attachments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskAttachmentRow {
    /// Attachment identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Uuid,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Blob storage key.
    pub storage_key: String,
    /// Content digest.
    pub sha256: String,
    /// Uploader.
    pub uploaded_by: Uuid,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Time log record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_time_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskTimeLogRow {
    /// Log identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Uuid,
    /// Logging user.
    pub user_id: Uuid,
    /// Description.
    pub description: String,
    /// Hours in hundredths.
    pub hundredths: i32,
    /// Day of the work.
    pub work_date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Template record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskTemplateRow {
    /// Template identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Title source.
    pub title_template: String,
    /// Description source.
    pub description_template: String,
    /// Priority string.
    pub priority: String,
    /// Estimate in hundredths.
    pub estimated_hundredths: Option<i32>,
    /// Comma-separated tags.
    pub tags: String,
    /// Author.
    pub created_by: Uuid,
    /// Visibility flag.
    pub is_public: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
