//! Repository port for tasks, task lists, templates and the records hung
//! off a task.

use crate::account::domain::UserId;
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::task::domain::{
    ListScope, Task, TaskActivity, TaskAttachment, TaskAttachmentId, TaskComment, TaskCommentId,
    TaskCounts, TaskId, TaskList, TaskListCounts, TaskListId, TaskScope, TaskTemplate,
    TaskTemplateId, TaskTimeLog, TimeLogId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its dependencies.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task, replacing its dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists several task changes and their history in one unit: either
    /// everything is written or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when any task does not
    /// exist.
    async fn update_batch(
        &self,
        tasks: &[Task],
        activities: &[TaskActivity],
    ) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds every existing task among `ids`.
    async fn find_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>>;

    /// Lists the tasks in `scope` ordered by position, then creation time.
    async fn list(&self, scope: TaskScope) -> TaskRepositoryResult<Vec<Task>>;

    /// Lists the direct subtasks of `parent`.
    async fn subtasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Lists the tasks that depend on `task`.
    async fn dependents(&self, task: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts subtasks, comments and attachments of a task.
    async fn counts(&self, id: TaskId) -> TaskRepositoryResult<TaskCounts>;

    /// Deletes tasks and their subtasks with all of their records and
    /// dependency edges.
    ///
    /// Returns the storage keys of the removed attachments.
    async fn delete_tasks(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<String>>;

    /// Deletes every task and task list of a project.
    ///
    /// Returns the storage keys of the removed attachments.
    async fn purge_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<String>>;

    /// Deletes every task of an idea.
    ///
    /// Returns the storage keys of the removed attachments.
    async fn purge_idea(&self, idea: IdeaId) -> TaskRepositoryResult<Vec<String>>;

    /// Inserts or replaces a task list.
    async fn save_list(&self, list: &TaskList) -> TaskRepositoryResult<()>;

    /// Finds a task list by identifier.
    async fn find_list(&self, id: TaskListId) -> TaskRepositoryResult<Option<TaskList>>;

    /// Lists task lists ordered by position, then creation time.
    async fn list_lists(&self, scope: ListScope) -> TaskRepositoryResult<Vec<TaskList>>;

    /// Counts the tasks in a list.
    async fn list_counts(&self, id: TaskListId) -> TaskRepositoryResult<TaskListCounts>;

    /// Deletes a task list and the tasks inside it.
    ///
    /// Returns the storage keys of the removed attachments.
    async fn delete_list(&self, id: TaskListId) -> TaskRepositoryResult<Vec<String>>;

    /// Sets each listed task's position to its index in `order`; tasks
    /// outside `list` are skipped.
    async fn reorder(&self, list: TaskListId, order: &[TaskId]) -> TaskRepositoryResult<()>;

    /// Appends a history entry.
    async fn record_activity(&self, activity: &TaskActivity) -> TaskRepositoryResult<()>;

    /// Lists a task's history, newest first.
    async fn list_activities(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskActivity>>;

    /// Inserts or replaces a comment.
    async fn save_comment(&self, comment: &TaskComment) -> TaskRepositoryResult<()>;

    /// Finds a comment by identifier.
    async fn find_comment(&self, id: TaskCommentId) -> TaskRepositoryResult<Option<TaskComment>>;

    /// Lists every comment on a task, oldest first.
    async fn list_comments(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskComment>>;

    /// Deletes a comment and its replies.
    async fn delete_comment(&self, id: TaskCommentId) -> TaskRepositoryResult<()>;

    /// Stores an attachment record.
    async fn save_attachment(&self, attachment: &TaskAttachment) -> TaskRepositoryResult<()>;

    /// Finds an attachment by identifier.
    async fn find_attachment(
        &self,
        id: TaskAttachmentId,
    ) -> TaskRepositoryResult<Option<TaskAttachment>>;

    /// Lists a task's attachments, newest first.
    async fn list_attachments(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskAttachment>>;

    /// Deletes an attachment record.
    async fn delete_attachment(&self, id: TaskAttachmentId) -> TaskRepositoryResult<()>;

    /// Inserts or replaces a time log.
    async fn save_time_log(&self, log: &TaskTimeLog) -> TaskRepositoryResult<()>;

    /// Finds a time log by identifier.
    async fn find_time_log(&self, id: TimeLogId) -> TaskRepositoryResult<Option<TaskTimeLog>>;

    /// Lists a task's time logs, latest day first.
    async fn list_time_logs(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskTimeLog>>;

    /// Deletes a time log.
    async fn delete_time_log(&self, id: TimeLogId) -> TaskRepositoryResult<()>;

    /// Inserts or replaces a template.
    async fn save_template(&self, template: &TaskTemplate) -> TaskRepositoryResult<()>;

    /// Finds a template by identifier.
    async fn find_template(&self, id: TaskTemplateId)
    -> TaskRepositoryResult<Option<TaskTemplate>>;

    /// Lists the templates `user` created plus every public template, by
    /// name.
    async fn list_templates(&self, user: UserId) -> TaskRepositoryResult<Vec<TaskTemplate>>;

    /// Deletes a template.
    async fn delete_template(&self, id: TaskTemplateId) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
