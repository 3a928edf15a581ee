//! Application services for tasks, task lists and templates.

mod access;
mod lists;
mod records;
mod tasks;
mod templates;

pub use access::{IdeaRef, ProjectRef, TaskContext, TaskGrant, context_role, grant_for};
pub use lists::{NewTaskList, TaskListOverview};
pub use records::{NewTimeLog, TaskCommentThread};
pub use tasks::{
    BulkAction, CompleteOutcome, ContextCounts, TaskDashboard, TaskDetail, TaskOverview,
    TaskService, TaskServiceError, TaskServiceResult, TaskStats, TaskSummaryCounts,
};
pub use templates::TemplateTarget;
