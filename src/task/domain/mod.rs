//! Domain model for tasks, task lists and their collaboration records.

mod activity;
mod content;
mod error;
mod filter;
mod hours;
mod ids;
mod list;
mod task;
mod template;

pub use activity::{ActivityAction, ActivityEntry, TaskActivity, describe_changes};
pub use content::{TaskAttachment, TaskComment, TaskTimeLog, TimeLogChanges};
pub use error::{ParseHoursError, TaskDomainError};
pub use filter::{AssigneeFilter, ContextFilter, DueFilter, ListScope, TaskFilter, TaskScope};
pub use hours::{Hours, format_hundredths};
pub use ids::{
    TaskActivityId, TaskAttachmentId, TaskCommentId, TaskId, TaskListId, TaskTemplateId,
    TimeLogId,
};
pub use list::{TaskList, TaskListChanges, TaskListCounts};
pub use task::{
    ContextType, NewTask, PersistedTaskData, RelationChanges, Task, TaskChanges, TaskCounts,
    TaskPriority, TaskStatus, context_display,
};
pub use template::{NewTemplate, TaskTemplate, TemplateChanges, TemplateVars};
