//! Listing scopes and query filters for tasks.

use super::{ContextType, Task, TaskListId, TaskPriority, TaskStatus};
use crate::account::domain::UserId;
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::shared::choice_enum;
use chrono::{DateTime, Duration, Utc};

/// Set of tasks a listing starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Tasks the user created or is assigned to.
    Personal(UserId),
    /// Tasks of a project.
    Project(ProjectId),
    /// Tasks of an idea.
    Idea(IdeaId),
    /// Tasks inside a list.
    List(TaskListId),
}

/// Set of lists a listing starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Lists of a project.
    Project(ProjectId),
    /// Personal lists created by the user.
    Personal(UserId),
}

/// Assignee criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeFilter {
    /// Assigned to the caller.
    Me,
    /// Nobody assigned.
    Unassigned,
    /// Assigned to this user.
    User(UserId),
}

choice_enum! {
    /// Context criterion.
    ContextFilter, field = "context" {
        /// Any task with a project.
        Project => "project",
        /// Any task with an idea.
        Idea => "idea",
        /// Tasks with neither.
        Standalone => "standalone",
    }
}

choice_enum! {
    /// Due date criterion.
    DueFilter, field = "due" {
        /// Due date passed while still open.
        Overdue => "overdue",
        /// Due on the current UTC day.
        Today => "today",
        /// Due within the next seven days.
        Week => "week",
    }
}

/// Optional narrowing of a task listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    pub priority: Option<TaskPriority>,
    /// Assignee criterion.
    pub assignee: Option<AssigneeFilter>,
    /// Context criterion.
    pub context: Option<ContextFilter>,
    /// Case-insensitive search over title, description and tags.
    pub search: Option<String>,
    /// Due date criterion.
    pub due: Option<DueFilter>,
}

impl TaskFilter {
    /// Returns `true` when `task` passes every criterion for `caller` at
    /// `now`.
    #[must_use]
    pub fn matches(&self, task: &Task, caller: UserId, now: DateTime<Utc>) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self.priority.is_none_or(|priority| task.priority() == priority)
            && self.assignee.is_none_or(|criterion| match criterion {
                AssigneeFilter::Me => task.assignee() == Some(caller),
                AssigneeFilter::Unassigned => task.assignee().is_none(),
                AssigneeFilter::User(user) => task.assignee() == Some(user),
            })
            && self.context.is_none_or(|criterion| match criterion {
                ContextFilter::Project => task.project().is_some(),
                ContextFilter::Idea => task.idea().is_some(),
                ContextFilter::Standalone => task.context_type() == ContextType::Standalone,
            })
            && self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .is_none_or(|term| task.mentions(term))
            && self.due.is_none_or(|criterion| due_matches(criterion, task, now))
    }
}

fn due_matches(criterion: DueFilter, task: &Task, now: DateTime<Utc>) -> bool {
    match criterion {
        DueFilter::Overdue => task.is_overdue(now),
        DueFilter::Today => task
            .due_date()
            .is_some_and(|due| due.date_naive() == now.date_naive()),
        DueFilter::Week => task
            .due_date()
            .is_some_and(|due| due >= now && due <= now + Duration::days(7)),
    }
}
