//! Task aggregate root.

use super::{Hours, TaskDomainError, TaskId, TaskList, TaskListId};
use crate::access::AccessRole;
use crate::account::domain::UserId;
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::shared::{FieldError, Tags, choice_enum, optional_text, required_text};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 10_000;

choice_enum! {
    /// Workflow status of a task.
    #[derive(Default)]
    TaskStatus, field = "status" {
        /// Not started; the default.
        #[default]
        Todo => "todo",
        /// Being worked on.
        InProgress => "in_progress",
        /// Awaiting review.
        InReview => "in_review",
        /// Finished.
        Done => "done",
        /// Waiting on something else.
        Blocked => "blocked",
        /// Abandoned.
        Cancelled => "cancelled",
    }
}

impl TaskStatus {
    /// Returns `true` for statuses that no longer count as open work.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

choice_enum! {
    /// Relative urgency of a task.
    #[derive(Default)]
    TaskPriority, field = "priority" {
        /// Can wait.
        Low => "low",
        /// The default.
        #[default]
        Medium => "medium",
        /// Important.
        High => "high",
        /// Needs attention now.
        Urgent => "urgent",
    }
}

choice_enum! {
    /// Where a task lives.
    ContextType, field = "context" {
        /// Belongs to both a project and an idea.
        ProjectIdea => "project_idea",
        /// Belongs to a project.
        Project => "project",
        /// Belongs to an idea.
        Idea => "idea",
        /// Personal task outside any project or idea.
        Standalone => "standalone",
    }
}

/// Human-readable context label built from the context titles.
#[must_use]
pub fn context_display(project: Option<&str>, idea: Option<&str>) -> String {
    match (project, idea) {
        (Some(project_title), Some(idea_title)) => {
            format!("Project: {project_title} | Idea: {idea_title}")
        }
        (Some(project_title), None) => format!("Project: {project_title}"),
        (None, Some(idea_title)) => format!("Idea: {idea_title}"),
        (None, None) => "Personal Task".to_owned(),
    }
}

/// Input for creating a task; relations are attached afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: String,
    /// Initial status.
    pub status: TaskStatus,
    /// Initial priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional start date.
    pub start_date: Option<DateTime<Utc>>,
    /// Optional estimate.
    pub estimated_hours: Option<Hours>,
    /// Comma-separated tags.
    pub tags: String,
    /// Initial assignee.
    pub assignee: Option<UserId>,
}

impl NewTask {
    /// Creates input with a title and defaults otherwise.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a task's own fields.
///
/// Outer `None` leaves a field unchanged; `Some(None)` clears an optional
/// one. Relations to other records are changed through [`RelationChanges`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New or cleared due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared start date.
    pub start_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared estimate.
    pub estimated_hours: Option<Option<Hours>>,
    /// New comma-separated tags.
    pub tags: Option<String>,
    /// New or cleared assignee.
    pub assignee: Option<Option<UserId>>,
}

/// Requested changes to a task's relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationChanges {
    /// New or cleared project.
    pub project: Option<Option<ProjectId>>,
    /// New or cleared idea.
    pub idea: Option<Option<IdeaId>>,
    /// New or cleared task list.
    pub task_list: Option<Option<TaskListId>>,
    /// New or cleared parent task.
    pub parent_task: Option<Option<TaskId>>,
    /// Replacement dependency set.
    pub dependencies: Option<Vec<TaskId>>,
}

impl RelationChanges {
    /// Returns `true` when no relation is touched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.project.is_none()
            && self.idea.is_none()
            && self.task_list.is_none()
            && self.parent_task.is_none()
            && self.dependencies.is_none()
    }
}

/// Subtask and content counts for one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    /// Direct subtasks.
    pub subtasks: usize,
    /// Direct subtasks that are done.
    pub completed_subtasks: usize,
    /// Comments, replies included.
    pub comments: usize,
    /// Attachments.
    pub attachments: usize,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    project: Option<ProjectId>,
    idea: Option<IdeaId>,
    task_list: Option<TaskListId>,
    assignee: Option<UserId>,
    created_by: UserId,
    parent_task: Option<TaskId>,
    dependencies: Vec<TaskId>,
    due_date: Option<DateTime<Utc>>,
    start_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    estimated_hours: Option<Hours>,
    actual_hours: Option<Hours>,
    position: u32,
    tags: Tags,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Owning project.
    pub project: Option<ProjectId>,
    /// Owning idea.
    pub idea: Option<IdeaId>,
    /// Containing list.
    pub task_list: Option<TaskListId>,
    /// Assignee.
    pub assignee: Option<UserId>,
    /// Creator.
    pub created_by: UserId,
    /// Parent task.
    pub parent_task: Option<TaskId>,
    /// Tasks this one waits on.
    pub dependencies: Vec<TaskId>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Estimate.
    pub estimated_hours: Option<Hours>,
    /// Logged time.
    pub actual_hours: Option<Hours>,
    /// Position inside its list.
    pub position: u32,
    /// Tags.
    pub tags: Tags,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a standalone task owned by `created_by`.
    ///
    /// A task created as done is stamped complete immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for a blank title or oversized
    /// values.
    pub fn create(
        input: NewTask,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title: required_text("title", input.title, MAX_TITLE_CHARS)?,
            description: optional_text("description", input.description, MAX_DESCRIPTION_CHARS)?,
            status: input.status,
            priority: input.priority,
            project: None,
            idea: None,
            task_list: None,
            assignee: input.assignee,
            created_by,
            parent_task: None,
            dependencies: Vec::new(),
            due_date: input.due_date,
            start_date: input.start_date,
            completed_at: (input.status == TaskStatus::Done).then_some(timestamp),
            estimated_hours: input.estimated_hours,
            actual_hours: None,
            position: 0,
            tags: Tags::parse("tags", &input.tags)?,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let mut task = Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            project: data.project,
            idea: data.idea,
            task_list: data.task_list,
            assignee: data.assignee,
            created_by: data.created_by,
            parent_task: data.parent_task,
            dependencies: Vec::new(),
            due_date: data.due_date,
            start_date: data.start_date,
            completed_at: data.completed_at,
            estimated_hours: data.estimated_hours,
            actual_hours: data.actual_hours,
            position: data.position,
            tags: data.tags,
            created_at: data.created_at,
            updated_at: data.updated_at,
        };
        task.store_dependencies(data.dependencies);
        task
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Returns the owning idea.
    #[must_use]
    pub const fn idea(&self) -> Option<IdeaId> {
        self.idea
    }

    /// Returns the containing list.
    #[must_use]
    pub const fn task_list(&self) -> Option<TaskListId> {
        self.task_list
    }

    /// Returns the assignee.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the parent task.
    #[must_use]
    pub const fn parent_task(&self) -> Option<TaskId> {
        self.parent_task
    }

    /// Returns the tasks this one depends on, in ascending identifier order.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the start date.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the estimate.
    #[must_use]
    pub const fn estimated_hours(&self) -> Option<Hours> {
        self.estimated_hours
    }

    /// Returns the logged time.
    #[must_use]
    pub const fn actual_hours(&self) -> Option<Hours> {
        self.actual_hours
    }

    /// Returns the position inside its list.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Classifies the task by the contexts it belongs to.
    #[must_use]
    pub const fn context_type(&self) -> ContextType {
        match (self.project.is_some(), self.idea.is_some()) {
            (true, true) => ContextType::ProjectIdea,
            (true, false) => ContextType::Project,
            (false, true) => ContextType::Idea,
            (false, false) => ContextType::Standalone,
        }
    }

    /// Role `user` holds through the task itself rather than a context.
    ///
    /// The creator of a standalone task acts as its owner; an assignee
    /// always acts as a contributor. Placing a task into a project or idea
    /// never consults this role.
    #[must_use]
    pub fn personal_role(&self, user: UserId) -> Option<AccessRole> {
        if self.context_type() == ContextType::Standalone && self.created_by == user {
            return Some(AccessRole::Owner);
        }
        (self.assignee == Some(user)).then_some(AccessRole::Contributor)
    }

    /// Returns `true` when the due date has passed and the task is still
    /// open.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_closed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Completion percentage from subtasks, or 0/100 by status for a leaf.
    #[must_use]
    pub fn progress_percentage(&self, counts: &TaskCounts) -> u8 {
        if counts.subtasks == 0 {
            return if self.status == TaskStatus::Done { 100 } else { 0 };
        }
        let percent = counts
            .completed_subtasks
            .saturating_mul(100)
            .checked_div(counts.subtasks)
            .unwrap_or_default();
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Returns `true` when `search` occurs in the title, description or
    /// tags, ignoring case.
    #[must_use]
    pub fn mentions(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        [
            self.title.as_str(),
            self.description.as_str(),
            self.tags.to_csv().as_str(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    /// Applies a partial update of the task's own fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for invalid values; the task is
    /// left unchanged in that case.
    pub fn apply(
        &mut self,
        changes: TaskChanges,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let title = changes
            .title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let description = changes
            .description
            .map(|value| optional_text("description", value, MAX_DESCRIPTION_CHARS))
            .transpose()?;
        let tags = changes
            .tags
            .map(|raw| Tags::parse("tags", &raw))
            .transpose()?;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = tags {
            self.tags = value;
        }
        if let Some(value) = changes.priority {
            self.priority = value;
        }
        if let Some(value) = changes.due_date {
            self.due_date = value;
        }
        if let Some(value) = changes.start_date {
            self.start_date = value;
        }
        if let Some(value) = changes.estimated_hours {
            self.estimated_hours = value;
        }
        if let Some(value) = changes.assignee {
            self.assignee = value;
        }
        if let Some(value) = changes.status {
            self.set_status(value, clock);
        }
        self.touch(clock);
        Ok(())
    }

    /// Moves the task to `status`, stamping or clearing `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus, clock: &impl Clock) {
        if status == TaskStatus::Done && self.completed_at.is_none() {
            self.completed_at = Some(clock.utc());
        }
        if status != TaskStatus::Done {
            self.completed_at = None;
        }
        self.status = status;
        self.touch(clock);
    }

    /// Replaces the priority.
    pub fn set_priority(&mut self, priority: TaskPriority, clock: &impl Clock) {
        self.priority = priority;
        self.touch(clock);
    }

    /// Replaces the assignee.
    pub fn assign(&mut self, assignee: Option<UserId>, clock: &impl Clock) {
        self.assignee = assignee;
        self.touch(clock);
    }

    /// Replaces the tags.
    pub fn set_tags(&mut self, tags: Tags, clock: &impl Clock) {
        self.tags = tags;
        self.touch(clock);
    }

    /// Places the task in the given contexts.
    ///
    /// The containing list is dropped when it no longer matches the new
    /// project.
    pub fn set_context(
        &mut self,
        project: Option<ProjectId>,
        idea: Option<IdeaId>,
        clock: &impl Clock,
    ) {
        if self.project != project {
            self.task_list = None;
        }
        self.project = project;
        self.idea = idea;
        self.touch(clock);
    }

    /// Moves the task into `list`, or out of any list.
    ///
    /// A task without a project inherits the list's project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] when the list belongs to another
    /// project than the task.
    pub fn place_in(
        &mut self,
        list: Option<&TaskList>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let Some(target) = list else {
            self.task_list = None;
            self.touch(clock);
            return Ok(());
        };
        match (self.project, target.project) {
            (Some(own), Some(owner)) if own == owner => {}
            (None, inherited) => self.project = inherited,
            _ => {
                return Err(FieldError::new(
                    "task_list_id",
                    "Task list must belong to the same project as the task.",
                )
                .into());
            }
        }
        self.task_list = Some(target.id);
        self.touch(clock);
        Ok(())
    }

    /// Sets or clears the parent task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] when the task would parent itself.
    pub fn set_parent(
        &mut self,
        parent: Option<TaskId>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if parent == Some(self.id) {
            return Err(
                FieldError::new("parent_task_id", "A task cannot be its own parent.").into(),
            );
        }
        self.parent_task = parent;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the dependency set.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] when the task would depend on
    /// itself.
    pub fn set_dependencies(
        &mut self,
        dependencies: Vec<TaskId>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if dependencies.contains(&self.id) {
            return Err(
                FieldError::new("dependency_ids", "A task cannot depend on itself.").into(),
            );
        }
        self.store_dependencies(dependencies);
        self.touch(clock);
        Ok(())
    }

    /// Drops `dependency` from the set, returning `true` when it was there.
    pub fn forget_dependency(&mut self, dependency: TaskId) -> bool {
        let before = self.dependencies.len();
        self.dependencies.retain(|held| *held != dependency);
        before != self.dependencies.len()
    }

    /// Records the total of the task's time logs.
    pub fn set_actual_hours(&mut self, total: Option<Hours>, clock: &impl Clock) {
        self.actual_hours = total;
        self.touch(clock);
    }

    /// Sets the position inside the containing list.
    pub const fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn store_dependencies(&mut self, mut dependencies: Vec<TaskId>) {
        dependencies.sort_unstable();
        dependencies.dedup();
        self.dependencies = dependencies;
    }
}
