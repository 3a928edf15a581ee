//! Task lifecycle, relations, bulk changes and reporting.

use super::access::{TaskGrant, context_role, grant_for};
use crate::access::{AccessError, Action, TASK_POLICY};
use crate::account::domain::UserId;
use crate::blob::ports::{BlobStore, BlobStoreError};
use crate::idea::{
    domain::IdeaId,
    ports::{IdeaRepository, IdeaRepositoryError},
    services::resolve_idea_grant,
};
use crate::project::{
    domain::ProjectId,
    ports::{ProjectRepository, ProjectRepositoryError},
    services::resolve_project_grant,
};
use crate::shared::{FieldError, Tags};
use crate::task::{
    domain::{
        ActivityAction, ActivityEntry, ContextType, NewTask, RelationChanges, Task, TaskActivity,
        TaskChanges, TaskCounts, TaskDomainError, TaskFilter, TaskId, TaskListId, TaskPriority,
        TaskScope, TaskStatus, describe_changes, format_hundredths,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

pub(super) const ATTACHMENT_NAMESPACE: &str = "task_attachments";

/// Number of tasks listed under "recent" on the dashboard.
const RECENT_TASKS: usize = 10;

/// Number of upcoming deadlines listed on the dashboard.
const UPCOMING_DEADLINES: usize = 5;

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Project lookup failed.
    #[error(transparent)]
    Project(#[from] ProjectRepositoryError),
    /// Idea lookup failed.
    #[error(transparent)]
    Idea(#[from] IdeaRepositoryError),
    /// Blob storage failed.
    #[error(transparent)]
    Blob(#[from] BlobStoreError),
    /// The caller may not perform the action.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// A child record does not exist within the task.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request conflicts with existing state.
    #[error(transparent)]
    Validation(FieldError),
    /// Only the author may change a comment.
    #[error("only the author may change this comment")]
    NotAuthor,
    /// Only the creator may change a template.
    #[error("only the creator may change this template")]
    NotCreator,
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOverview {
    /// Task with the caller's role.
    pub grant: TaskGrant,
    /// Child record counts.
    pub counts: TaskCounts,
}

impl TaskOverview {
    /// Completion percentage derived from subtasks or status.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.grant.task.progress_percentage(&self.counts)
    }
}

/// Task with its related work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetail {
    /// The task itself.
    pub overview: TaskOverview,
    /// Parent task, when set and visible.
    pub parent: Option<TaskOverview>,
    /// Visible direct subtasks.
    pub subtasks: Vec<TaskOverview>,
    /// Visible tasks this one waits on.
    pub dependencies: Vec<TaskOverview>,
    /// Visible tasks waiting on this one.
    pub dependents: Vec<TaskOverview>,
    /// Visible dependencies that are not done yet.
    pub blocked_dependencies: Vec<TaskOverview>,
    /// Every dependency is done.
    pub can_start: bool,
    /// Sum of all time logs, e.g. `"3.50"`.
    pub total_time_logged: String,
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// The task was marked done.
    Completed(TaskGrant),
    /// The task was already done; nothing changed.
    AlreadyDone,
}

/// Per-status counts of the caller's own tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummaryCounts {
    /// All tasks.
    pub total: usize,
    /// Not started.
    pub todo: usize,
    /// Being worked on.
    pub in_progress: usize,
    /// Finished.
    pub done: usize,
    /// Past their due date and still open.
    pub overdue: usize,
}

/// Task counts per context kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextCounts {
    /// Tasks in a project.
    pub project_tasks: usize,
    /// Tasks in an idea.
    pub idea_tasks: usize,
    /// Tasks in neither.
    pub standalone_tasks: usize,
}

impl ContextCounts {
    fn tally<'a>(tasks: impl Iterator<Item = &'a Task> + Clone) -> Self {
        Self {
            project_tasks: tasks.clone().filter(|task| task.project().is_some()).count(),
            idea_tasks: tasks.clone().filter(|task| task.idea().is_some()).count(),
            standalone_tasks: tasks
                .filter(|task| task.context_type() == ContextType::Standalone)
                .count(),
        }
    }
}

/// The caller's personal task dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDashboard {
    /// Status counts.
    pub my_tasks_summary: TaskSummaryCounts,
    /// Context counts.
    pub by_context: ContextCounts,
    /// Most recently changed tasks.
    pub recent_tasks: Vec<TaskOverview>,
    /// Open tasks with the nearest due dates.
    pub upcoming_deadlines: Vec<TaskOverview>,
}

/// Task statistics over one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Label of the scope, e.g. `Project: Apollo`.
    pub context: String,
    /// All visible tasks in the scope.
    pub total_tasks: usize,
    /// Count for every status, including empty ones.
    pub by_status: BTreeMap<&'static str, usize>,
    /// Count for every priority, including empty ones.
    pub by_priority: BTreeMap<&'static str, usize>,
    /// Context counts.
    pub by_context: ContextCounts,
    /// Tasks past their due date and still open.
    pub overdue_tasks: usize,
    /// Total logged hours, e.g. `"12.75"`.
    pub total_time_logged: String,
}

/// Change applied to every task of a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    /// Set the status.
    UpdateStatus(TaskStatus),
    /// Set the priority.
    UpdatePriority(TaskPriority),
    /// Assign to a user.
    UpdateAssignee(UserId),
    /// Move into a list.
    UpdateTaskList(TaskListId),
    /// Add tags.
    AddTags(Tags),
    /// Remove tags.
    RemoveTags(Tags),
    /// Delete the tasks.
    Delete,
}

impl BulkAction {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UpdateStatus(_) => "update_status",
            Self::UpdatePriority(_) => "update_priority",
            Self::UpdateAssignee(_) => "update_assignee",
            Self::UpdateTaskList(_) => "update_task_list",
            Self::AddTags(_) => "add_tags",
            Self::RemoveTags(_) => "remove_tags",
            Self::Delete => "delete",
        }
    }
}

pub(super) fn authorized(
    grant: Option<TaskGrant>,
    action: Action,
) -> TaskServiceResult<TaskGrant> {
    TASK_POLICY.authorize(grant.as_ref().map(|found| found.role), action)?;
    grant.ok_or(TaskServiceError::Access(AccessError::NotVisible))
}

/// Creators may always delete their own tasks; everyone else needs the
/// delete permission.
fn authorize_delete(grant: &TaskGrant, caller: UserId) -> Result<(), AccessError> {
    if grant.task.created_by() == caller {
        return Ok(());
    }
    TASK_POLICY.authorize(Some(grant.role), Action::Delete)?;
    Ok(())
}

fn total_hours<'a>(tasks: impl Iterator<Item = &'a Task>) -> String {
    let hundredths: u64 = tasks
        .filter_map(Task::actual_hours)
        .map(|hours| u64::from(hours.hundredths()))
        .sum();
    format_hundredths(hundredths)
}

fn titles(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(Task::title)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Task orchestration service.
pub struct TaskService<T, P, I, B, C>
where
    T: TaskRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    pub(super) tasks: Arc<T>,
    pub(super) projects: Arc<P>,
    pub(super) ideas: Arc<I>,
    pub(super) blobs: Arc<B>,
    pub(super) clock: Arc<C>,
}

impl<T, P, I, B, C> Clone for TaskService<T, P, I, B, C>
where
    T: TaskRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            projects: Arc::clone(&self.projects),
            ideas: Arc::clone(&self.ideas),
            blobs: Arc::clone(&self.blobs),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, P, I, B, C> TaskService<T, P, I, B, C>
where
    T: TaskRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(
        tasks: Arc<T>,
        projects: Arc<P>,
        ideas: Arc<I>,
        blobs: Arc<B>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            projects,
            ideas,
            blobs,
            clock,
        }
    }

    /// Loads a task and authorises `action` for `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] when the task does not exist or
    /// the caller holds no role, and [`AccessError::Forbidden`] when the role
    /// is too low.
    pub async fn authorize(
        &self,
        caller: UserId,
        id: TaskId,
        action: Action,
    ) -> TaskServiceResult<TaskGrant> {
        let grant = match self.tasks.find_by_id(id).await? {
            Some(task) => self.grant(caller, task).await?,
            None => None,
        };
        authorized(grant, action)
    }

    /// Lists the visible tasks in `scope` that pass `filter`, ordered by
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] when the scope itself is hidden
    /// from the caller.
    pub async fn list(
        &self,
        caller: UserId,
        scope: TaskScope,
        filter: &TaskFilter,
    ) -> TaskServiceResult<Vec<TaskOverview>> {
        self.scope_label(caller, scope).await?;
        let now = self.clock.utc();
        let candidates: Vec<Task> = self
            .tasks
            .list(scope)
            .await?
            .into_iter()
            .filter(|task| filter.matches(task, caller, now))
            .collect();
        self.overviews(caller, candidates).await
    }

    /// Creates a task and places it in the requested contexts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] when a referenced project,
    /// idea, list or task is not visible or a relation would form a cycle,
    /// and [`AccessError::Forbidden`] when the caller may not contribute to
    /// the chosen context. An assignee without a role on that context is a
    /// validation error.
    pub async fn create(
        &self,
        caller: UserId,
        input: NewTask,
        relations: RelationChanges,
    ) -> TaskServiceResult<TaskGrant> {
        let mut task = Task::create(input, caller, &*self.clock)?;
        self.relate(caller, &mut task, relations).await?;
        self.check_placement(caller, None, &task).await?;
        let grant = authorized(self.grant(caller, task).await?, Action::Contribute)?;
        self.tasks.store(&grant.task).await?;
        let mut entries = vec![ActivityEntry::note(
            ActivityAction::Created,
            format!(
                "Task \"{}\" was created in {}",
                grant.task.title(),
                grant.context.display()
            ),
        )];
        entries.extend(
            self.dependency_entries(&[], grant.task.dependencies())
                .await?,
        );
        for activity in self.record(grant.task.id(), entries, caller) {
            self.tasks.record_activity(&activity).await?;
        }
        tracing::info!(task_id = %grant.task.id(), creator = %caller, "created task");
        Ok(grant)
    }

    /// Returns a task with its subtasks, dependencies and dependents.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn detail(&self, caller: UserId, id: TaskId) -> TaskServiceResult<TaskDetail> {
        let grant = self.authorize(caller, id, Action::View).await?;
        let parent = match grant.task.parent_task() {
            Some(parent_id) => self
                .overviews(caller, self.tasks.find_many(&[parent_id]).await?)
                .await?
                .into_iter()
                .next(),
            None => None,
        };
        let subtasks = self
            .overviews(caller, self.tasks.subtasks(id).await?)
            .await?;
        let required = self.tasks.find_many(grant.task.dependencies()).await?;
        let can_start = required
            .iter()
            .all(|dependency| dependency.status() == TaskStatus::Done);
        let dependencies = self.overviews(caller, required).await?;
        let blocked_dependencies = dependencies
            .iter()
            .filter(|dependency| dependency.grant.task.status() != TaskStatus::Done)
            .cloned()
            .collect();
        let dependents = self
            .overviews(caller, self.tasks.dependents(id).await?)
            .await?;
        let logged: u64 = self
            .tasks
            .list_time_logs(id)
            .await?
            .iter()
            .map(|log| u64::from(log.hours.hundredths()))
            .sum();
        Ok(TaskDetail {
            overview: self.overview(grant).await?,
            parent,
            subtasks,
            dependencies,
            dependents,
            blocked_dependencies,
            can_start,
            total_time_logged: format_hundredths(logged),
        })
    }

    /// Applies a partial update and records what changed.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission before and after the change, and
    /// on the destination project or idea when the task moves. Returns
    /// [`TaskServiceError::Domain`] or [`TaskServiceError::Validation`] for
    /// invalid values.
    pub async fn update(
        &self,
        caller: UserId,
        id: TaskId,
        changes: TaskChanges,
        relations: RelationChanges,
    ) -> TaskServiceResult<TaskGrant> {
        let before = self.authorize(caller, id, Action::Contribute).await?.task;
        let mut task = before.clone();
        task.apply(changes, &*self.clock)?;
        self.relate(caller, &mut task, relations).await?;
        self.check_placement(caller, Some(&before), &task).await?;
        let updated = authorized(self.grant(caller, task).await?, Action::Contribute)?;
        let mut entries = describe_changes(&before, &updated.task);
        entries.extend(
            self.dependency_entries(before.dependencies(), updated.task.dependencies())
                .await?,
        );
        let activities = self.record(id, entries, caller);
        self.tasks
            .update_batch(std::slice::from_ref(&updated.task), &activities)
            .await?;
        Ok(updated)
    }

    /// Deletes a task together with its subtasks.
    ///
    /// # Errors
    ///
    /// Requires the delete permission unless the caller created the task.
    pub async fn delete(&self, caller: UserId, id: TaskId) -> TaskServiceResult<()> {
        let grant = self.authorize(caller, id, Action::View).await?;
        authorize_delete(&grant, caller)?;
        let keys = self.tasks.delete_tasks(&[id]).await?;
        self.release_blobs(&keys).await;
        tracing::info!(task_id = %id, removed_blobs = keys.len(), "deleted task");
        Ok(())
    }

    /// Marks a task done.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn complete(&self, caller: UserId, id: TaskId) -> TaskServiceResult<CompleteOutcome> {
        let mut grant = self.authorize(caller, id, Action::Contribute).await?;
        let previous = grant.task.status();
        if previous == TaskStatus::Done {
            return Ok(CompleteOutcome::AlreadyDone);
        }
        grant.task.set_status(TaskStatus::Done, &*self.clock);
        let entry = ActivityEntry::change(
            ActivityAction::StatusChanged,
            "Task completed".to_owned(),
            previous.to_string(),
            TaskStatus::Done.to_string(),
        );
        let activities = self.record(id, vec![entry], caller);
        self.tasks
            .update_batch(std::slice::from_ref(&grant.task), &activities)
            .await?;
        Ok(CompleteOutcome::Completed(grant))
    }

    /// Lists a task's history, newest first.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn activities(
        &self,
        caller: UserId,
        id: TaskId,
    ) -> TaskServiceResult<Vec<TaskActivity>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.tasks.list_activities(id).await?)
    }

    /// Summarises the tasks the caller created or is assigned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when lookup fails.
    pub async fn dashboard(&self, caller: UserId) -> TaskServiceResult<TaskDashboard> {
        let own = self.tasks.list(TaskScope::Personal(caller)).await?;
        let grants = self.visible(caller, own).await?;
        let now = self.clock.utc();
        let count = |status: TaskStatus| {
            grants
                .iter()
                .filter(|grant| grant.task.status() == status)
                .count()
        };
        let my_tasks_summary = TaskSummaryCounts {
            total: grants.len(),
            todo: count(TaskStatus::Todo),
            in_progress: count(TaskStatus::InProgress),
            done: count(TaskStatus::Done),
            overdue: grants
                .iter()
                .filter(|grant| grant.task.is_overdue(now))
                .count(),
        };
        let by_context = ContextCounts::tally(grants.iter().map(|grant| &grant.task));
        let mut recent = grants.clone();
        recent.sort_by(|left, right| right.task.updated_at().cmp(&left.task.updated_at()));
        recent.truncate(RECENT_TASKS);
        let mut upcoming: Vec<TaskGrant> = grants
            .into_iter()
            .filter(|grant| {
                grant.task.due_date().is_some()
                    && matches!(
                        grant.task.status(),
                        TaskStatus::Todo | TaskStatus::InProgress | TaskStatus::InReview
                    )
            })
            .collect();
        upcoming.sort_by_key(|grant| grant.task.due_date());
        upcoming.truncate(UPCOMING_DEADLINES);
        Ok(TaskDashboard {
            my_tasks_summary,
            by_context,
            recent_tasks: self.with_counts(recent).await?,
            upcoming_deadlines: self.with_counts(upcoming).await?,
        })
    }

    /// Counts the visible tasks of `scope` by status, priority and context.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] when the scope is hidden from the
    /// caller.
    pub async fn stats(&self, caller: UserId, scope: TaskScope) -> TaskServiceResult<TaskStats> {
        let context = self.scope_label(caller, scope).await?;
        let in_scope = self.tasks.list(scope).await?;
        let grants = self.visible(caller, in_scope).await?;
        let now = self.clock.utc();
        let tasks = || grants.iter().map(|grant| &grant.task);
        let by_status = TaskStatus::ALL
            .iter()
            .map(|status| {
                let matching = tasks().filter(|task| task.status() == *status).count();
                (status.as_str(), matching)
            })
            .collect();
        let by_priority = TaskPriority::ALL
            .iter()
            .map(|priority| {
                let matching = tasks().filter(|task| task.priority() == *priority).count();
                (priority.as_str(), matching)
            })
            .collect();
        Ok(TaskStats {
            context,
            total_tasks: grants.len(),
            by_status,
            by_priority,
            by_context: ContextCounts::tally(tasks()),
            overdue_tasks: tasks().filter(|task| task.is_overdue(now)).count(),
            total_time_logged: total_hours(tasks()),
        })
    }

    /// Applies one change to several tasks at once.
    ///
    /// Every task is authorised before and after the change, all before
    /// anything is written, and the writes happen in one unit. Returns the
    /// number of affected tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for an empty id list and an
    /// access error when any task is hidden or not modifiable.
    pub async fn bulk(
        &self,
        caller: UserId,
        ids: Vec<TaskId>,
        action: BulkAction,
    ) -> TaskServiceResult<usize> {
        let mut unique = ids;
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Err(TaskServiceError::Validation(FieldError::new(
                "task_ids",
                "At least one task ID is required",
            )));
        }
        let found = self.tasks.find_many(&unique).await?;
        if found.len() != unique.len() {
            return Err(AccessError::NotVisible.into());
        }
        let mut grants = Vec::with_capacity(found.len());
        for task in found {
            let grant = authorized(self.grant(caller, task).await?, Action::View)?;
            if action == BulkAction::Delete {
                authorize_delete(&grant, caller)?;
            } else {
                TASK_POLICY.authorize(Some(grant.role), Action::Contribute)?;
            }
            grants.push(grant);
        }
        if action == BulkAction::Delete {
            let keys = self.tasks.delete_tasks(&unique).await?;
            self.release_blobs(&keys).await;
            tracing::info!(count = unique.len(), user = %caller, "bulk deleted tasks");
            return Ok(unique.len());
        }
        let target_list = match &action {
            BulkAction::UpdateTaskList(list_id) => {
                Some(self.referenced_list(caller, *list_id).await?)
            }
            _ => None,
        };
        let mut changed = Vec::with_capacity(grants.len());
        let mut activities = Vec::new();
        for grant in grants {
            let before = grant.task;
            let mut task = before.clone();
            match &action {
                BulkAction::UpdateStatus(status) => task.set_status(*status, &*self.clock),
                BulkAction::UpdatePriority(priority) => task.set_priority(*priority, &*self.clock),
                BulkAction::UpdateAssignee(user) => task.assign(Some(*user), &*self.clock),
                BulkAction::UpdateTaskList(_) => {
                    task.place_in(target_list.as_ref(), &*self.clock)?;
                }
                BulkAction::AddTags(tags) => {
                    task.set_tags(before.tags().merged(tags), &*self.clock);
                }
                BulkAction::RemoveTags(tags) => {
                    task.set_tags(before.tags().without(tags), &*self.clock);
                }
                BulkAction::Delete => {}
            }
            self.check_placement(caller, Some(&before), &task).await?;
            let updated = authorized(self.grant(caller, task).await?, Action::Contribute)?.task;
            let entries = describe_changes(&before, &updated);
            activities.extend(self.record(updated.id(), entries, caller));
            changed.push(updated);
        }
        self.tasks.update_batch(&changed, &activities).await?;
        tracing::info!(
            action = action.as_str(),
            count = changed.len(),
            user = %caller,
            "bulk updated tasks"
        );
        Ok(changed.len())
    }

    /// Deletes every task and task list of a project, used when the project
    /// itself is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the deletion fails.
    pub async fn purge_project(&self, project: ProjectId) -> TaskServiceResult<()> {
        let keys = self.tasks.purge_project(project).await?;
        self.release_blobs(&keys).await;
        Ok(())
    }

    /// Deletes every task of an idea, used when the idea itself is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the deletion fails.
    pub async fn purge_idea(&self, idea: IdeaId) -> TaskServiceResult<()> {
        let keys = self.tasks.purge_idea(idea).await?;
        self.release_blobs(&keys).await;
        Ok(())
    }

    pub(super) async fn grant(
        &self,
        caller: UserId,
        task: Task,
    ) -> TaskServiceResult<Option<TaskGrant>> {
        grant_for(&*self.projects, &*self.ideas, task, caller).await
    }

    async fn visible(&self, caller: UserId, tasks: Vec<Task>) -> TaskServiceResult<Vec<TaskGrant>> {
        let mut grants = Vec::with_capacity(tasks.len());
        for task in tasks {
            if let Some(grant) = self.grant(caller, task).await? {
                grants.push(grant);
            }
        }
        Ok(grants)
    }

    async fn overview(&self, grant: TaskGrant) -> TaskServiceResult<TaskOverview> {
        let counts = self.tasks.counts(grant.task.id()).await?;
        Ok(TaskOverview { grant, counts })
    }

    async fn with_counts(&self, grants: Vec<TaskGrant>) -> TaskServiceResult<Vec<TaskOverview>> {
        let mut overviews = Vec::with_capacity(grants.len());
        for grant in grants {
            overviews.push(self.overview(grant).await?);
        }
        Ok(overviews)
    }

    async fn overviews(
        &self,
        caller: UserId,
        tasks: Vec<Task>,
    ) -> TaskServiceResult<Vec<TaskOverview>> {
        let grants = self.visible(caller, tasks).await?;
        self.with_counts(grants).await
    }

    /// Checks the caller may see `scope` and returns its label.
    async fn scope_label(&self, caller: UserId, scope: TaskScope) -> TaskServiceResult<String> {
        match scope {
            TaskScope::Personal(user) if user == caller => Ok("All Your Tasks".to_owned()),
            TaskScope::Personal(_) => Err(AccessError::NotVisible.into()),
            TaskScope::Project(project) => {
                let grant = resolve_project_grant(&*self.projects, project, caller)
                    .await?
                    .ok_or(TaskServiceError::Access(AccessError::NotVisible))?;
                Ok(format!("Project: {}", grant.project.title()))
            }
            TaskScope::Idea(idea) => {
                let grant = resolve_idea_grant(&*self.ideas, idea, caller)
                    .await?
                    .ok_or(TaskServiceError::Access(AccessError::NotVisible))?;
                Ok(format!("Idea: {}", grant.idea.title()))
            }
            TaskScope::List(list) => {
                let found = self.list_access(caller, list, Action::View).await?;
                Ok(format!("Task list: {}", found.name))
            }
        }
    }

    /// Applies the requested relation changes after checking every
    /// referenced record is visible and no cycle forms.
    async fn relate(
        &self,
        caller: UserId,
        task: &mut Task,
        relations: RelationChanges,
    ) -> TaskServiceResult<()> {
        if relations.project.is_some() || relations.idea.is_some() {
            let project = match relations.project {
                Some(Some(project_id)) => Some(self.referenced_project(caller, project_id).await?),
                Some(None) => None,
                None => task.project(),
            };
            let idea = match relations.idea {
                Some(Some(idea_id)) => Some(self.referenced_idea(caller, idea_id).await?),
                Some(None) => None,
                None => task.idea(),
            };
            task.set_context(project, idea, &*self.clock);
        }
        if let Some(choice) = relations.task_list {
            let list = match choice {
                Some(list_id) => Some(self.referenced_list(caller, list_id).await?),
                None => None,
            };
            task.place_in(list.as_ref(), &*self.clock)?;
        }
        if let Some(choice) = relations.parent_task {
            task.set_parent(choice, &*self.clock)?;
            if let Some(parent) = choice {
                self.referenced_task(caller, parent, "parent_task_id")
                    .await?;
                self.check_parent_chain(task.id(), parent).await?;
            }
        }
        if let Some(dependencies) = relations.dependencies {
            task.set_dependencies(dependencies, &*self.clock)?;
            for dependency in task.dependencies() {
                self.referenced_task(caller, *dependency, "dependency_ids")
                    .await?;
            }
            self.check_dependency_graph(task.id(), task.dependencies())
                .await?;
        }
        Ok(())
    }

    /// Checks that a new or changed task may sit in its project and idea.
    ///
    /// Moving into a context takes the contribute permission there through
    /// the caller's context role alone. An assignee must hold some role on
    /// the context. Standalone tasks are exempt from both checks.
    async fn check_placement(
        &self,
        caller: UserId,
        before: Option<&Task>,
        task: &Task,
    ) -> TaskServiceResult<()> {
        if task.context_type() == ContextType::Standalone {
            return Ok(());
        }
        let moved = before
            .is_none_or(|old| old.project() != task.project() || old.idea() != task.idea());
        if moved {
            let role = context_role(&*self.projects, &*self.ideas, task, caller).await?;
            TASK_POLICY.authorize(role, Action::Contribute)?;
        }
        let reassigned = before.is_none_or(|old| old.assignee() != task.assignee());
        if (moved || reassigned)
            && let Some(assignee) = task.assignee()
            && context_role(&*self.projects, &*self.ideas, task, assignee)
                .await?
                .is_none()
        {
            return Err(TaskServiceError::Validation(FieldError::new(
                "assignee_id",
                "Assignee has no access to this project or idea.",
            )));
        }
        Ok(())
    }

    async fn referenced_project(
        &self,
        caller: UserId,
        id: ProjectId,
    ) -> TaskServiceResult<ProjectId> {
        resolve_project_grant(&*self.projects, id, caller)
            .await?
            .map(|grant| grant.project.id())
            .ok_or_else(|| {
                TaskServiceError::Validation(FieldError::new("project_id", "Project not found."))
            })
    }

    async fn referenced_idea(&self, caller: UserId, id: IdeaId) -> TaskServiceResult<IdeaId> {
        resolve_idea_grant(&*self.ideas, id, caller)
            .await?
            .map(|grant| grant.idea.id())
            .ok_or_else(|| {
                TaskServiceError::Validation(FieldError::new("idea_id", "Idea not found."))
            })
    }

    async fn referenced_task(
        &self,
        caller: UserId,
        id: TaskId,
        field: &'static str,
    ) -> TaskServiceResult<()> {
        let visible = match self.tasks.find_by_id(id).await? {
            Some(task) => self.grant(caller, task).await?.is_some(),
            None => false,
        };
        if visible {
            Ok(())
        } else {
            Err(TaskServiceError::Validation(FieldError::new(
                field,
                "Task not found.",
            )))
        }
    }

    /// Rejects a parent whose own ancestry already contains `task`.
    async fn check_parent_chain(&self, task: TaskId, parent: TaskId) -> TaskServiceResult<()> {
        let mut seen = HashSet::new();
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == task {
                return Err(TaskServiceError::Validation(FieldError::new(
                    "parent_task_id",
                    "Parent task would create a cycle.",
                )));
            }
            if !seen.insert(current) {
                break;
            }
            cursor = self
                .tasks
                .find_by_id(current)
                .await?
                .and_then(|ancestor| ancestor.parent_task());
        }
        Ok(())
    }

    /// Rejects dependencies from which `task` is already reachable.
    async fn check_dependency_graph(
        &self,
        task: TaskId,
        dependencies: &[TaskId],
    ) -> TaskServiceResult<()> {
        let mut seen = HashSet::new();
        let mut pending = dependencies.to_vec();
        while let Some(current) = pending.pop() {
            if current == task {
                return Err(TaskServiceError::Validation(FieldError::new(
                    "dependency_ids",
                    "Dependencies would create a cycle.",
                )));
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(found) = self.tasks.find_by_id(current).await? {
                pending.extend_from_slice(found.dependencies());
            }
        }
        Ok(())
    }

    async fn dependency_entries(
        &self,
        before: &[TaskId],
        after: &[TaskId],
    ) -> TaskServiceResult<Vec<ActivityEntry>> {
        let added: Vec<TaskId> = after
            .iter()
            .copied()
            .filter(|id| !before.contains(id))
            .collect();
        let removed: Vec<TaskId> = before
            .iter()
            .copied()
            .filter(|id| !after.contains(id))
            .collect();
        let mut entries = Vec::new();
        if !added.is_empty() {
            let found = self.tasks.find_many(&added).await?;
            entries.push(ActivityEntry::note(
                ActivityAction::DependencyAdded,
                format!("Dependencies added: {}", titles(&found)),
            ));
        }
        if !removed.is_empty() {
            let found = self.tasks.find_many(&removed).await?;
            entries.push(ActivityEntry::note(
                ActivityAction::DependencyRemoved,
                format!("Dependencies removed: {}", titles(&found)),
            ));
        }
        Ok(entries)
    }

    pub(super) fn record(
        &self,
        task: TaskId,
        entries: Vec<ActivityEntry>,
        caller: UserId,
    ) -> Vec<TaskActivity> {
        entries
            .into_iter()
            .map(|entry| TaskActivity::record(task, entry, caller, &*self.clock))
            .collect()
    }

    pub(super) async fn release_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.blobs.delete(key).await {
                tracing::warn!(storage_key = %key, error = %err, "failed to release blob");
            }
        }
    }
}
