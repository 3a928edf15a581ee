//! Task list management.

use super::tasks::{TaskService, TaskServiceError, TaskServiceResult};
use crate::access::{AccessError, Action, TASK_POLICY};
use crate::account::domain::UserId;
use crate::blob::ports::BlobStore;
use crate::idea::ports::IdeaRepository;
use crate::project::{domain::ProjectId, ports::ProjectRepository, services::resolve_project_grant};
use crate::shared::FieldError;
use crate::task::{
    domain::{ListScope, TaskId, TaskList, TaskListChanges, TaskListCounts, TaskListId},
    ports::TaskRepository,
};
use mockable::Clock;

/// Task list with its task totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListOverview {
    /// The list.
    pub list: TaskList,
    /// Task totals.
    pub counts: TaskListCounts,
}

/// Input for creating a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTaskList {
    /// Owning project; `None` creates a personal list.
    pub project: Option<ProjectId>,
    /// Name.
    pub name: String,
    /// Optional description.
    pub description: String,
    /// Sort position among sibling lists.
    pub position: u32,
}

impl<T, P, I, B, C> TaskService<T, P, I, B, C>
where
    T: TaskRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Lists the task lists in `scope` with their totals.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] for another user's personal
    /// lists or a project hidden from the caller.
    pub async fn lists(
        &self,
        caller: UserId,
        scope: ListScope,
    ) -> TaskServiceResult<Vec<TaskListOverview>> {
        match scope {
            ListScope::Personal(user) if user != caller => {
                return Err(AccessError::NotVisible.into());
            }
            ListScope::Personal(_) => {}
            ListScope::Project(project) => {
                self.project_access(caller, project, Action::View).await?;
            }
        }
        let lists = self.tasks.list_lists(scope).await?;
        let mut overviews = Vec::with_capacity(lists.len());
        for list in lists {
            overviews.push(self.list_overview(list).await?);
        }
        Ok(overviews)
    }

    /// Creates a project or personal task list.
    ///
    /// # Errors
    ///
    /// A project list requires the edit permission on the project.
    pub async fn create_list(
        &self,
        caller: UserId,
        input: NewTaskList,
    ) -> TaskServiceResult<TaskListOverview> {
        if let Some(project) = input.project {
            self.project_access(caller, project, Action::Edit).await?;
        }
        let list = TaskList::new(
            input.project,
            input.name,
            input.description,
            input.position,
            caller,
            &*self.clock,
        )?;
        self.tasks.save_list(&list).await?;
        tracing::info!(list_id = %list.id, creator = %caller, "created task list");
        Ok(TaskListOverview {
            list,
            counts: TaskListCounts::default(),
        })
    }

    /// Returns one task list.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn get_list(
        &self,
        caller: UserId,
        id: TaskListId,
    ) -> TaskServiceResult<TaskListOverview> {
        let list = self.list_access(caller, id, Action::View).await?;
        self.list_overview(list).await
    }

    /// Renames, describes or repositions a task list.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn update_list(
        &self,
        caller: UserId,
        id: TaskListId,
        changes: TaskListChanges,
    ) -> TaskServiceResult<TaskListOverview> {
        let mut list = self.list_access(caller, id, Action::Edit).await?;
        list.apply(changes, &*self.clock)?;
        self.tasks.save_list(&list).await?;
        self.list_overview(list).await
    }

    /// Deletes a task list with the tasks inside it.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete_list(&self, caller: UserId, id: TaskListId) -> TaskServiceResult<()> {
        self.list_access(caller, id, Action::Edit).await?;
        let keys = self.tasks.delete_list(id).await?;
        self.release_blobs(&keys).await;
        tracing::info!(list_id = %id, user = %caller, "deleted task list");
        Ok(())
    }

    /// Positions the list's tasks in the order given; ids of tasks outside
    /// the list are ignored.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn reorder(
        &self,
        caller: UserId,
        id: TaskListId,
        order: &[TaskId],
    ) -> TaskServiceResult<()> {
        self.list_access(caller, id, Action::Edit).await?;
        self.tasks.reorder(id, order).await?;
        Ok(())
    }

    /// Loads a list and authorises `action` on it.
    ///
    /// Project lists follow the caller's project role; personal lists are
    /// visible to their creator only.
    pub(super) async fn list_access(
        &self,
        caller: UserId,
        id: TaskListId,
        action: Action,
    ) -> TaskServiceResult<TaskList> {
        let list = self
            .tasks
            .find_list(id)
            .await?
            .ok_or(TaskServiceError::Access(AccessError::NotVisible))?;
        match list.project {
            Some(project) => self.project_access(caller, project, action).await?,
            None if list.created_by == caller => {}
            None => return Err(AccessError::NotVisible.into()),
        }
        Ok(list)
    }

    /// Loads a list named in a request body; a hidden list reads as
    /// missing.
    pub(super) async fn referenced_list(
        &self,
        caller: UserId,
        id: TaskListId,
    ) -> TaskServiceResult<TaskList> {
        match self.list_access(caller, id, Action::View).await {
            Err(TaskServiceError::Access(_)) => Err(TaskServiceError::Validation(FieldError::new(
                "task_list_id",
                "Task list not found.",
            ))),
            other => other,
        }
    }

    async fn project_access(
        &self,
        caller: UserId,
        project: ProjectId,
        action: Action,
    ) -> TaskServiceResult<()> {
        let grant = resolve_project_grant(&*self.projects, project, caller).await?;
        TASK_POLICY.authorize(grant.map(|found| found.role), action)?;
        Ok(())
    }

    async fn list_overview(&self, list: TaskList) -> TaskServiceResult<TaskListOverview> {
        let counts = self.tasks.list_counts(list.id).await?;
        Ok(TaskListOverview { list, counts })
    }
}
