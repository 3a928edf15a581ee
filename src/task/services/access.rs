//! Role resolution for tasks.
//!
//! A task borrows its role from the project and idea it belongs to, and
//! standalone work falls back to the creator and assignee. The strongest of
//! these wins.

use super::tasks::TaskServiceResult;
use crate::access::{AccessRole, Permissions, TASK_POLICY};
use crate::account::domain::UserId;
use crate::idea::{
    domain::{Idea, IdeaId},
    ports::IdeaRepository,
    services::idea_role,
};
use crate::project::{
    domain::{Project, ProjectId},
    ports::ProjectRepository,
    services::project_role,
};
use crate::task::domain::{Task, context_display};

/// Project reference shown alongside a task.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectRef {
    /// Project identifier.
    pub id: ProjectId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
}

impl ProjectRef {
    fn of(project: &Project) -> Self {
        Self {
            id: project.id(),
            title: project.title().to_owned(),
            description: project.description().to_owned(),
        }
    }
}

/// Idea reference shown alongside a task.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IdeaRef {
    /// Idea identifier.
    pub id: IdeaId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
}

impl IdeaRef {
    fn of(idea: &Idea) -> Self {
        Self {
            id: idea.id(),
            title: idea.title().to_owned(),
            description: idea.description().to_owned(),
        }
    }
}

/// The project and idea a task belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskContext {
    /// Owning project.
    pub project: Option<ProjectRef>,
    /// Owning idea.
    pub idea: Option<IdeaRef>,
}

impl TaskContext {
    /// Human-readable label, e.g. `Project: Apollo | Idea: Lander`.
    #[must_use]
    pub fn display(&self) -> String {
        context_display(
            self.project.as_ref().map(|project| project.title.as_str()),
            self.idea.as_ref().map(|idea| idea.title.as_str()),
        )
    }
}

/// A task together with the role the caller holds on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGrant {
    /// The task.
    pub task: Task,
    /// Caller's effective role.
    pub role: AccessRole,
    /// Project and idea the task belongs to.
    pub context: TaskContext,
}

impl TaskGrant {
    /// Expands the role into the permission flags shown to clients.
    #[must_use]
    pub const fn permissions(&self) -> Permissions {
        TASK_POLICY.permissions(self.role)
    }
}

/// Resolves the role `user` holds on `task`, or `None` when the task is
/// not visible to them.
///
/// # Errors
///
/// Returns the repository error when a project or idea lookup fails.
pub async fn grant_for<P, I>(
    projects: &P,
    ideas: &I,
    task: Task,
    user: UserId,
) -> TaskServiceResult<Option<TaskGrant>>
where
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
{
    let (held, context) = context_access(projects, ideas, &task, user).await?;
    let role = AccessRole::strongest(task.personal_role(user), held);
    Ok(role.map(|found| TaskGrant {
        task,
        role: found,
        context,
    }))
}

/// Role `user` holds through the task's project and idea alone, ignoring
/// creator and assignee roles.
///
/// # Errors
///
/// Returns the repository error when a project or idea lookup fails.
pub async fn context_role<P, I>(
    projects: &P,
    ideas: &I,
    task: &Task,
    user: UserId,
) -> TaskServiceResult<Option<AccessRole>>
where
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
{
    Ok(context_access(projects, ideas, task, user).await?.0)
}

async fn context_access<P, I>(
    projects: &P,
    ideas: &I,
    task: &Task,
    user: UserId,
) -> TaskServiceResult<(Option<AccessRole>, TaskContext)>
where
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
{
    let mut role = None;
    let mut context = TaskContext::default();
    if let Some(project_id) = task.project()
        && let Some(project) = projects.find_by_id(project_id).await?
    {
        role = AccessRole::strongest(role, project_role(projects, &project, user).await?);
        context.project = Some(ProjectRef::of(&project));
    }
    if let Some(idea_id) = task.idea()
        && let Some(idea) = ideas.find_by_id(idea_id).await?
    {
        role = AccessRole::strongest(role, idea_role(ideas, &idea, user).await?);
        context.idea = Some(IdeaRef::of(&idea));
    }
    Ok((role, context))
}
