//! Role resolution for projects, shared with every context that hangs work
//! off a project.

use crate::access::{AccessRole, PROJECT_POLICY, Permissions};
use crate::account::domain::UserId;
use crate::project::{
    domain::{Project, ProjectId},
    ports::{ProjectRepository, ProjectRepositoryResult},
};

/// A project together with the role the caller holds on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGrant {
    /// The project.
    pub project: Project,
    /// Caller's effective role.
    pub role: AccessRole,
}

impl ProjectGrant {
    /// Expands the role into the permission flags shown to clients.
    #[must_use]
    pub const fn permissions(&self) -> Permissions {
        PROJECT_POLICY.permissions(self.role)
    }
}

/// Resolves the role `user` holds on `project`.
///
/// # Errors
///
/// Returns the repository error when the membership lookup fails.
pub async fn project_role<R>(
    repository: &R,
    project: &Project,
    user: UserId,
) -> ProjectRepositoryResult<Option<AccessRole>>
where
    R: ProjectRepository + ?Sized,
{
    if project.is_owned_by(user) {
        return Ok(Some(AccessRole::Owner));
    }
    let membership = repository.find_membership(project.id(), user).await?;
    Ok(AccessRole::resolve(false, membership.map(|row| row.role)))
}

/// Loads project `id` with the caller's role, or `None` when the project
/// does not exist or the caller holds no role on it.
///
/// # Errors
///
/// Returns the repository error when a lookup fails.
pub async fn resolve_project_grant<R>(
    repository: &R,
    id: ProjectId,
    user: UserId,
) -> ProjectRepositoryResult<Option<ProjectGrant>>
where
    R: ProjectRepository + ?Sized,
{
    let Some(project) = repository.find_by_id(id).await? else {
        return Ok(None);
    };
    let role = project_role(repository, &project, user).await?;
    Ok(role.map(|held| ProjectGrant {
        project,
        role: held,
    }))
}
