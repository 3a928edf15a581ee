//! Role resolution for ideas.

use crate::access::{AccessRole, IDEA_POLICY, Permissions};
use crate::account::domain::UserId;
use crate::idea::{
    domain::{Idea, IdeaId},
    ports::{IdeaRepository, IdeaRepositoryResult},
};

/// An idea together with the role the caller holds on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaGrant {
    /// The idea.
    pub idea: Idea,
    /// Caller's effective role.
    pub role: AccessRole,
}

impl IdeaGrant {
    /// Expands the role into the permission flags shown to clients.
    #[must_use]
    pub const fn permissions(&self) -> Permissions {
        IDEA_POLICY.permissions(self.role)
    }
}

/// Resolves the role `user` holds on `idea`.
///
/// # Errors
///
/// Returns the repository error when the membership lookup fails.
pub async fn idea_role<R>(
    repository: &R,
    idea: &Idea,
    user: UserId,
) -> IdeaRepositoryResult<Option<AccessRole>>
where
    R: IdeaRepository + ?Sized,
{
    if idea.is_owned_by(user) {
        return Ok(Some(AccessRole::Owner));
    }
    let membership = repository.find_membership(idea.id(), user).await?;
    Ok(AccessRole::resolve(false, membership.map(|row| row.role)))
}

/// Loads idea `id` with the caller's role, or `None` when the idea does not
/// exist or the caller holds no role on it.
///
/// # Errors
///
/// Returns the repository error when a lookup fails.
pub async fn resolve_idea_grant<R>(
    repository: &R,
    id: IdeaId,
    user: UserId,
) -> IdeaRepositoryResult<Option<IdeaGrant>>
where
    R: IdeaRepository + ?Sized,
{
    let Some(idea) = repository.find_by_id(id).await? else {
        return Ok(None);
    };
    let role = idea_role(repository, &idea, user).await?;
    Ok(role.map(|held| IdeaGrant { idea, role: held }))
}
