//! Repository port for ideas, their collaborators, notes and resources.

use crate::account::domain::UserId;
use crate::idea::domain::{
    Idea, IdeaCounts, IdeaFilter, IdeaId, IdeaMembership, IdeaMembershipId, IdeaNote, IdeaNoteId,
    IdeaResource, IdeaResourceId,
};
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for idea repository operations.
pub type IdeaRepositoryResult<T> = Result<T, IdeaRepositoryError>;

/// Idea persistence contract.
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    /// Stores a new idea together with its project links.
    async fn store(&self, idea: &Idea) -> IdeaRepositoryResult<()>;

    /// Persists changes to an existing idea, replacing its project links.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaRepositoryError::NotFound`] when the idea does not
    /// exist.
    async fn update(&self, idea: &Idea) -> IdeaRepositoryResult<()>;

    /// Finds an idea by identifier.
    async fn find_by_id(&self, id: IdeaId) -> IdeaRepositoryResult<Option<Idea>>;

    /// Returns the ideas `user` owns or collaborates on that pass `filter`,
    /// most recently updated first and without duplicates.
    async fn list_for_user(
        &self,
        user: UserId,
        filter: &IdeaFilter,
    ) -> IdeaRepositoryResult<Vec<Idea>>;

    /// Deletes an idea with its memberships, notes, resources and project
    /// links.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaRepositoryError::NotFound`] when the idea does not
    /// exist.
    async fn delete_idea(&self, id: IdeaId) -> IdeaRepositoryResult<()>;

    /// Removes every idea link to `project`.
    async fn detach_project(&self, project: ProjectId) -> IdeaRepositoryResult<()>;

    /// Counts the child records of an idea.
    async fn counts(&self, id: IdeaId) -> IdeaRepositoryResult<IdeaCounts>;

    /// Inserts a membership.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaRepositoryError::DuplicateMember`] when the user
    /// already collaborates on the idea.
    async fn save_membership(&self, membership: &IdeaMembership) -> IdeaRepositoryResult<()>;

    /// Finds the membership of `user` on `idea`.
    async fn find_membership(
        &self,
        idea: IdeaId,
        user: UserId,
    ) -> IdeaRepositoryResult<Option<IdeaMembership>>;

    /// Lists the memberships of an idea, newest first.
    async fn list_memberships(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaMembership>>;

    /// Deletes a membership; unknown identifiers are ignored.
    async fn delete_membership(&self, id: IdeaMembershipId) -> IdeaRepositoryResult<()>;

    /// Inserts or replaces a note.
    async fn save_note(&self, note: &IdeaNote) -> IdeaRepositoryResult<()>;

    /// Finds a note by identifier.
    async fn find_note(&self, id: IdeaNoteId) -> IdeaRepositoryResult<Option<IdeaNote>>;

    /// Lists the notes of an idea, newest first.
    async fn list_notes(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaNote>>;

    /// Deletes a note.
    async fn delete_note(&self, id: IdeaNoteId) -> IdeaRepositoryResult<()>;

    /// Inserts or replaces a resource.
    async fn save_resource(&self, resource: &IdeaResource) -> IdeaRepositoryResult<()>;

    /// Finds a resource by identifier.
    async fn find_resource(&self, id: IdeaResourceId)
    -> IdeaRepositoryResult<Option<IdeaResource>>;

    /// Lists the resources of an idea, newest first.
    async fn list_resources(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaResource>>;

    /// Deletes a resource.
    async fn delete_resource(&self, id: IdeaResourceId) -> IdeaRepositoryResult<()>;
}

/// Errors returned by idea repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IdeaRepositoryError {
    /// The idea was not found.
    #[error("idea not found: {0}")]
    NotFound(IdeaId),

    /// The user already collaborates on the idea.
    #[error("user {user} is already a member of idea {idea}")]
    DuplicateMember {
        /// Idea the membership targets.
        idea: IdeaId,
        /// Collaborator.
        user: UserId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdeaRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
