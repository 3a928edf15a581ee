//! Repository port for projects and their team, files, links and activity
//! log.

use crate::account::domain::UserId;
use crate::project::domain::{
    MembershipId, Project, ProjectActivity, ProjectFile, ProjectFileId, ProjectId, ProjectLink,
    ProjectLinkId, ProjectMembership,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project repository operations.
pub type ProjectRepositoryResult<T> = Result<T, ProjectRepositoryError>;

/// Project persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Persists changes to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] when the project does
    /// not exist.
    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>>;

    /// Returns every project `user` owns or is a member of, most recently
    /// updated first and without duplicates.
    async fn list_for_user(&self, user: UserId) -> ProjectRepositoryResult<Vec<Project>>;

    /// Deletes a project together with its memberships, files, links,
    /// activity log and topics.
    ///
    /// Returns the storage keys of every removed file and topic media item
    /// so the caller can release the content.
    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<Vec<String>>;

    /// Inserts or replaces a membership.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::DuplicateMember`] when another
    /// membership exists for the same `(project, user)` pair.
    async fn save_membership(&self, membership: &ProjectMembership)
    -> ProjectRepositoryResult<()>;

    /// Finds the membership of `user` on `project`.
    async fn find_membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> ProjectRepositoryResult<Option<ProjectMembership>>;

    /// Finds a membership by identifier.
    async fn find_membership_by_id(
        &self,
        id: MembershipId,
    ) -> ProjectRepositoryResult<Option<ProjectMembership>>;

    /// Lists the memberships of a project, oldest first.
    async fn list_memberships(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectMembership>>;

    /// Deletes a membership; unknown identifiers are ignored.
    async fn delete_membership(&self, id: MembershipId) -> ProjectRepositoryResult<()>;

    /// Inserts or replaces a file record.
    async fn save_file(&self, file: &ProjectFile) -> ProjectRepositoryResult<()>;

    /// Finds a file record by identifier.
    async fn find_file(&self, id: ProjectFileId) -> ProjectRepositoryResult<Option<ProjectFile>>;

    /// Lists the files of a project, newest first.
    async fn list_files(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<ProjectFile>>;

    /// Deletes a file record.
    async fn delete_file(&self, id: ProjectFileId) -> ProjectRepositoryResult<()>;

    /// Inserts or replaces a link.
    async fn save_link(&self, link: &ProjectLink) -> ProjectRepositoryResult<()>;

    /// Finds a link by identifier.
    async fn find_link(&self, id: ProjectLinkId) -> ProjectRepositoryResult<Option<ProjectLink>>;

    /// Lists the links of a project, newest first.
    async fn list_links(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<ProjectLink>>;

    /// Deletes a link.
    async fn delete_link(&self, id: ProjectLinkId) -> ProjectRepositoryResult<()>;

    /// Appends an activity log entry.
    async fn record_activity(&self, activity: &ProjectActivity) -> ProjectRepositoryResult<()>;

    /// Lists the activity log of a project, newest first.
    async fn list_activities(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectActivity>>;
}

/// Errors returned by project repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectRepositoryError {
    /// The project was not found.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// The user already holds a membership on the project.
    #[error("user {user} is already a member of project {project}")]
    DuplicateMember {
        /// Project the membership targets.
        project: ProjectId,
        /// Member.
        user: UserId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
