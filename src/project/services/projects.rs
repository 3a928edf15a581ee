//! Project lifecycle, team management, files, links and the activity log.

use super::access::{ProjectGrant, project_role, resolve_project_grant};
use crate::access::{AccessError, AccessRole, Action, MemberRole, PROJECT_POLICY};
use crate::account::domain::{UserId, UserSummary};
use crate::blob::{
    Upload,
    ports::{BlobStore, BlobStoreError},
};
use crate::project::{
    domain::{
        LinkChanges, MembershipId, NewProject, Project, ProjectActivity, ProjectChanges,
        ProjectDomainError, ProjectFile, ProjectFileId, ProjectId, ProjectLink, ProjectLinkId,
        ProjectMembership, ProjectStatus,
    },
    ports::{ProjectRepository, ProjectRepositoryError},
};
use crate::shared::FieldError;
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Blob namespace for project files.
const FILE_NAMESPACE: &str = "project_files";

/// Service-level errors for project operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
    /// Blob storage failed.
    #[error(transparent)]
    Blob(#[from] BlobStoreError),
    /// The caller may not perform the action.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// A child record does not exist within the project.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request conflicts with existing state.
    #[error(transparent)]
    Validation(FieldError),
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project counts by status over the caller's accessible projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    /// All accessible projects.
    pub total_projects: usize,
    /// Projects in progress.
    pub active_projects: usize,
    /// Completed projects.
    pub completed_projects: usize,
    /// Projects on hold.
    pub on_hold_projects: usize,
    /// Projects still in planning.
    pub planning_projects: usize,
}

/// Project orchestration service.
pub struct ProjectService<R, B, C>
where
    R: ProjectRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    blobs: Arc<B>,
    clock: Arc<C>,
}

impl<R, B, C> Clone for ProjectService<R, B, C>
where
    R: ProjectRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            blobs: Arc::clone(&self.blobs),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, B, C> ProjectService<R, B, C>
where
    R: ProjectRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(repository: Arc<R>, blobs: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            repository,
            blobs,
            clock,
        }
    }

    /// Loads a project and authorises `action` for `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] when the project does not exist or
    /// the caller holds no role, and [`AccessError::Forbidden`] when the role
    /// is too low.
    pub async fn authorize(
        &self,
        caller: UserId,
        id: ProjectId,
        action: Action,
    ) -> ProjectServiceResult<ProjectGrant> {
        let grant = resolve_project_grant(&*self.repository, id, caller).await?;
        PROJECT_POLICY.authorize(grant.as_ref().map(|found| found.role), action)?;
        grant.ok_or(ProjectServiceError::Access(AccessError::NotVisible))
    }

    /// Lists the projects the caller owns or belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when lookup fails.
    pub async fn list(&self, caller: UserId) -> ProjectServiceResult<Vec<ProjectGrant>> {
        let projects = self.repository.list_for_user(caller).await?;
        let mut grants = Vec::with_capacity(projects.len());
        for project in projects {
            if let Some(role) = project_role(&*self.repository, &project, caller).await? {
                grants.push(ProjectGrant { project, role });
            }
        }
        Ok(grants)
    }

    /// Creates a project owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] for invalid input.
    pub async fn create(
        &self,
        caller: UserId,
        input: NewProject,
    ) -> ProjectServiceResult<ProjectGrant> {
        let project = Project::create(input, caller, &*self.clock)?;
        self.repository.store(&project).await?;
        self.log(
            project.id(),
            caller,
            "Created project",
            format!("Created project \"{}\"", project.title()),
        )
        .await?;
        tracing::info!(project_id = %project.id(), owner = %caller, "created project");
        Ok(ProjectGrant {
            project,
            role: AccessRole::Owner,
        })
    }

    /// Returns a visible project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Access`] when the project is not
    /// visible to the caller.
    pub async fn get(&self, caller: UserId, id: ProjectId) -> ProjectServiceResult<ProjectGrant> {
        self.authorize(caller, id, Action::View).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Requires the edit permission; returns
    /// [`ProjectServiceError::Domain`] for invalid values.
    pub async fn update(
        &self,
        caller: UserId,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> ProjectServiceResult<ProjectGrant> {
        let mut grant = self.authorize(caller, id, Action::Edit).await?;
        grant.project.apply(changes, &*self.clock)?;
        self.repository.update(&grant.project).await?;
        self.log(id, caller, "Updated project", "Updated project details")
            .await?;
        Ok(grant)
    }

    /// Deletes a project with all of its content and stored files.
    ///
    /// Tasks, task lists and idea links live in other contexts and must be
    /// released by the caller beforehand.
    ///
    /// # Errors
    ///
    /// Requires the delete permission.
    pub async fn delete(&self, caller: UserId, id: ProjectId) -> ProjectServiceResult<()> {
        self.authorize(caller, id, Action::Delete).await?;
        let keys = self.repository.delete_project(id).await?;
        self.release_blobs(&keys).await;
        tracing::info!(project_id = %id, removed_blobs = keys.len(), "deleted project");
        Ok(())
    }

    /// Counts accessible projects by status.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when lookup fails.
    pub async fn stats(&self, caller: UserId) -> ProjectServiceResult<ProjectStats> {
        let projects = self.repository.list_for_user(caller).await?;
        let count = |status: ProjectStatus| {
            projects
                .iter()
                .filter(|project| project.status() == status)
                .count()
        };
        Ok(ProjectStats {
            total_projects: projects.len(),
            active_projects: count(ProjectStatus::InProgress),
            completed_projects: count(ProjectStatus::Completed),
            on_hold_projects: count(ProjectStatus::OnHold),
            planning_projects: count(ProjectStatus::Planning),
        })
    }

    /// Lists the project's members.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn members(
        &self,
        caller: UserId,
        id: ProjectId,
    ) -> ProjectServiceResult<Vec<ProjectMembership>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.repository.list_memberships(id).await?)
    }

    /// Adds `member` to the project with `role`.
    ///
    /// # Errors
    ///
    /// Requires the manage-members permission; returns
    /// [`ProjectServiceError::Validation`] when `member` owns the project or
    /// already belongs to it.
    pub async fn add_member(
        &self,
        caller: UserId,
        id: ProjectId,
        member: &UserSummary,
        role: MemberRole,
    ) -> ProjectServiceResult<ProjectMembership> {
        let grant = self.authorize(caller, id, Action::ManageMembers).await?;
        if grant.project.is_owned_by(member.id) {
            return Err(ProjectServiceError::Validation(FieldError::new(
                "email",
                "Project owner cannot be added as a member.",
            )));
        }
        let membership = ProjectMembership::new(id, member.id, role, &*self.clock);
        self.repository
            .save_membership(&membership)
            .await
            .map_err(|err| match err {
                ProjectRepositoryError::DuplicateMember { .. } => {
                    ProjectServiceError::Validation(FieldError::new(
                        "email",
                        "User is already a member of this project.",
                    ))
                }
                other => ProjectServiceError::Repository(other),
            })?;
        self.log(
            id,
            caller,
            "Added member",
            format!("Added {} as {}", member.email, role.as_str()),
        )
        .await?;
        Ok(membership)
    }

    /// Changes a member's role.
    ///
    /// # Errors
    ///
    /// Requires the manage-members permission; returns
    /// [`ProjectServiceError::NotFound`] for memberships of other projects.
    pub async fn change_member_role(
        &self,
        caller: UserId,
        id: ProjectId,
        membership_id: MembershipId,
        role: MemberRole,
    ) -> ProjectServiceResult<ProjectMembership> {
        self.authorize(caller, id, Action::ManageMembers).await?;
        let mut membership = self.membership_in(id, membership_id).await?;
        let previous = membership.role;
        membership.change_role(role, &*self.clock);
        self.repository.save_membership(&membership).await?;
        self.log(
            id,
            caller,
            "Changed member role",
            format!("Changed role from {} to {}", previous.as_str(), role.as_str()),
        )
        .await?;
        Ok(membership)
    }

    /// Removes a member.
    ///
    /// # Errors
    ///
    /// Requires the manage-members permission.
    pub async fn remove_member(
        &self,
        caller: UserId,
        id: ProjectId,
        membership_id: MembershipId,
    ) -> ProjectServiceResult<()> {
        self.authorize(caller, id, Action::ManageMembers).await?;
        let membership = self.membership_in(id, membership_id).await?;
        self.repository.delete_membership(membership.id).await?;
        self.log(id, caller, "Removed member", "Removed a project member")
            .await?;
        Ok(())
    }

    /// Lists the project's files.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn files(
        &self,
        caller: UserId,
        id: ProjectId,
    ) -> ProjectServiceResult<Vec<ProjectFile>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.repository.list_files(id).await?)
    }

    /// Stores an upload and records it as a project file.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission; returns blob and validation
    /// failures otherwise.
    pub async fn upload_file(
        &self,
        caller: UserId,
        id: ProjectId,
        title: &str,
        description: String,
        upload: Upload,
    ) -> ProjectServiceResult<ProjectFile> {
        self.authorize(caller, id, Action::Contribute).await?;
        let stored = self.blobs.put(FILE_NAMESPACE, upload).await?;
        let key = stored.storage_key.clone();
        let file = match ProjectFile::new(id, title, description, stored, caller, &*self.clock) {
            Ok(file) => file,
            Err(err) => {
                self.release_blobs(&[key]).await;
                return Err(err.into());
            }
        };
        self.repository.save_file(&file).await?;
        self.log(
            id,
            caller,
            "Uploaded file",
            format!("Uploaded \"{}\"", file.title),
        )
        .await?;
        Ok(file)
    }

    /// Returns a file record with its content.
    ///
    /// # Errors
    ///
    /// Requires the view permission; returns
    /// [`ProjectServiceError::NotFound`] when the record or its content is
    /// missing.
    pub async fn download_file(
        &self,
        caller: UserId,
        id: ProjectId,
        file_id: ProjectFileId,
    ) -> ProjectServiceResult<(ProjectFile, Vec<u8>)> {
        self.authorize(caller, id, Action::View).await?;
        let file = self.file_in(id, file_id).await?;
        let bytes = self
            .blobs
            .get(&file.file.storage_key)
            .await?
            .ok_or(ProjectServiceError::NotFound("file content"))?;
        Ok((file, bytes))
    }

    /// Deletes a file record and its content.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete_file(
        &self,
        caller: UserId,
        id: ProjectId,
        file_id: ProjectFileId,
    ) -> ProjectServiceResult<()> {
        self.authorize(caller, id, Action::Edit).await?;
        let file = self.file_in(id, file_id).await?;
        self.repository.delete_file(file.id).await?;
        self.release_blobs(&[file.file.storage_key]).await;
        self.log(
            id,
            caller,
            "Deleted file",
            format!("Deleted \"{}\"", file.title),
        )
        .await?;
        Ok(())
    }

    /// Lists the project's links.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn links(
        &self,
        caller: UserId,
        id: ProjectId,
    ) -> ProjectServiceResult<Vec<ProjectLink>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.repository.list_links(id).await?)
    }

    /// Returns one link.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn link(
        &self,
        caller: UserId,
        id: ProjectId,
        link_id: ProjectLinkId,
    ) -> ProjectServiceResult<ProjectLink> {
        self.authorize(caller, id, Action::View).await?;
        self.link_in(id, link_id).await
    }

    /// Shares a new link.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn create_link(
        &self,
        caller: UserId,
        id: ProjectId,
        title: String,
        url: String,
        description: String,
    ) -> ProjectServiceResult<ProjectLink> {
        self.authorize(caller, id, Action::Contribute).await?;
        let link = ProjectLink::new(id, title, url, description, caller, &*self.clock)?;
        self.repository.save_link(&link).await?;
        self.log(id, caller, "Added link", format!("Added link \"{}\"", link.title))
            .await?;
        Ok(link)
    }

    /// Changes a link.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn update_link(
        &self,
        caller: UserId,
        id: ProjectId,
        link_id: ProjectLinkId,
        changes: LinkChanges,
    ) -> ProjectServiceResult<ProjectLink> {
        self.authorize(caller, id, Action::Edit).await?;
        let mut link = self.link_in(id, link_id).await?;
        link.apply(changes, &*self.clock)?;
        self.repository.save_link(&link).await?;
        self.log(
            id,
            caller,
            "Updated link",
            format!("Updated link \"{}\"", link.title),
        )
        .await?;
        Ok(link)
    }

    /// Deletes a link.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete_link(
        &self,
        caller: UserId,
        id: ProjectId,
        link_id: ProjectLinkId,
    ) -> ProjectServiceResult<()> {
        self.authorize(caller, id, Action::Edit).await?;
        let link = self.link_in(id, link_id).await?;
        self.repository.delete_link(link.id).await?;
        self.log(
            id,
            caller,
            "Deleted link",
            format!("Deleted link \"{}\"", link.title),
        )
        .await?;
        Ok(())
    }

    /// Lists the activity log, newest first.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn activities(
        &self,
        caller: UserId,
        id: ProjectId,
    ) -> ProjectServiceResult<Vec<ProjectActivity>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.repository.list_activities(id).await?)
    }

    /// Adds a manual activity log entry.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn record_activity(
        &self,
        caller: UserId,
        id: ProjectId,
        action: String,
        description: String,
    ) -> ProjectServiceResult<ProjectActivity> {
        self.authorize(caller, id, Action::Edit).await?;
        let activity = ProjectActivity::record(id, caller, action, description, &*self.clock)?;
        self.repository.record_activity(&activity).await?;
        Ok(activity)
    }

    async fn log(
        &self,
        id: ProjectId,
        caller: UserId,
        action: &str,
        description: impl Into<String>,
    ) -> ProjectServiceResult<()> {
        let activity = ProjectActivity::record(id, caller, action, description, &*self.clock)?;
        self.repository.record_activity(&activity).await?;
        Ok(())
    }

    async fn release_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.blobs.delete(key).await {
                tracing::warn!(storage_key = %key, error = %err, "failed to release blob");
            }
        }
    }

    async fn membership_in(
        &self,
        id: ProjectId,
        membership_id: MembershipId,
    ) -> ProjectServiceResult<ProjectMembership> {
        self.repository
            .find_membership_by_id(membership_id)
            .await?
            .filter(|membership| membership.project_id == id)
            .ok_or(ProjectServiceError::NotFound("membership"))
    }

    async fn file_in(
        &self,
        id: ProjectId,
        file_id: ProjectFileId,
    ) -> ProjectServiceResult<ProjectFile> {
        self.repository
            .find_file(file_id)
            .await?
            .filter(|file| file.project_id == id)
            .ok_or(ProjectServiceError::NotFound("file"))
    }

    async fn link_in(
        &self,
        id: ProjectId,
        link_id: ProjectLinkId,
    ) -> ProjectServiceResult<ProjectLink> {
        self.repository
            .find_link(link_id)
            .await?
            .filter(|link| link.project_id == id)
            .ok_or(ProjectServiceError::NotFound("link"))
    }
}
