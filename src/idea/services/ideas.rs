//! Idea lifecycle, collaborators, notes and resources.

use super::access::{IdeaGrant, idea_role, resolve_idea_grant};
use crate::access::{AccessError, AccessRole, Action, IDEA_POLICY, MemberRole};
use crate::account::domain::{UserId, UserSummary};
use crate::idea::{
    domain::{
        Idea, IdeaChanges, IdeaCounts, IdeaDomainError, IdeaFilter, IdeaId, IdeaMembership,
        IdeaNote, IdeaNoteId, IdeaPriority, IdeaResource, IdeaResourceId, IdeaStatus, NewIdea,
        ResourceChanges, ResourceType,
    },
    ports::{IdeaRepository, IdeaRepositoryError},
};
use crate::project::{
    domain::{Project, ProjectId},
    ports::{ProjectRepository, ProjectRepositoryError},
    services::resolve_project_grant,
};
use crate::shared::FieldError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Number of ideas listed under "recent" in the statistics.
const RECENT_IDEAS: usize = 5;

/// Service-level errors for idea operations.
#[derive(Debug, Error)]
pub enum IdeaServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdeaDomainError),
    /// Idea repository operation failed.
    #[error(transparent)]
    Repository(#[from] IdeaRepositoryError),
    /// Project lookup failed.
    #[error(transparent)]
    Project(#[from] ProjectRepositoryError),
    /// The caller may not perform the action.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// A child record does not exist within the idea.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request conflicts with existing state.
    #[error(transparent)]
    Validation(FieldError),
}

/// Result type for idea service operations.
pub type IdeaServiceResult<T> = Result<T, IdeaServiceError>;

/// Idea as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaOverview {
    /// Idea with the caller's role.
    pub grant: IdeaGrant,
    /// Child record counts.
    pub counts: IdeaCounts,
}

/// Idea with every child record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaDetail {
    /// Idea with the caller's role.
    pub grant: IdeaGrant,
    /// Child record counts.
    pub counts: IdeaCounts,
    /// Linked projects the caller can see.
    pub projects: Vec<Project>,
    /// Notes, newest first.
    pub notes: Vec<IdeaNote>,
    /// Resources, newest first.
    pub resources: Vec<IdeaResource>,
    /// Collaborators, newest first.
    pub members: Vec<IdeaMembership>,
}

/// Entry in the recent-ideas list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentIdea {
    /// Idea identifier.
    pub id: IdeaId,
    /// Title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Idea counts over the caller's accessible ideas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdeaStats {
    /// All accessible ideas.
    pub total_ideas: usize,
    /// Count for every status, including empty ones.
    pub by_status: BTreeMap<&'static str, usize>,
    /// Count for every priority, including empty ones.
    pub by_priority: BTreeMap<&'static str, usize>,
    /// Most recently updated ideas.
    pub recent_ideas: Vec<RecentIdea>,
}

impl IdeaStats {
    fn tally(ideas: &[Idea]) -> Self {
        let by_status = IdeaStatus::ALL
            .iter()
            .map(|status| {
                let count = ideas.iter().filter(|idea| idea.status() == *status).count();
                (status.as_str(), count)
            })
            .collect();
        let by_priority = IdeaPriority::ALL
            .iter()
            .map(|priority| {
                let count = ideas
                    .iter()
                    .filter(|idea| idea.priority() == *priority)
                    .count();
                (priority.as_str(), count)
            })
            .collect();
        Self {
            total_ideas: ideas.len(),
            by_status,
            by_priority,
            recent_ideas: ideas
                .iter()
                .take(RECENT_IDEAS)
                .map(|idea| RecentIdea {
                    id: idea.id(),
                    title: idea.title().to_owned(),
                    created_at: idea.created_at(),
                })
                .collect(),
        }
    }
}

fn duplicate_member(err: IdeaRepositoryError) -> IdeaServiceError {
    match err {
        IdeaRepositoryError::DuplicateMember { .. } => IdeaServiceError::Validation(
            FieldError::new("non_field_errors", "User is already a member of this idea."),
        ),
        other => IdeaServiceError::Repository(other),
    }
}

/// Authors may change their own notes and resources; everyone else needs
/// the edit permission.
fn authorize_author(grant: &IdeaGrant, author: UserId, caller: UserId) -> Result<(), AccessError> {
    if author == caller {
        return Ok(());
    }
    IDEA_POLICY.authorize(Some(grant.role), Action::Edit)?;
    Ok(())
}

/// Idea orchestration service.
pub struct IdeaService<I, P, C>
where
    I: IdeaRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    C: Clock + Send + Sync,
{
    ideas: Arc<I>,
    projects: Arc<P>,
    clock: Arc<C>,
}

impl<I, P, C> Clone for IdeaService<I, P, C>
where
    I: IdeaRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            ideas: Arc::clone(&self.ideas),
            projects: Arc::clone(&self.projects),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<I, P, C> IdeaService<I, P, C>
where
    I: IdeaRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new idea service.
    #[must_use]
    pub const fn new(ideas: Arc<I>, projects: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            ideas,
            projects,
            clock,
        }
    }

    /// Loads an idea and authorises `action` for `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] when the idea does not exist or
    /// the caller holds no role, and [`AccessError::Forbidden`] when the role
    /// is too low.
    pub async fn authorize(
        &self,
        caller: UserId,
        id: IdeaId,
        action: Action,
    ) -> IdeaServiceResult<IdeaGrant> {
        let grant = resolve_idea_grant(&*self.ideas, id, caller).await?;
        IDEA_POLICY.authorize(grant.as_ref().map(|found| found.role), action)?;
        grant.ok_or(IdeaServiceError::Access(AccessError::NotVisible))
    }

    /// Lists the caller's ideas that pass `filter`, with child counts.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaServiceError::Repository`] when lookup fails.
    pub async fn list(
        &self,
        caller: UserId,
        filter: &IdeaFilter,
    ) -> IdeaServiceResult<Vec<IdeaOverview>> {
        let ideas = self.ideas.list_for_user(caller, filter).await?;
        let mut overviews = Vec::with_capacity(ideas.len());
        for idea in ideas {
            let Some(role) = idea_role(&*self.ideas, &idea, caller).await? else {
                continue;
            };
            let counts = self.ideas.counts(idea.id()).await?;
            overviews.push(IdeaOverview {
                grant: IdeaGrant { idea, role },
                counts,
            });
        }
        Ok(overviews)
    }

    /// Creates an idea owned by the caller and links the visible subset of
    /// `project_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaServiceError::Domain`] for invalid input.
    pub async fn create(
        &self,
        caller: UserId,
        input: NewIdea,
        project_ids: Vec<ProjectId>,
    ) -> IdeaServiceResult<IdeaGrant> {
        let mut idea = Idea::create(input, caller, &*self.clock)?;
        let visible = self.visible_projects(caller, project_ids).await?;
        idea.link_projects(visible, &*self.clock);
        self.ideas.store(&idea).await?;
        tracing::info!(idea_id = %idea.id(), owner = %caller, "created idea");
        Ok(IdeaGrant {
            idea,
            role: AccessRole::Owner,
        })
    }

    /// Returns a visible idea.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaServiceError::Access`] when the idea is not visible.
    pub async fn get(&self, caller: UserId, id: IdeaId) -> IdeaServiceResult<IdeaGrant> {
        self.authorize(caller, id, Action::View).await
    }

    /// Returns an idea with its linked projects, notes, resources and
    /// collaborators.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn detail(&self, caller: UserId, id: IdeaId) -> IdeaServiceResult<IdeaDetail> {
        let grant = self.authorize(caller, id, Action::View).await?;
        let mut projects = Vec::new();
        for project in grant.idea.project_ids() {
            if let Some(found) = resolve_project_grant(&*self.projects, *project, caller).await? {
                projects.push(found.project);
            }
        }
        Ok(IdeaDetail {
            counts: self.ideas.counts(id).await?,
            notes: self.ideas.list_notes(id).await?,
            resources: self.ideas.list_resources(id).await?,
            members: self.ideas.list_memberships(id).await?,
            projects,
            grant,
        })
    }

    /// Applies a partial update; a supplied project list replaces the
    /// current links with its visible subset.
    ///
    /// # Errors
    ///
    /// Requires the edit permission; returns [`IdeaServiceError::Domain`]
    /// for invalid values.
    pub async fn update(
        &self,
        caller: UserId,
        id: IdeaId,
        mut changes: IdeaChanges,
    ) -> IdeaServiceResult<IdeaGrant> {
        let mut grant = self.authorize(caller, id, Action::Edit).await?;
        let relink = changes.project_ids.take();
        grant.idea.apply(changes, &*self.clock)?;
        if let Some(requested) = relink {
            let visible = self.visible_projects(caller, requested).await?;
            grant.idea.link_projects(visible, &*self.clock);
        }
        self.ideas.update(&grant.idea).await?;
        Ok(grant)
    }

    /// Deletes an idea with all of its content.
    ///
    /// Tasks attached to the idea live in another context and must be
    /// released by the caller beforehand.
    ///
    /// # Errors
    ///
    /// Requires the delete permission.
    pub async fn delete(&self, caller: UserId, id: IdeaId) -> IdeaServiceResult<()> {
        self.authorize(caller, id, Action::Delete).await?;
        self.ideas.delete_idea(id).await?;
        tracing::info!(idea_id = %id, "deleted idea");
        Ok(())
    }

    /// Counts the caller's ideas by status and priority.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaServiceError::Repository`] when lookup fails.
    pub async fn stats(&self, caller: UserId) -> IdeaServiceResult<IdeaStats> {
        let ideas = self
            .ideas
            .list_for_user(caller, &IdeaFilter::default())
            .await?;
        Ok(IdeaStats::tally(&ideas))
    }

    /// Lists the projects the caller may link ideas to.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaServiceError::Project`] when lookup fails.
    pub async fn my_user_projects(&self, caller: UserId) -> IdeaServiceResult<Vec<Project>> {
        Ok(self.projects.list_for_user(caller).await?)
    }

    /// Removes every link to `project`, used when the project is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaServiceError::Repository`] when the update fails.
    pub async fn detach_project(&self, project: ProjectId) -> IdeaServiceResult<()> {
        self.ideas.detach_project(project).await?;
        Ok(())
    }

    /// Lists the idea's collaborators.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn members(
        &self,
        caller: UserId,
        id: IdeaId,
    ) -> IdeaServiceResult<Vec<IdeaMembership>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.ideas.list_memberships(id).await?)
    }

    /// Adds `member` as a collaborator with `role`.
    ///
    /// # Errors
    ///
    /// Requires the manage-members permission; returns
    /// [`IdeaServiceError::Validation`] when `member` owns the idea or
    /// already collaborates on it.
    pub async fn add_member(
        &self,
        caller: UserId,
        id: IdeaId,
        member: &UserSummary,
        role: MemberRole,
    ) -> IdeaServiceResult<IdeaMembership> {
        let grant = self.authorize(caller, id, Action::ManageMembers).await?;
        if grant.idea.is_owned_by(member.id) {
            return Err(IdeaServiceError::Validation(FieldError::new(
                "non_field_errors",
                "The idea owner cannot be added as a member.",
            )));
        }
        let membership = IdeaMembership::new(id, member.id, role, caller, &*self.clock);
        self.ideas
            .save_membership(&membership)
            .await
            .map_err(duplicate_member)?;
        tracing::info!(
            idea_id = %id,
            member = %member.id,
            role = role.as_str(),
            "added idea member"
        );
        Ok(membership)
    }

    /// Removes the collaborator `user`.
    ///
    /// # Errors
    ///
    /// Requires the manage-members permission; returns
    /// [`IdeaServiceError::NotFound`] when `user` is not a collaborator.
    pub async fn remove_member(
        &self,
        caller: UserId,
        id: IdeaId,
        user: UserId,
    ) -> IdeaServiceResult<()> {
        self.authorize(caller, id, Action::ManageMembers).await?;
        let membership = self
            .ideas
            .find_membership(id, user)
            .await?
            .ok_or(IdeaServiceError::NotFound("member"))?;
        self.ideas.delete_membership(membership.id).await?;
        Ok(())
    }

    /// Lists the idea's notes.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn notes(&self, caller: UserId, id: IdeaId) -> IdeaServiceResult<Vec<IdeaNote>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.ideas.list_notes(id).await?)
    }

    /// Returns one note.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn note(
        &self,
        caller: UserId,
        id: IdeaId,
        note_id: IdeaNoteId,
    ) -> IdeaServiceResult<IdeaNote> {
        self.authorize(caller, id, Action::View).await?;
        self.note_in(id, note_id).await
    }

    /// Adds a note.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn create_note(
        &self,
        caller: UserId,
        id: IdeaId,
        title: String,
        content: String,
    ) -> IdeaServiceResult<IdeaNote> {
        self.authorize(caller, id, Action::Contribute).await?;
        let note = IdeaNote::new(id, title, content, caller, &*self.clock)?;
        self.ideas.save_note(&note).await?;
        Ok(note)
    }

    /// Changes a note.
    ///
    /// # Errors
    ///
    /// Requires the edit permission unless the caller wrote the note.
    pub async fn update_note(
        &self,
        caller: UserId,
        id: IdeaId,
        note_id: IdeaNoteId,
        title: Option<String>,
        content: Option<String>,
    ) -> IdeaServiceResult<IdeaNote> {
        let grant = self.authorize(caller, id, Action::View).await?;
        let mut note = self.note_in(id, note_id).await?;
        authorize_author(&grant, note.author, caller)?;
        note.edit(title, content, &*self.clock)?;
        self.ideas.save_note(&note).await?;
        Ok(note)
    }

    /// Deletes a note.
    ///
    /// # Errors
    ///
    /// Requires the edit permission unless the caller wrote the note.
    pub async fn delete_note(
        &self,
        caller: UserId,
        id: IdeaId,
        note_id: IdeaNoteId,
    ) -> IdeaServiceResult<()> {
        let grant = self.authorize(caller, id, Action::View).await?;
        let note = self.note_in(id, note_id).await?;
        authorize_author(&grant, note.author, caller)?;
        self.ideas.delete_note(note.id).await?;
        Ok(())
    }

    /// Lists the idea's resources.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn resources(
        &self,
        caller: UserId,
        id: IdeaId,
    ) -> IdeaServiceResult<Vec<IdeaResource>> {
        self.authorize(caller, id, Action::View).await?;
        Ok(self.ideas.list_resources(id).await?)
    }

    /// Returns one resource.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn resource(
        &self,
        caller: UserId,
        id: IdeaId,
        resource_id: IdeaResourceId,
    ) -> IdeaServiceResult<IdeaResource> {
        self.authorize(caller, id, Action::View).await?;
        self.resource_in(id, resource_id).await
    }

    /// Adds a resource.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn create_resource(
        &self,
        caller: UserId,
        id: IdeaId,
        title: String,
        url: String,
        description: String,
        resource_type: ResourceType,
    ) -> IdeaServiceResult<IdeaResource> {
        self.authorize(caller, id, Action::Contribute).await?;
        let resource = IdeaResource::new(
            id,
            title,
            url,
            description,
            resource_type,
            caller,
            &*self.clock,
        )?;
        self.ideas.save_resource(&resource).await?;
        Ok(resource)
    }

    /// Changes a resource.
    ///
    /// # Errors
    ///
    /// Requires the edit permission unless the caller added the resource.
    pub async fn update_resource(
        &self,
        caller: UserId,
        id: IdeaId,
        resource_id: IdeaResourceId,
        changes: ResourceChanges,
    ) -> IdeaServiceResult<IdeaResource> {
        let grant = self.authorize(caller, id, Action::View).await?;
        let mut resource = self.resource_in(id, resource_id).await?;
        authorize_author(&grant, resource.added_by, caller)?;
        resource.apply(changes)?;
        self.ideas.save_resource(&resource).await?;
        Ok(resource)
    }

    /// Deletes a resource.
    ///
    /// # Errors
    ///
    /// Requires the edit permission unless the caller added the resource.
    pub async fn delete_resource(
        &self,
        caller: UserId,
        id: IdeaId,
        resource_id: IdeaResourceId,
    ) -> IdeaServiceResult<()> {
        let grant = self.authorize(caller, id, Action::View).await?;
        let resource = self.resource_in(id, resource_id).await?;
        authorize_author(&grant, resource.added_by, caller)?;
        self.ideas.delete_resource(resource.id).await?;
        Ok(())
    }

    async fn visible_projects(
        &self,
        caller: UserId,
        requested: Vec<ProjectId>,
    ) -> IdeaServiceResult<Vec<ProjectId>> {
        let mut visible = Vec::with_capacity(requested.len());
        for project in requested {
            if resolve_project_grant(&*self.projects, project, caller)
                .await?
                .is_some()
            {
                visible.push(project);
            } else {
                tracing::debug!(
                    project_id = %project,
                    "dropping project link the caller cannot see"
                );
            }
        }
        Ok(visible)
    }

    async fn note_in(&self, id: IdeaId, note_id: IdeaNoteId) -> IdeaServiceResult<IdeaNote> {
        self.ideas
            .find_note(note_id)
            .await?
            .filter(|note| note.idea_id == id)
            .ok_or(IdeaServiceError::NotFound("note"))
    }

    async fn resource_in(
        &self,
        id: IdeaId,
        resource_id: IdeaResourceId,
    ) -> IdeaServiceResult<IdeaResource> {
        self.ideas
            .find_resource(resource_id)
            .await?
            .filter(|resource| resource.idea_id == id)
            .ok_or(IdeaServiceError::NotFound("resource"))
    }
}
