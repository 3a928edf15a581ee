//! Reusable task templates.

use super::access::TaskGrant;
use super::tasks::{TaskService, TaskServiceError, TaskServiceResult};
use crate::access::AccessError;
use crate::account::domain::UserId;
use crate::blob::ports::BlobStore;
use crate::idea::{domain::IdeaId, ports::IdeaRepository, services::resolve_idea_grant};
use crate::project::{
    domain::ProjectId, ports::ProjectRepository, services::resolve_project_grant,
};
use crate::task::{
    domain::{
        NewTemplate, RelationChanges, TaskListId, TaskTemplate, TaskTemplateId, TemplateChanges,
        TemplateVars,
    },
    ports::TaskRepository,
};
use mockable::Clock;

/// Where a task created from a template is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateTarget {
    /// Project for the new task.
    pub project: Option<ProjectId>,
    /// Idea for the new task.
    pub idea: Option<IdeaId>,
    /// List for the new task.
    pub task_list: Option<TaskListId>,
}

impl<T, P, I, B, C> TaskService<T, P, I, B, C>
where
    T: TaskRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Lists the caller's own templates and every public one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when lookup fails.
    pub async fn templates(&self, caller: UserId) -> TaskServiceResult<Vec<TaskTemplate>> {
        Ok(self.tasks.list_templates(caller).await?)
    }

    /// Returns one visible template.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] for another user's private
    /// template.
    pub async fn template(
        &self,
        caller: UserId,
        id: TaskTemplateId,
    ) -> TaskServiceResult<TaskTemplate> {
        self.tasks
            .find_template(id)
            .await?
            .filter(|template| template.is_visible_to(caller))
            .ok_or(TaskServiceError::Access(AccessError::NotVisible))
    }

    /// Creates a template owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for invalid values or template
    /// syntax errors.
    pub async fn create_template(
        &self,
        caller: UserId,
        input: NewTemplate,
    ) -> TaskServiceResult<TaskTemplate> {
        let template = TaskTemplate::new(input, caller, &*self.clock)?;
        self.tasks.save_template(&template).await?;
        Ok(template)
    }

    /// Changes a template; only its creator may do so.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotCreator`] for anyone else who can see
    /// it.
    pub async fn update_template(
        &self,
        caller: UserId,
        id: TaskTemplateId,
        changes: TemplateChanges,
    ) -> TaskServiceResult<TaskTemplate> {
        let mut template = self.own_template(caller, id).await?;
        template.apply(changes)?;
        self.tasks.save_template(&template).await?;
        Ok(template)
    }

    /// Deletes a template; only its creator may do so.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotCreator`] for anyone else who can see
    /// it.
    pub async fn delete_template(
        &self,
        caller: UserId,
        id: TaskTemplateId,
    ) -> TaskServiceResult<()> {
        let template = self.own_template(caller, id).await?;
        self.tasks.delete_template(template.id).await?;
        Ok(())
    }

    /// Renders a template into a new task placed in `target`.
    ///
    /// `user_name` fills the `user` variable; `project` and `idea` are the
    /// titles of the target contexts, or empty.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] for a hidden template, and the
    /// errors of [`TaskService::create`] otherwise.
    pub async fn create_from_template(
        &self,
        caller: UserId,
        user_name: &str,
        id: TaskTemplateId,
        target: TemplateTarget,
    ) -> TaskServiceResult<TaskGrant> {
        let template = self.template(caller, id).await?;
        let project = match target.project {
            Some(project_id) => resolve_project_grant(&*self.projects, project_id, caller)
                .await?
                .map(|grant| grant.project.title().to_owned()),
            None => None,
        };
        let idea = match target.idea {
            Some(idea_id) => resolve_idea_grant(&*self.ideas, idea_id, caller)
                .await?
                .map(|grant| grant.idea.title().to_owned()),
            None => None,
        };
        let vars = TemplateVars {
            project: project.unwrap_or_default(),
            idea: idea.unwrap_or_default(),
            user: user_name.to_owned(),
            today: self.clock.utc().date_naive(),
        };
        let input = template.instantiate(&vars)?;
        let relations = RelationChanges {
            project: target.project.map(Some),
            idea: target.idea.map(Some),
            task_list: target.task_list.map(Some),
            ..RelationChanges::default()
        };
        let grant = self.create(caller, input, relations).await?;
        tracing::debug!(template_id = %id, task_id = %grant.task.id(), "instantiated template");
        Ok(grant)
    }

    async fn own_template(
        &self,
        caller: UserId,
        id: TaskTemplateId,
    ) -> TaskServiceResult<TaskTemplate> {
        let template = self.template(caller, id).await?;
        if template.created_by != caller {
            return Err(TaskServiceError::NotCreator);
        }
        Ok(template)
    }
}
