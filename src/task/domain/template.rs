//! Reusable task templates rendered with `MiniJinja`.

use super::{Hours, NewTask, TaskDomainError, TaskPriority, TaskTemplateId};
use crate::account::domain::UserId;
use crate::shared::{FieldError, Tags, optional_text, required_text};
use chrono::{DateTime, NaiveDate, Utc};
use minijinja::{Environment, context};
use mockable::Clock;

const MAX_NAME_CHARS: usize = 200;
const MAX_TITLE_TEMPLATE_CHARS: usize = 200;
const MAX_TEXT_CHARS: usize = 10_000;

/// Input for creating a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTemplate {
    /// Template name.
    pub name: String,
    /// What the template is for.
    pub description: String,
    /// `MiniJinja` source for the task title.
    pub title_template: String,
    /// `MiniJinja` source for the task description.
    pub description_template: String,
    /// Priority given to created tasks.
    pub priority: TaskPriority,
    /// Estimate given to created tasks.
    pub estimated_hours: Option<Hours>,
    /// Comma-separated tags given to created tasks.
    pub tags: String,
    /// Whether other users may see and use the template.
    pub is_public: bool,
}

/// Partial update of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New title source.
    pub title_template: Option<String>,
    /// New description source.
    pub description_template: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New or cleared estimate.
    pub estimated_hours: Option<Option<Hours>>,
    /// New tags.
    pub tags: Option<String>,
    /// New visibility.
    pub is_public: Option<bool>,
}

/// Values available to template sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    /// Title of the target project, or empty.
    pub project: String,
    /// Title of the target idea, or empty.
    pub idea: String,
    /// Display name of the requesting user.
    pub user: String,
    /// Current date.
    pub today: NaiveDate,
}

/// Reusable blueprint for tasks.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskTemplate {
    /// Template identifier.
    pub id: TaskTemplateId,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// `MiniJinja` source for the task title.
    pub title_template: String,
    /// `MiniJinja` source for the task description.
    pub description_template: String,
    /// Priority given to created tasks.
    pub priority: TaskPriority,
    /// Estimate given to created tasks.
    pub estimated_hours: Option<Hours>,
    /// Tags given to created tasks.
    pub tags: Tags,
    /// Author.
    pub created_by: UserId,
    /// Visible to every user when set.
    pub is_public: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn checked_source(
    field: &'static str,
    source: String,
    max_chars: usize,
    required: bool,
) -> Result<String, FieldError> {
    let text = if required {
        required_text(field, source, max_chars)?
    } else {
        optional_text(field, source, max_chars)?
    };
    Environment::new()
        .template_from_str(&text)
        .map_err(|err| FieldError::new(field, format!("Invalid template: {err}")))?;
    Ok(text)
}

fn render(field: &'static str, source: &str, vars: &TemplateVars) -> Result<String, FieldError> {
    Environment::new()
        .render_str(
            source,
            context! {
                project => vars.project.as_str(),
                idea => vars.idea.as_str(),
                user => vars.user.as_str(),
                today => vars.today.to_string(),
            },
        )
        .map_err(|err| FieldError::new(field, format!("Template could not be rendered: {err}")))
}

impl TaskTemplate {
    /// Creates a template after checking both sources parse.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for blank names, oversized values
    /// or template syntax errors.
    pub fn new(
        input: NewTemplate,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id: TaskTemplateId::new(),
            name: required_text("name", input.name, MAX_NAME_CHARS)?,
            description: optional_text("description", input.description, MAX_TEXT_CHARS)?,
            title_template: checked_source(
                "title_template",
                input.title_template,
                MAX_TITLE_TEMPLATE_CHARS,
                true,
            )?,
            description_template: checked_source(
                "description_template",
                input.description_template,
                MAX_TEXT_CHARS,
                false,
            )?,
            priority: input.priority,
            estimated_hours: input.estimated_hours,
            tags: Tags::parse("tags", &input.tags)?,
            created_by,
            is_public: input.is_public,
            created_at: clock.utc(),
        })
    }

    /// Returns `true` when `user` may see and use the template.
    #[must_use]
    pub fn is_visible_to(&self, user: UserId) -> bool {
        self.is_public || self.created_by == user
    }

    /// Applies a partial update, validating every field first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for invalid values.
    pub fn apply(&mut self, changes: TemplateChanges) -> Result<(), TaskDomainError> {
        let name = changes
            .name
            .map(|value| required_text("name", value, MAX_NAME_CHARS))
            .transpose()?;
        let description = changes
            .description
            .map(|value| optional_text("description", value, MAX_TEXT_CHARS))
            .transpose()?;
        let title_template = changes
            .title_template
            .map(|value| checked_source("title_template", value, MAX_TITLE_TEMPLATE_CHARS, true))
            .transpose()?;
        let description_template = changes
            .description_template
            .map(|value| checked_source("description_template", value, MAX_TEXT_CHARS, false))
            .transpose()?;
        let tags = changes
            .tags
            .map(|raw| Tags::parse("tags", &raw))
            .transpose()?;
        if let Some(value) = name {
            self.name = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = title_template {
            self.title_template = value;
        }
        if let Some(value) = description_template {
            self.description_template = value;
        }
        if let Some(value) = tags {
            self.tags = value;
        }
        if let Some(value) = changes.priority {
            self.priority = value;
        }
        if let Some(value) = changes.estimated_hours {
            self.estimated_hours = value;
        }
        if let Some(value) = changes.is_public {
            self.is_public = value;
        }
        Ok(())
    }

    /// Renders the template into task input.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] when rendering fails.
    pub fn instantiate(&self, vars: &TemplateVars) -> Result<NewTask, TaskDomainError> {
        Ok(NewTask {
            title: render("title_template", &self.title_template, vars)?,
            description: render("description_template", &self.description_template, vars)?,
            priority: self.priority,
            estimated_hours: self.estimated_hours,
            tags: self.tags.to_csv(),
            ..NewTask::default()
        })
    }
}
