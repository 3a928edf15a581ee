//! Task lists grouping tasks inside a project or for one user.

use super::{TaskDomainError, TaskListId};
use crate::account::domain::UserId;
use crate::project::domain::ProjectId;
use crate::shared::{optional_text, required_text};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

const MAX_NAME_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 5_000;

/// Ordered list of tasks; project lists are shared, personal lists are
/// private to their creator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskList {
    /// List identifier.
    pub id: TaskListId,
    /// Owning project; `None` for a personal list.
    pub project: Option<ProjectId>,
    /// Name.
    pub name: String,
    /// Optional description.
    pub description: String,
    /// Sort position among sibling lists.
    pub position: u32,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New position.
    pub position: Option<u32>,
}

/// Task totals shown with a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskListCounts {
    /// Tasks in the list.
    pub tasks: usize,
    /// Tasks in the list that are done.
    pub completed_tasks: usize,
}

impl TaskList {
    /// Creates a list, personal when `project` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for a blank name or oversized
    /// values.
    pub fn new(
        project: Option<ProjectId>,
        name: String,
        description: String,
        position: u32,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskListId::new(),
            project,
            name: required_text("name", name, MAX_NAME_CHARS)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            position,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns `true` for a personal list.
    #[must_use]
    pub const fn is_personal(&self) -> bool {
        self.project.is_none()
    }

    /// Applies a partial update, validating every field first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Field`] for invalid values.
    pub fn apply(
        &mut self,
        changes: TaskListChanges,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let name = changes
            .name
            .map(|value| required_text("name", value, MAX_NAME_CHARS))
            .transpose()?;
        let description = changes
            .description
            .map(|value| optional_text("description", value, MAX_DESCRIPTION_CHARS))
            .transpose()?;
        if let Some(value) = name {
            self.name = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = changes.position {
            self.position = value;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}
