//! Project aggregate root.

use super::{ProjectDomainError, ProjectId};
use crate::account::domain::UserId;
use crate::shared::{FieldError, choice_enum, optional_text, required_text};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;

const MAX_TITLE_CHARS: usize = 255;
const MAX_DESCRIPTION_CHARS: usize = 10_000;

choice_enum! {
    /// Lifecycle status of a project.
    #[derive(Default)]
    ProjectStatus, field = "status" {
        /// Being scoped; the default for new projects.
        #[default]
        Planning => "planning",
        /// Actively worked on.
        InProgress => "in_progress",
        /// Paused.
        OnHold => "on_hold",
        /// Finished.
        Completed => "completed",
        /// Abandoned.
        Cancelled => "cancelled",
    }
}

choice_enum! {
    /// Relative urgency of a project.
    #[derive(Default)]
    ProjectPriority, field = "priority" {
        /// Low urgency.
        Low => "low",
        /// Normal urgency; the default.
        #[default]
        Medium => "medium",
        /// High urgency.
        High => "high",
        /// Needs immediate attention.
        Urgent => "urgent",
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    /// Project title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Initial status.
    pub status: ProjectStatus,
    /// Initial priority.
    pub priority: ProjectPriority,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Completion percentage, `0..=100`.
    pub progress: i64,
}

impl NewProject {
    /// Creates input with the given title and default values otherwise.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a project; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<ProjectStatus>,
    /// New priority.
    pub priority: Option<ProjectPriority>,
    /// New due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
    /// New completion percentage.
    pub progress: Option<i64>,
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    title: String,
    description: String,
    status: ProjectStatus,
    priority: ProjectPriority,
    owner: UserId,
    due_date: Option<NaiveDate>,
    progress: u8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted identifier.
    pub id: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted status.
    pub status: ProjectStatus,
    /// Persisted priority.
    pub priority: ProjectPriority,
    /// Owning user.
    pub owner: UserId,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted completion percentage.
    pub progress: u8,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

fn validate_progress(progress: i64) -> Result<u8, FieldError> {
    u8::try_from(progress)
        .ok()
        .filter(|value| *value <= 100)
        .ok_or_else(|| FieldError::new("progress", "Ensure this value is between 0 and 100."))
}

impl Project {
    /// Creates a project owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank or oversized title,
    /// an oversized description, or progress outside `0..=100`.
    pub fn create(
        input: NewProject,
        owner: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            title: required_text("title", input.title, MAX_TITLE_CHARS)?,
            description: optional_text("description", input.description, MAX_DESCRIPTION_CHARS)?,
            status: input.status,
            priority: input.priority,
            owner,
            due_date: input.due_date,
            progress: validate_progress(input.progress)?,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            owner: data.owner,
            due_date: data.due_date,
            progress: data.progress,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> ProjectPriority {
        self.priority
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns `true` when `user` owns the project.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the completion percentage.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update, validating every field first.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for invalid values; the project
    /// is left unchanged in that case.
    pub fn apply(
        &mut self,
        changes: ProjectChanges,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        let title = changes
            .title
            .map(|title| required_text("title", title, MAX_TITLE_CHARS))
            .transpose()?;
        let description = changes
            .description
            .map(|text| optional_text("description", text, MAX_DESCRIPTION_CHARS))
            .transpose()?;
        let progress = changes.progress.map(validate_progress).transpose()?;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = changes.status {
            self.status = value;
        }
        if let Some(value) = changes.priority {
            self.priority = value;
        }
        if let Some(value) = changes.due_date {
            self.due_date = value;
        }
        if let Some(value) = progress {
            self.progress = value;
        }
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
