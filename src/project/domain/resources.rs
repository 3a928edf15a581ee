//! Files, links and activity entries attached to a project.

use super::{ActivityId, ProjectDomainError, ProjectFileId, ProjectId, ProjectLinkId};
use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::shared::{optional_text, required_text, web_url};
use chrono::{DateTime, Utc};
use mockable::Clock;

const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 5_000;
const MAX_ACTION_CHARS: usize = 200;

/// File uploaded to a project.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectFile {
    /// File identifier.
    pub id: ProjectFileId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: String,
    /// Stored content metadata.
    pub file: StoredFile,
    /// Uploader.
    pub uploaded_by: UserId,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl ProjectFile {
    /// Creates a file record; a blank title falls back to the file name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for oversized values.
    pub fn new(
        project_id: ProjectId,
        title: &str,
        description: String,
        file: StoredFile,
        uploaded_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let candidate = if title.trim().is_empty() {
            file.file_name.as_str()
        } else {
            title
        };
        Ok(Self {
            id: ProjectFileId::new(),
            project_id,
            title: required_text("title", candidate, MAX_TITLE_CHARS)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            file,
            uploaded_by,
            uploaded_at: clock.utc(),
        })
    }
}

/// External link shared with a project.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectLink {
    /// Link identifier.
    pub id: ProjectLinkId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Optional description.
    pub description: String,
    /// Author.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkChanges {
    /// New title.
    pub title: Option<String>,
    /// New URL.
    pub url: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl ProjectLink {
    /// Creates a link.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank title or an invalid
    /// URL.
    pub fn new(
        project_id: ProjectId,
        title: String,
        url: String,
        description: String,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectLinkId::new(),
            project_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            url: web_url("url", url)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Applies a partial update, validating every field first.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for invalid values.
    pub fn apply(
        &mut self,
        changes: LinkChanges,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        let title = changes
            .title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let url = changes.url.map(|value| web_url("url", value)).transpose()?;
        let description = changes
            .description
            .map(|value| optional_text("description", value, MAX_DESCRIPTION_CHARS))
            .transpose()?;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = url {
            self.url = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}

/// Append-only activity log entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectActivity {
    /// Entry identifier.
    pub id: ActivityId,
    /// Project the entry belongs to.
    pub project_id: ProjectId,
    /// Acting user.
    pub user_id: UserId,
    /// Short action label such as `Uploaded file`.
    pub action: String,
    /// Human-readable detail.
    pub description: String,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

impl ProjectActivity {
    /// Records an action by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank or oversized action.
    pub fn record(
        project_id: ProjectId,
        user_id: UserId,
        action: impl Into<String>,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        Ok(Self {
            id: ActivityId::new(),
            project_id,
            user_id,
            action: required_text("action", action, MAX_ACTION_CHARS)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            created_at: clock.utc(),
        })
    }
}
