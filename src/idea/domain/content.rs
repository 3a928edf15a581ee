//! Notes and resources collected on an idea.

use super::{IdeaDomainError, IdeaId, IdeaNoteId, IdeaResourceId};
use crate::account::domain::UserId;
use crate::shared::{choice_enum, optional_text, required_text, web_url};
use chrono::{DateTime, Utc};
use mockable::Clock;

const MAX_TITLE_CHARS: usize = 200;
const MAX_CONTENT_CHARS: usize = 100_000;
const MAX_DESCRIPTION_CHARS: usize = 5_000;

choice_enum! {
    /// Kind of external resource attached to an idea.
    #[derive(Default)]
    ResourceType, field = "resource_type" {
        /// Research material.
        Research => "research",
        /// General reference; the default.
        #[default]
        Reference => "reference",
        /// Something that inspired the idea.
        Inspiration => "inspiration",
        /// A competing product.
        Competitor => "competitor",
        /// A useful tool.
        Tool => "tool",
        /// Anything else.
        Other => "other",
    }
}

/// Free-form note on an idea.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IdeaNote {
    /// Note identifier.
    pub id: IdeaNoteId,
    /// Owning idea.
    pub idea_id: IdeaId,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Author.
    pub author: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl IdeaNote {
    /// Creates a note.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaDomainError::Field`] for a blank title or content, or
    /// oversized values.
    pub fn new(
        idea_id: IdeaId,
        title: String,
        content: String,
        author: UserId,
        clock: &impl Clock,
    ) -> Result<Self, IdeaDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: IdeaNoteId::new(),
            idea_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            content: required_text("content", content, MAX_CONTENT_CHARS)?,
            author,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Changes the title and/or content.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaDomainError::Field`] for invalid values.
    pub fn edit(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), IdeaDomainError> {
        let new_title = title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let new_content = content
            .map(|value| required_text("content", value, MAX_CONTENT_CHARS))
            .transpose()?;
        if let Some(value) = new_title {
            self.title = value;
        }
        if let Some(value) = new_content {
            self.content = value;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}

/// External link collected for an idea.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IdeaResource {
    /// Resource identifier.
    pub id: IdeaResourceId,
    /// Owning idea.
    pub idea_id: IdeaId,
    /// Title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Optional description.
    pub description: String,
    /// Resource kind.
    pub resource_type: ResourceType,
    /// User who added the resource.
    pub added_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Partial update of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceChanges {
    /// New title.
    pub title: Option<String>,
    /// New URL.
    pub url: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New kind.
    pub resource_type: Option<ResourceType>,
}

impl IdeaResource {
    /// Creates a resource.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaDomainError::Field`] for a blank title or an invalid
    /// URL.
    pub fn new(
        idea_id: IdeaId,
        title: String,
        url: String,
        description: String,
        resource_type: ResourceType,
        added_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, IdeaDomainError> {
        Ok(Self {
            id: IdeaResourceId::new(),
            idea_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            url: web_url("url", url)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            resource_type,
            added_by,
            created_at: clock.utc(),
        })
    }

    /// Applies a partial update, validating every field first.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaDomainError::Field`] for invalid values.
    pub fn apply(&mut self, changes: ResourceChanges) -> Result<(), IdeaDomainError> {
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
        if let Some(value) = changes.resource_type {
            self.resource_type = value;
        }
        Ok(())
    }
}
