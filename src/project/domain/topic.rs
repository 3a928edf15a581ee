//! Knowledge topics and the notes, links, media, tags and comments they
//! collect.

use super::{
    ProjectDomainError, ProjectId, TopicCommentId, TopicId, TopicLinkId, TopicMediaId,
    TopicNoteId, TopicTagId,
};
use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::shared::{HexColor, choice_enum, optional_text, required_text, web_url};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Colour given to topics created without one.
pub const DEFAULT_TOPIC_COLOR: &str = "#3B82F6";
/// Colour given to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#10B981";

const MAX_TITLE_CHARS: usize = 200;
const MAX_TAG_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 5_000;
const MAX_NOTE_CHARS: usize = 100_000;
const MAX_COMMENT_CHARS: usize = 10_000;

choice_enum! {
    /// Classification of a topic link.
    #[derive(Default)]
    LinkType, field = "link_type" {
        /// General resource; the default.
        #[default]
        Resource => "resource",
        /// Reference material.
        Reference => "reference",
        /// Tool or service.
        Tool => "tool",
        /// Inspiration.
        Inspiration => "inspiration",
        /// Anything else.
        Other => "other",
    }
}

choice_enum! {
    /// Kind of uploaded topic media, derived from its content type.
    MediaType, field = "media_type" {
        /// `image/*`.
        Image => "image",
        /// `video/*`.
        Video => "video",
        /// `audio/*`.
        Audio => "audio",
        /// PDF, plain text or Word documents.
        Document => "document",
        /// Anything else.
        Other => "other",
    }
}

impl MediaType {
    /// Classifies a MIME type.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let normalized = content_type.trim().to_ascii_lowercase();
        if normalized.starts_with("image/") {
            Self::Image
        } else if normalized.starts_with("video/") {
            Self::Video
        } else if normalized.starts_with("audio/") {
            Self::Audio
        } else if normalized.contains("pdf")
            || normalized.starts_with("text/plain")
            || normalized.contains("msword")
            || normalized.contains("officedocument.wordprocessingml")
        {
            Self::Document
        } else {
            Self::Other
        }
    }
}

/// Topic aggregate collecting knowledge inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    project_id: ProjectId,
    title: String,
    description: String,
    color: HexColor,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTopicData {
    /// Persisted identifier.
    pub id: TopicId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted colour.
    pub color: HexColor,
    /// Author.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New colour.
    pub color: Option<String>,
}

impl Topic {
    /// Creates a topic inside `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank title, an oversized
    /// description, or a malformed colour.
    pub fn create(
        project_id: ProjectId,
        title: String,
        description: String,
        color: Option<&str>,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: TopicId::new(),
            project_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            color: HexColor::new("color", color.unwrap_or(DEFAULT_TOPIC_COLOR))?,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a topic from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTopicData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            color: data.color,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the topic identifier.
    #[must_use]
    pub const fn id(&self) -> TopicId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
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

    /// Returns the display colour.
    #[must_use]
    pub const fn color(&self) -> &HexColor {
        &self.color
    }

    /// Returns the author.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
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
    /// Returns [`ProjectDomainError::Field`] for invalid values.
    pub fn apply(
        &mut self,
        changes: TopicChanges,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        let title = changes
            .title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let description = changes
            .description
            .map(|value| optional_text("description", value, MAX_DESCRIPTION_CHARS))
            .transpose()?;
        let color = changes
            .color
            .map(|value| HexColor::new("color", &value))
            .transpose()?;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = color {
            self.color = value;
        }
        self.touch(clock);
        Ok(())
    }

    /// Marks the topic as changed, e.g. when content is added to it.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Number of child records per kind, shown in topic listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TopicCounts {
    /// Notes.
    pub notes: usize,
    /// Links.
    pub links: usize,
    /// Media items.
    pub media: usize,
    /// Comments including replies.
    pub comments: usize,
}

/// Long-form note inside a topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopicNote {
    /// Note identifier.
    pub id: TopicNoteId,
    /// Owning topic.
    pub topic_id: TopicId,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Author.
    pub created_by: UserId,
    /// Last editor, once the note has been edited.
    pub last_edited_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TopicNote {
    /// Creates a note.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank title or oversized
    /// content.
    pub fn new(
        topic_id: TopicId,
        title: String,
        content: String,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: TopicNoteId::new(),
            topic_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            content: optional_text("content", content, MAX_NOTE_CHARS)?,
            created_by,
            last_edited_by: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Edits title and/or content, recording `editor`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for invalid values.
    pub fn edit(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        editor: UserId,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        let new_title = title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let new_content = content
            .map(|value| optional_text("content", value, MAX_NOTE_CHARS))
            .transpose()?;
        if let Some(value) = new_title {
            self.title = value;
        }
        if let Some(value) = new_content {
            self.content = value;
        }
        self.last_edited_by = Some(editor);
        self.updated_at = clock.utc();
        Ok(())
    }
}

/// Categorised external link inside a topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopicLink {
    /// Link identifier.
    pub id: TopicLinkId,
    /// Owning topic.
    pub topic_id: TopicId,
    /// Title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Optional description.
    pub description: String,
    /// Classification.
    pub link_type: LinkType,
    /// Author.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a topic link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicLinkChanges {
    /// New title.
    pub title: Option<String>,
    /// New URL.
    pub url: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New classification.
    pub link_type: Option<LinkType>,
}

impl TopicLink {
    /// Creates a topic link.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank title or an invalid
    /// URL.
    pub fn new(
        topic_id: TopicId,
        title: String,
        url: String,
        description: String,
        link_type: LinkType,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: TopicLinkId::new(),
            topic_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            url: web_url("url", url)?,
            description: optional_text("description", description, MAX_DESCRIPTION_CHARS)?,
            link_type,
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
        changes: TopicLinkChanges,
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
        if let Some(value) = changes.link_type {
            self.link_type = value;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}

/// Descriptive input for a media upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTopicMedia {
    /// Title; blank falls back to the file name.
    pub title: String,
    /// Optional description.
    pub description: String,
    /// Playback length for audio and video.
    pub duration_seconds: Option<u32>,
}

/// Uploaded media item inside a topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopicMedia {
    /// Media identifier.
    pub id: TopicMediaId,
    /// Owning topic.
    pub topic_id: TopicId,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: String,
    /// Kind derived from the content type.
    pub media_type: MediaType,
    /// Stored content metadata.
    pub file: StoredFile,
    /// Playback length for audio and video.
    pub duration_seconds: Option<u32>,
    /// Uploader.
    pub uploaded_by: UserId,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl TopicMedia {
    /// Creates a media record for stored content.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for oversized values.
    pub fn new(
        topic_id: TopicId,
        input: NewTopicMedia,
        file: StoredFile,
        uploaded_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let title = if input.title.trim().is_empty() {
            file.file_name.clone()
        } else {
            input.title
        };
        Ok(Self {
            id: TopicMediaId::new(),
            topic_id,
            title: required_text("title", title, MAX_TITLE_CHARS)?,
            description: optional_text("description", input.description, MAX_DESCRIPTION_CHARS)?,
            media_type: MediaType::from_content_type(&file.content_type),
            file,
            duration_seconds: input.duration_seconds,
            uploaded_by,
            uploaded_at: clock.utc(),
        })
    }

    /// Changes the title and/or description.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for invalid values.
    pub fn describe(
        &mut self,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<(), ProjectDomainError> {
        let new_title = title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let new_description = description
            .map(|value| optional_text("description", value, MAX_DESCRIPTION_CHARS))
            .transpose()?;
        if let Some(value) = new_title {
            self.title = value;
        }
        if let Some(value) = new_description {
            self.description = value;
        }
        Ok(())
    }
}

/// Label attached to a topic; names are unique per topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopicTag {
    /// Tag identifier.
    pub id: TopicTagId,
    /// Owning topic.
    pub topic_id: TopicId,
    /// Tag name.
    pub name: String,
    /// Display colour.
    pub color: HexColor,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TopicTag {
    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for a blank name or malformed
    /// colour.
    pub fn new(
        topic_id: TopicId,
        name: String,
        color: Option<&str>,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        Ok(Self {
            id: TopicTagId::new(),
            topic_id,
            name: required_text("name", name, MAX_TAG_CHARS)?,
            color: HexColor::new("color", color.unwrap_or(DEFAULT_TAG_COLOR))?,
            created_at: clock.utc(),
        })
    }

    /// Renames and/or recolours the tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for invalid values.
    pub fn apply(
        &mut self,
        name: Option<String>,
        color: Option<&str>,
    ) -> Result<(), ProjectDomainError> {
        let new_name = name
            .map(|value| required_text("name", value, MAX_TAG_CHARS))
            .transpose()?;
        let new_color = color.map(|value| HexColor::new("color", value)).transpose()?;
        if let Some(value) = new_name {
            self.name = value;
        }
        if let Some(value) = new_color {
            self.color = value;
        }
        Ok(())
    }
}

/// Threaded discussion entry on a topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopicComment {
    /// Comment identifier.
    pub id: TopicCommentId,
    /// Owning topic.
    pub topic_id: TopicId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub content: String,
    /// Parent comment for replies.
    pub parent: Option<TopicCommentId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TopicComment {
    /// Creates a comment, optionally replying to `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::ForeignParentComment`] when `parent`
    /// belongs to another topic, and [`ProjectDomainError::Field`] for blank
    /// content.
    pub fn new(
        topic_id: TopicId,
        author: UserId,
        content: String,
        parent: Option<&Self>,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        if let Some(parent_comment) = parent
            && parent_comment.topic_id != topic_id
        {
            return Err(ProjectDomainError::ForeignParentComment {
                parent: parent_comment.id,
                topic: topic_id,
            });
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TopicCommentId::new(),
            topic_id,
            author,
            content: required_text("content", content, MAX_COMMENT_CHARS)?,
            parent: parent.map(|comment| comment.id),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Replaces the body text.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::Field`] for blank content.
    pub fn edit(&mut self, content: String, clock: &impl Clock) -> Result<(), ProjectDomainError> {
        self.content = required_text("content", content, MAX_COMMENT_CHARS)?;
        self.updated_at = clock.utc();
        Ok(())
    }
}
