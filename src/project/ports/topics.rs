//! Repository port for knowledge topics and their content.

use crate::project::domain::{
    ProjectId, Topic, TopicComment, TopicCommentId, TopicCounts, TopicId, TopicLink,
    TopicLinkId, TopicMedia, TopicMediaId, TopicNote, TopicNoteId, TopicTag, TopicTagId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for topic repository operations.
pub type TopicRepositoryResult<T> = Result<T, TopicRepositoryError>;

/// Topic persistence contract.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Stores a new topic.
    ///
    /// # Errors
    ///
    /// Returns [`TopicRepositoryError::DuplicateTitle`] when the project
    /// already has a topic with the same title.
    async fn store_topic(&self, topic: &Topic) -> TopicRepositoryResult<()>;

    /// Persists changes to an existing topic.
    ///
    /// # Errors
    ///
    /// Returns [`TopicRepositoryError::NotFound`] for unknown topics and
    /// [`TopicRepositoryError::DuplicateTitle`] for a clashing title.
    async fn update_topic(&self, topic: &Topic) -> TopicRepositoryResult<()>;

    /// Finds a topic by identifier.
    async fn find_topic(&self, id: TopicId) -> TopicRepositoryResult<Option<Topic>>;

    /// Lists the topics of a project, most recently updated first.
    async fn list_topics(&self, project: ProjectId) -> TopicRepositoryResult<Vec<Topic>>;

    /// Deletes a topic and all of its content, returning the storage keys of
    /// the removed media.
    async fn delete_topic(&self, id: TopicId) -> TopicRepositoryResult<Vec<String>>;

    /// Counts the content attached to a topic.
    async fn topic_counts(&self, id: TopicId) -> TopicRepositoryResult<TopicCounts>;

    /// Inserts or replaces a note.
    async fn save_note(&self, note: &TopicNote) -> TopicRepositoryResult<()>;

    /// Finds a note by identifier.
    async fn find_note(&self, id: TopicNoteId) -> TopicRepositoryResult<Option<TopicNote>>;

    /// Lists the notes of a topic, most recently updated first.
    async fn list_notes(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicNote>>;

    /// Deletes a note.
    async fn delete_note(&self, id: TopicNoteId) -> TopicRepositoryResult<()>;

    /// Inserts or replaces a link.
    async fn save_link(&self, link: &TopicLink) -> TopicRepositoryResult<()>;

    /// Finds a link by identifier.
    async fn find_link(&self, id: TopicLinkId) -> TopicRepositoryResult<Option<TopicLink>>;

    /// Lists the links of a topic, newest first.
    async fn list_links(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicLink>>;

    /// Deletes a link.
    async fn delete_link(&self, id: TopicLinkId) -> TopicRepositoryResult<()>;

    /// Inserts or replaces a media record.
    async fn save_media(&self, media: &TopicMedia) -> TopicRepositoryResult<()>;

    /// Finds a media record by identifier.
    async fn find_media(&self, id: TopicMediaId) -> TopicRepositoryResult<Option<TopicMedia>>;

    /// Lists the media of a topic, newest first.
    async fn list_media(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicMedia>>;

    /// Deletes a media record.
    async fn delete_media(&self, id: TopicMediaId) -> TopicRepositoryResult<()>;

    /// Inserts or replaces a tag.
    ///
    /// # Errors
    ///
    /// Returns [`TopicRepositoryError::DuplicateTag`] when another tag of
    /// the topic has the same name.
    async fn save_tag(&self, tag: &TopicTag) -> TopicRepositoryResult<()>;

    /// Finds a tag by identifier.
    async fn find_tag(&self, id: TopicTagId) -> TopicRepositoryResult<Option<TopicTag>>;

    /// Lists the tags of a topic ordered by name.
    async fn list_tags(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicTag>>;

    /// Deletes a tag.
    async fn delete_tag(&self, id: TopicTagId) -> TopicRepositoryResult<()>;

    /// Inserts or replaces a comment.
    async fn save_comment(&self, comment: &TopicComment) -> TopicRepositoryResult<()>;

    /// Finds a comment by identifier.
    async fn find_comment(&self, id: TopicCommentId)
    -> TopicRepositoryResult<Option<TopicComment>>;

    /// Lists every comment of a topic, replies included, oldest first.
    async fn list_comments(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicComment>>;

    /// Deletes a comment together with its replies.
    async fn delete_comment(&self, id: TopicCommentId) -> TopicRepositoryResult<()>;
}

/// Errors returned by topic repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TopicRepositoryError {
    /// The topic was not found.
    #[error("topic not found: {0}")]
    NotFound(TopicId),

    /// The project already has a topic with this title.
    #[error("project {project} already has a topic titled {title:?}")]
    DuplicateTitle {
        /// Owning project.
        project: ProjectId,
        /// Clashing title.
        title: String,
    },

    /// The topic already has a tag with this name.
    #[error("topic {topic} already has a tag named {name:?}")]
    DuplicateTag {
        /// Owning topic.
        topic: TopicId,
        /// Clashing name.
        name: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TopicRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
