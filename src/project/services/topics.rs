//! Knowledge topics: notes, links, media, tags and threaded comments.

use super::access::{ProjectGrant, resolve_project_grant};
use crate::access::{AccessError, Action, PROJECT_POLICY};
use crate::account::domain::UserId;
use crate::blob::{
    Upload,
    ports::{BlobStore, BlobStoreError},
};
use crate::project::{
    domain::{
        LinkType, NewTopicMedia, ProjectActivity, ProjectDomainError, ProjectId, Topic,
        TopicChanges, TopicComment, TopicCommentId, TopicCounts, TopicId, TopicLink,
        TopicLinkChanges, TopicLinkId, TopicMedia, TopicMediaId, TopicNote, TopicNoteId, TopicTag,
        TopicTagId,
    },
    ports::{ProjectRepository, ProjectRepositoryError, TopicRepository, TopicRepositoryError},
};
use crate::shared::FieldError;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

const MEDIA_NAMESPACE: &str = "topic_media";

/// Service-level errors for topic operations.
#[derive(Debug, Error)]
pub enum TopicServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Topic repository operation failed.
    #[error(transparent)]
    Repository(#[from] TopicRepositoryError),
    /// Project repository operation failed.
    #[error(transparent)]
    Project(#[from] ProjectRepositoryError),
    /// Blob storage failed.
    #[error(transparent)]
    Blob(#[from] BlobStoreError),
    /// The caller may not perform the action.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// The record does not exist within the topic or project.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request conflicts with existing state.
    #[error(transparent)]
    Validation(FieldError),
    /// Only the author may change a comment.
    #[error("only the author may change this comment")]
    NotAuthor,
}

/// Result type for topic service operations.
pub type TopicServiceResult<T> = Result<T, TopicServiceError>;

/// Address of a topic inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicPath {
    /// Owning project.
    pub project: ProjectId,
    /// Topic.
    pub topic: TopicId,
}

/// Topic listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicOverview {
    /// The topic.
    pub topic: Topic,
    /// Content counts.
    pub counts: TopicCounts,
    /// Tags ordered by name.
    pub tags: Vec<TopicTag>,
}

/// A comment with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThread {
    /// The comment.
    pub comment: TopicComment,
    /// Replies, oldest first.
    pub replies: Vec<CommentThread>,
}

/// A topic with all of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDetail {
    /// Caller's grant on the owning project.
    pub grant: ProjectGrant,
    /// The topic.
    pub topic: Topic,
    /// Notes.
    pub notes: Vec<TopicNote>,
    /// Links.
    pub links: Vec<TopicLink>,
    /// Media.
    pub media: Vec<TopicMedia>,
    /// Tags.
    pub tags: Vec<TopicTag>,
    /// Top-level comments with replies.
    pub comments: Vec<CommentThread>,
}

/// Nests a flat, oldest-first comment list under its parents.
fn build_threads(comments: Vec<TopicComment>) -> Vec<CommentThread> {
    let mut children: HashMap<Option<TopicCommentId>, Vec<TopicComment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent).or_default().push(comment);
    }
    attach_replies(None, &mut children)
}

fn attach_replies(
    parent: Option<TopicCommentId>,
    children: &mut HashMap<Option<TopicCommentId>, Vec<TopicComment>>,
) -> Vec<CommentThread> {
    let direct = children.remove(&parent).unwrap_or_default();
    let mut threads = Vec::with_capacity(direct.len());
    for comment in direct {
        let replies = attach_replies(Some(comment.id), children);
        threads.push(CommentThread { comment, replies });
    }
    threads
}

fn map_topic_conflict(err: TopicRepositoryError) -> TopicServiceError {
    match err {
        TopicRepositoryError::DuplicateTitle { .. } => TopicServiceError::Validation(
            FieldError::new("title", "A topic with this title already exists in this project."),
        ),
        TopicRepositoryError::DuplicateTag { .. } => TopicServiceError::Validation(
            FieldError::new("name", "This tag already exists on this topic."),
        ),
        other => TopicServiceError::Repository(other),
    }
}

/// Topic orchestration service.
pub struct TopicService<T, R, B, C>
where
    T: TopicRepository + ?Sized,
    R: ProjectRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    topics: Arc<T>,
    projects: Arc<R>,
    blobs: Arc<B>,
    clock: Arc<C>,
}

impl<T, R, B, C> Clone for TopicService<T, R, B, C>
where
    T: TopicRepository + ?Sized,
    R: ProjectRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            topics: Arc::clone(&self.topics),
            projects: Arc::clone(&self.projects),
            blobs: Arc::clone(&self.blobs),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, R, B, C> TopicService<T, R, B, C>
where
    T: TopicRepository + ?Sized,
    R: ProjectRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new topic service.
    #[must_use]
    pub const fn new(topics: Arc<T>, projects: Arc<R>, blobs: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            topics,
            projects,
            blobs,
            clock,
        }
    }

    /// Lists a project's topics with content counts and tags.
    ///
    /// # Errors
    ///
    /// Requires the view permission on the project.
    pub async fn list(
        &self,
        caller: UserId,
        project: ProjectId,
    ) -> TopicServiceResult<Vec<TopicOverview>> {
        self.grant(caller, project, Action::View).await?;
        let topics = self.topics.list_topics(project).await?;
        let mut overviews = Vec::with_capacity(topics.len());
        for topic in topics {
            let counts = self.topics.topic_counts(topic.id()).await?;
            let tags = self.topics.list_tags(topic.id()).await?;
            overviews.push(TopicOverview {
                topic,
                counts,
                tags,
            });
        }
        Ok(overviews)
    }

    /// Returns a topic with all of its content.
    ///
    /// # Errors
    ///
    /// Requires the view permission on the project.
    pub async fn detail(&self, caller: UserId, at: TopicPath) -> TopicServiceResult<TopicDetail> {
        let (grant, topic) = self.topic_in(caller, at, Action::View).await?;
        let notes = self.topics.list_notes(at.topic).await?;
        let links = self.topics.list_links(at.topic).await?;
        let media = self.topics.list_media(at.topic).await?;
        let tags = self.topics.list_tags(at.topic).await?;
        let comments = build_threads(self.topics.list_comments(at.topic).await?);
        Ok(TopicDetail {
            grant,
            topic,
            notes,
            links,
            media,
            tags,
            comments,
        })
    }

    /// Creates a topic.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission; a duplicate title is a
    /// [`TopicServiceError::Validation`] error.
    pub async fn create(
        &self,
        caller: UserId,
        project: ProjectId,
        title: String,
        description: String,
        color: Option<&str>,
    ) -> TopicServiceResult<Topic> {
        self.grant(caller, project, Action::Contribute).await?;
        let topic = Topic::create(project, title, description, color, caller, &*self.clock)?;
        self.topics
            .store_topic(&topic)
            .await
            .map_err(map_topic_conflict)?;
        self.log(
            project,
            caller,
            "Created topic",
            format!("Created topic \"{}\"", topic.title()),
        )
        .await?;
        Ok(topic)
    }

    /// Changes a topic.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn update(
        &self,
        caller: UserId,
        at: TopicPath,
        changes: TopicChanges,
    ) -> TopicServiceResult<Topic> {
        let (_, mut topic) = self.topic_in(caller, at, Action::Edit).await?;
        topic.apply(changes, &*self.clock)?;
        self.topics
            .update_topic(&topic)
            .await
            .map_err(map_topic_conflict)?;
        self.log(
            at.project,
            caller,
            "Updated topic",
            format!("Updated topic \"{}\"", topic.title()),
        )
        .await?;
        Ok(topic)
    }

    /// Deletes a topic with all of its content.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete(&self, caller: UserId, at: TopicPath) -> TopicServiceResult<()> {
        let (_, topic) = self.topic_in(caller, at, Action::Edit).await?;
        let keys = self.topics.delete_topic(at.topic).await?;
        self.release_blobs(&keys).await;
        self.log(
            at.project,
            caller,
            "Deleted topic",
            format!("Deleted topic \"{}\"", topic.title()),
        )
        .await?;
        Ok(())
    }

    /// Lists a topic's notes.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn notes(&self, caller: UserId, at: TopicPath) -> TopicServiceResult<Vec<TopicNote>> {
        self.topic_in(caller, at, Action::View).await?;
        Ok(self.topics.list_notes(at.topic).await?)
    }

    /// Returns one note.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn note(
        &self,
        caller: UserId,
        at: TopicPath,
        note_id: TopicNoteId,
    ) -> TopicServiceResult<TopicNote> {
        self.topic_in(caller, at, Action::View).await?;
        self.note_in(at, note_id).await
    }

    /// Adds a note.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn create_note(
        &self,
        caller: UserId,
        at: TopicPath,
        title: String,
        content: String,
    ) -> TopicServiceResult<TopicNote> {
        self.topic_in(caller, at, Action::Contribute).await?;
        let note = TopicNote::new(at.topic, title, content, caller, &*self.clock)?;
        self.topics.save_note(&note).await?;
        self.log(
            at.project,
            caller,
            "Added note",
            format!("Added note \"{}\"", note.title),
        )
        .await?;
        Ok(note)
    }

    /// Edits a note, recording the caller as last editor.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn update_note(
        &self,
        caller: UserId,
        at: TopicPath,
        note_id: TopicNoteId,
        title: Option<String>,
        content: Option<String>,
    ) -> TopicServiceResult<TopicNote> {
        self.topic_in(caller, at, Action::Edit).await?;
        let mut note = self.note_in(at, note_id).await?;
        note.edit(title, content, caller, &*self.clock)?;
        self.topics.save_note(&note).await?;
        self.log(
            at.project,
            caller,
            "Updated note",
            format!("Updated note \"{}\"", note.title),
        )
        .await?;
        Ok(note)
    }

    /// Deletes a note.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete_note(
        &self,
        caller: UserId,
        at: TopicPath,
        note_id: TopicNoteId,
    ) -> TopicServiceResult<()> {
        self.topic_in(caller, at, Action::Edit).await?;
        let note = self.note_in(at, note_id).await?;
        self.topics.delete_note(note.id).await?;
        self.log(
            at.project,
            caller,
            "Deleted note",
            format!("Deleted note \"{}\"", note.title),
        )
        .await?;
        Ok(())
    }

    /// Lists a topic's links.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn links(&self, caller: UserId, at: TopicPath) -> TopicServiceResult<Vec<TopicLink>> {
        self.topic_in(caller, at, Action::View).await?;
        Ok(self.topics.list_links(at.topic).await?)
    }

    /// Returns one link.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn link(
        &self,
        caller: UserId,
        at: TopicPath,
        link_id: TopicLinkId,
    ) -> TopicServiceResult<TopicLink> {
        self.topic_in(caller, at, Action::View).await?;
        self.link_in(at, link_id).await
    }

    /// Adds a link.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn create_link(
        &self,
        caller: UserId,
        at: TopicPath,
        title: String,
        url: String,
        description: String,
        link_type: LinkType,
    ) -> TopicServiceResult<TopicLink> {
        self.topic_in(caller, at, Action::Contribute).await?;
        let link = TopicLink::new(
            at.topic,
            title,
            url,
            description,
            link_type,
            caller,
            &*self.clock,
        )?;
        self.topics.save_link(&link).await?;
        self.log(
            at.project,
            caller,
            "Added link",
            format!("Added link \"{}\"", link.title),
        )
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
        at: TopicPath,
        link_id: TopicLinkId,
        changes: TopicLinkChanges,
    ) -> TopicServiceResult<TopicLink> {
        self.topic_in(caller, at, Action::Edit).await?;
        let mut link = self.link_in(at, link_id).await?;
        link.apply(changes, &*self.clock)?;
        self.topics.save_link(&link).await?;
        self.log(
            at.project,
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
        at: TopicPath,
        link_id: TopicLinkId,
    ) -> TopicServiceResult<()> {
        self.topic_in(caller, at, Action::Edit).await?;
        let link = self.link_in(at, link_id).await?;
        self.topics.delete_link(link.id).await?;
        self.log(
            at.project,
            caller,
            "Deleted link",
            format!("Deleted link \"{}\"", link.title),
        )
        .await?;
        Ok(())
    }

    /// Lists a topic's media.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn media(
        &self,
        caller: UserId,
        at: TopicPath,
    ) -> TopicServiceResult<Vec<TopicMedia>> {
        self.topic_in(caller, at, Action::View).await?;
        Ok(self.topics.list_media(at.topic).await?)
    }

    /// Returns one media item.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn media_item(
        &self,
        caller: UserId,
        at: TopicPath,
        media_id: TopicMediaId,
    ) -> TopicServiceResult<TopicMedia> {
        self.topic_in(caller, at, Action::View).await?;
        self.media_in(at, media_id).await
    }

    /// Stores an upload as topic media.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission.
    pub async fn upload_media(
        &self,
        caller: UserId,
        at: TopicPath,
        input: NewTopicMedia,
        upload: Upload,
    ) -> TopicServiceResult<TopicMedia> {
        self.topic_in(caller, at, Action::Contribute).await?;
        let stored = self.blobs.put(MEDIA_NAMESPACE, upload).await?;
        let key = stored.storage_key.clone();
        let media = match TopicMedia::new(at.topic, input, stored, caller, &*self.clock) {
            Ok(media) => media,
            Err(err) => {
                self.release_blobs(&[key]).await;
                return Err(err.into());
            }
        };
        self.topics.save_media(&media).await?;
        self.log(
            at.project,
            caller,
            "Uploaded media",
            format!("Uploaded {} \"{}\"", media.media_type, media.title),
        )
        .await?;
        Ok(media)
    }

    /// Changes a media item's title and description.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn update_media(
        &self,
        caller: UserId,
        at: TopicPath,
        media_id: TopicMediaId,
        title: Option<String>,
        description: Option<String>,
    ) -> TopicServiceResult<TopicMedia> {
        self.topic_in(caller, at, Action::Edit).await?;
        let mut media = self.media_in(at, media_id).await?;
        media.describe(title, description)?;
        self.topics.save_media(&media).await?;
        self.log(
            at.project,
            caller,
            "Updated media",
            format!("Updated \"{}\"", media.title),
        )
        .await?;
        Ok(media)
    }

    /// Returns a media item with its content.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn download_media(
        &self,
        caller: UserId,
        at: TopicPath,
        media_id: TopicMediaId,
    ) -> TopicServiceResult<(TopicMedia, Vec<u8>)> {
        self.topic_in(caller, at, Action::View).await?;
        let media = self.media_in(at, media_id).await?;
        let bytes = self
            .blobs
            .get(&media.file.storage_key)
            .await?
            .ok_or(TopicServiceError::NotFound("media content"))?;
        Ok((media, bytes))
    }

    /// Deletes a media item and its content.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete_media(
        &self,
        caller: UserId,
        at: TopicPath,
        media_id: TopicMediaId,
    ) -> TopicServiceResult<()> {
        self.topic_in(caller, at, Action::Edit).await?;
        let media = self.media_in(at, media_id).await?;
        self.topics.delete_media(media.id).await?;
        self.release_blobs(&[media.file.storage_key.clone()]).await;
        self.log(
            at.project,
            caller,
            "Deleted media",
            format!("Deleted \"{}\"", media.title),
        )
        .await?;
        Ok(())
    }

    /// Lists a topic's tags.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn tags(&self, caller: UserId, at: TopicPath) -> TopicServiceResult<Vec<TopicTag>> {
        self.topic_in(caller, at, Action::View).await?;
        Ok(self.topics.list_tags(at.topic).await?)
    }

    /// Returns one tag.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn tag(
        &self,
        caller: UserId,
        at: TopicPath,
        tag_id: TopicTagId,
    ) -> TopicServiceResult<TopicTag> {
        self.topic_in(caller, at, Action::View).await?;
        self.tag_in(at, tag_id).await
    }

    /// Adds a tag.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission; a duplicate name is a
    /// [`TopicServiceError::Validation`] error.
    pub async fn create_tag(
        &self,
        caller: UserId,
        at: TopicPath,
        name: String,
        color: Option<&str>,
    ) -> TopicServiceResult<TopicTag> {
        self.topic_in(caller, at, Action::Contribute).await?;
        let tag = TopicTag::new(at.topic, name, color, &*self.clock)?;
        self.topics.save_tag(&tag).await.map_err(map_topic_conflict)?;
        Ok(tag)
    }

    /// Renames or recolours a tag.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn update_tag(
        &self,
        caller: UserId,
        at: TopicPath,
        tag_id: TopicTagId,
        name: Option<String>,
        color: Option<&str>,
    ) -> TopicServiceResult<TopicTag> {
        self.topic_in(caller, at, Action::Edit).await?;
        let mut tag = self.tag_in(at, tag_id).await?;
        tag.apply(name, color)?;
        self.topics.save_tag(&tag).await.map_err(map_topic_conflict)?;
        Ok(tag)
    }

    /// Removes a tag.
    ///
    /// # Errors
    ///
    /// Requires the edit permission.
    pub async fn delete_tag(
        &self,
        caller: UserId,
        at: TopicPath,
        tag_id: TopicTagId,
    ) -> TopicServiceResult<()> {
        self.topic_in(caller, at, Action::Edit).await?;
        let tag = self.tag_in(at, tag_id).await?;
        self.topics.delete_tag(tag.id).await?;
        self.log(
            at.project,
            caller,
            "Removed tag",
            format!("Removed tag \"{}\"", tag.name),
        )
        .await?;
        Ok(())
    }

    /// Lists top-level comments with nested replies.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn comments(
        &self,
        caller: UserId,
        at: TopicPath,
    ) -> TopicServiceResult<Vec<CommentThread>> {
        self.topic_in(caller, at, Action::View).await?;
        Ok(build_threads(self.topics.list_comments(at.topic).await?))
    }

    /// Posts a comment or reply; any project member may comment.
    ///
    /// # Errors
    ///
    /// Requires the view permission; a parent from another topic is a
    /// domain error.
    pub async fn create_comment(
        &self,
        caller: UserId,
        at: TopicPath,
        content: String,
        parent: Option<TopicCommentId>,
    ) -> TopicServiceResult<TopicComment> {
        self.topic_in(caller, at, Action::View).await?;
        let parent_comment = match parent {
            Some(id) => Some(
                self.topics
                    .find_comment(id)
                    .await?
                    .ok_or(TopicServiceError::NotFound("parent comment"))?,
            ),
            None => None,
        };
        let comment = TopicComment::new(
            at.topic,
            caller,
            content,
            parent_comment.as_ref(),
            &*self.clock,
        )?;
        self.topics.save_comment(&comment).await?;
        Ok(comment)
    }

    /// Edits a comment; only its author may do so.
    ///
    /// # Errors
    ///
    /// Returns [`TopicServiceError::NotAuthor`] for other callers.
    pub async fn update_comment(
        &self,
        caller: UserId,
        at: TopicPath,
        comment_id: TopicCommentId,
        content: String,
    ) -> TopicServiceResult<TopicComment> {
        self.topic_in(caller, at, Action::View).await?;
        let mut comment = self.comment_in(at, comment_id).await?;
        if comment.author != caller {
            return Err(TopicServiceError::NotAuthor);
        }
        comment.edit(content, &*self.clock)?;
        self.topics.save_comment(&comment).await?;
        Ok(comment)
    }

    /// Deletes a comment and its replies; allowed for the author and for
    /// callers with the edit permission.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Forbidden`] for other callers.
    pub async fn delete_comment(
        &self,
        caller: UserId,
        at: TopicPath,
        comment_id: TopicCommentId,
    ) -> TopicServiceResult<()> {
        let (grant, _) = self.topic_in(caller, at, Action::View).await?;
        let comment = self.comment_in(at, comment_id).await?;
        if comment.author != caller {
            PROJECT_POLICY.authorize(Some(grant.role), Action::Edit)?;
        }
        self.topics.delete_comment(comment.id).await?;
        Ok(())
    }

    async fn grant(
        &self,
        caller: UserId,
        project: ProjectId,
        action: Action,
    ) -> TopicServiceResult<ProjectGrant> {
        let grant = resolve_project_grant(&*self.projects, project, caller).await?;
        PROJECT_POLICY.authorize(grant.as_ref().map(|found| found.role), action)?;
        grant.ok_or(TopicServiceError::Access(AccessError::NotVisible))
    }

    async fn topic_in(
        &self,
        caller: UserId,
        at: TopicPath,
        action: Action,
    ) -> TopicServiceResult<(ProjectGrant, Topic)> {
        let grant = self.grant(caller, at.project, action).await?;
        let topic = self
            .topics
            .find_topic(at.topic)
            .await?
            .filter(|topic| topic.project_id() == at.project)
            .ok_or(TopicServiceError::NotFound("topic"))?;
        Ok((grant, topic))
    }

    async fn note_in(&self, at: TopicPath, id: TopicNoteId) -> TopicServiceResult<TopicNote> {
        self.topics
            .find_note(id)
            .await?
            .filter(|note| note.topic_id == at.topic)
            .ok_or(TopicServiceError::NotFound("note"))
    }

    async fn link_in(&self, at: TopicPath, id: TopicLinkId) -> TopicServiceResult<TopicLink> {
        self.topics
            .find_link(id)
            .await?
            .filter(|link| link.topic_id == at.topic)
            .ok_or(TopicServiceError::NotFound("link"))
    }

    async fn media_in(&self, at: TopicPath, id: TopicMediaId) -> TopicServiceResult<TopicMedia> {
        self.topics
            .find_media(id)
            .await?
            .filter(|media| media.topic_id == at.topic)
            .ok_or(TopicServiceError::NotFound("media"))
    }

    async fn tag_in(&self, at: TopicPath, id: TopicTagId) -> TopicServiceResult<TopicTag> {
        self.topics
            .find_tag(id)
            .await?
            .filter(|tag| tag.topic_id == at.topic)
            .ok_or(TopicServiceError::NotFound("tag"))
    }

    async fn comment_in(
        &self,
        at: TopicPath,
        id: TopicCommentId,
    ) -> TopicServiceResult<TopicComment> {
        self.topics
            .find_comment(id)
            .await?
            .filter(|comment| comment.topic_id == at.topic)
            .ok_or(TopicServiceError::NotFound("comment"))
    }

    async fn log(
        &self,
        project: ProjectId,
        caller: UserId,
        action: &str,
        description: String,
    ) -> TopicServiceResult<()> {
        let activity = ProjectActivity::record(project, caller, action, description, &*self.clock)?;
        self.projects.record_activity(&activity).await?;
        Ok(())
    }

    async fn release_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.blobs.delete(key).await {
                tracing::warn!(storage_key = %key, error = %err, "failed to release blob");
            }
        }
    }
}
