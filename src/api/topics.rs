//! `/api/projects/{project_id}/topics`: knowledge topics and their content.

use super::error::{ApiError, ApiResult};
use super::extract::{CurrentUser, Payload, UploadForm};
use super::state::AppState;
use super::views::{Download, ThreadView};
use crate::access::{AccessRole, Permissions};
use crate::account::domain::UserId;
use crate::project::{
    domain::{
        LinkType, NewTopicMedia, ProjectId, Topic, TopicChanges, TopicComment, TopicCommentId,
        TopicCounts, TopicId, TopicLink, TopicLinkChanges, TopicLinkId, TopicMedia,
        TopicMediaId, TopicNote, TopicNoteId, TopicTag, TopicTagId,
    },
    services::{CommentThread, TopicDetail, TopicOverview, TopicPath},
};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TOPIC: &str = "/{project_id}/topics/{topic_id}";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/{project_id}/topics", get(list).post(create))
        .route(TOPIC, get(detail).patch(update).delete(remove))
        .route(&format!("{TOPIC}/notes"), get(notes).post(create_note))
        .route(
            &format!("{TOPIC}/notes/{{note_id}}"),
            get(note).patch(update_note).delete(delete_note),
        )
        .route(&format!("{TOPIC}/links"), get(links).post(create_link))
        .route(
            &format!("{TOPIC}/links/{{link_id}}"),
            get(link).patch(update_link).delete(delete_link),
        )
        .route(&format!("{TOPIC}/media"), get(media).post(upload_media))
        .route(
            &format!("{TOPIC}/media/{{media_id}}"),
            get(media_item).patch(update_media).delete(delete_media),
        )
        .route(
            &format!("{TOPIC}/media/{{media_id}}/download"),
            get(download_media),
        )
        .route(&format!("{TOPIC}/tags"), get(tags).post(create_tag))
        .route(
            &format!("{TOPIC}/tags/{{tag_id}}"),
            get(tag).patch(update_tag).delete(delete_tag),
        )
        .route(
            &format!("{TOPIC}/comments"),
            get(comments).post(create_comment),
        )
        .route(
            &format!("{TOPIC}/comments/{{comment_id}}"),
            patch(update_comment).delete(delete_comment),
        )
}

#[derive(Debug, Clone, Serialize)]
struct TopicView {
    id: TopicId,
    project_id: ProjectId,
    title: String,
    description: String,
    color: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Topic> for TopicView {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id(),
            project_id: topic.project_id(),
            title: topic.title().to_owned(),
            description: topic.description().to_owned(),
            color: topic.color().as_str().to_owned(),
            created_by: topic.created_by(),
            created_at: topic.created_at(),
            updated_at: topic.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TopicOverviewView {
    #[serde(flatten)]
    topic: TopicView,
    counts: TopicCounts,
    tags: Vec<TopicTag>,
}

impl From<TopicOverview> for TopicOverviewView {
    fn from(overview: TopicOverview) -> Self {
        Self {
            topic: TopicView::from(&overview.topic),
            counts: overview.counts,
            tags: overview.tags,
        }
    }
}

#[derive(Debug, Serialize)]
struct TopicDetailView {
    #[serde(flatten)]
    topic: TopicView,
    notes: Vec<TopicNote>,
    links: Vec<TopicLink>,
    media: Vec<TopicMedia>,
    tags: Vec<TopicTag>,
    comments: Vec<ThreadView<TopicComment>>,
    user_role: AccessRole,
    permissions: Permissions,
}

impl From<TopicDetail> for TopicDetailView {
    fn from(detail: TopicDetail) -> Self {
        Self {
            topic: TopicView::from(&detail.topic),
            user_role: detail.grant.role,
            permissions: detail.grant.permissions(),
            notes: detail.notes,
            links: detail.links,
            media: detail.media,
            tags: detail.tags,
            comments: threads(detail.comments),
        }
    }
}

fn threads(comments: Vec<CommentThread>) -> Vec<ThreadView<TopicComment>> {
    comments
        .into_iter()
        .map(|thread| ThreadView {
            comment: thread.comment,
            replies: threads(thread.replies),
        })
        .collect()
}

const fn at(project: ProjectId, topic: TopicId) -> TopicPath {
    TopicPath { project, topic }
}

#[derive(Debug, Deserialize)]
struct CreateTopic {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateTopic {
    title: Option<String>,
    description: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateNote {
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateNote {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateMedia {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateLink {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    link_type: LinkType,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateLink {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    link_type: Option<LinkType>,
}

#[derive(Debug, Deserialize)]
struct CreateTag {
    name: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateTag {
    name: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateComment {
    content: String,
    #[serde(default)]
    parent: Option<TopicCommentId>,
}

#[derive(Debug, Deserialize)]
struct UpdateComment {
    content: String,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<TopicOverviewView>>> {
    let overviews = state.topics.list(user.id(), project_id).await?;
    Ok(Json(
        overviews.into_iter().map(TopicOverviewView::from).collect(),
    ))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Payload(body): Payload<CreateTopic>,
) -> ApiResult<(StatusCode, Json<TopicView>)> {
    let topic = state
        .topics
        .create(
            user.id(),
            project_id,
            body.title,
            body.description,
            body.color.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TopicView::from(&topic))))
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<Json<TopicDetailView>> {
    let detail = state
        .topics
        .detail(user.id(), at(project_id, topic_id))
        .await?;
    Ok(Json(TopicDetailView::from(detail)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
    Payload(body): Payload<UpdateTopic>,
) -> ApiResult<Json<TopicView>> {
    let changes = TopicChanges {
        title: body.title,
        description: body.description,
        color: body.color,
    };
    let topic = state
        .topics
        .update(user.id(), at(project_id, topic_id), changes)
        .await?;
    Ok(Json(TopicView::from(&topic)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<StatusCode> {
    state
        .topics
        .delete(user.id(), at(project_id, topic_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<Json<Vec<TopicNote>>> {
    Ok(Json(
        state
            .topics
            .notes(user.id(), at(project_id, topic_id))
            .await?,
    ))
}

async fn note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, note_id)): Path<(ProjectId, TopicId, TopicNoteId)>,
) -> ApiResult<Json<TopicNote>> {
    Ok(Json(
        state
            .topics
            .note(user.id(), at(project_id, topic_id), note_id)
            .await?,
    ))
}

async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
    Payload(body): Payload<CreateNote>,
) -> ApiResult<(StatusCode, Json<TopicNote>)> {
    let note = state
        .topics
        .create_note(user.id(), at(project_id, topic_id), body.title, body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, note_id)): Path<(ProjectId, TopicId, TopicNoteId)>,
    Payload(body): Payload<UpdateNote>,
) -> ApiResult<Json<TopicNote>> {
    let note = state
        .topics
        .update_note(
            user.id(),
            at(project_id, topic_id),
            note_id,
            body.title,
            body.content,
        )
        .await?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, note_id)): Path<(ProjectId, TopicId, TopicNoteId)>,
) -> ApiResult<StatusCode> {
    state
        .topics
        .delete_note(user.id(), at(project_id, topic_id), note_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn links(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<Json<Vec<TopicLink>>> {
    Ok(Json(
        state
            .topics
            .links(user.id(), at(project_id, topic_id))
            .await?,
    ))
}

async fn link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, link_id)): Path<(ProjectId, TopicId, TopicLinkId)>,
) -> ApiResult<Json<TopicLink>> {
    Ok(Json(
        state
            .topics
            .link(user.id(), at(project_id, topic_id), link_id)
            .await?,
    ))
}

async fn create_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
    Payload(body): Payload<CreateLink>,
) -> ApiResult<(StatusCode, Json<TopicLink>)> {
    let created = state
        .topics
        .create_link(
            user.id(),
            at(project_id, topic_id),
            body.title,
            body.url,
            body.description,
            body.link_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, link_id)): Path<(ProjectId, TopicId, TopicLinkId)>,
    Payload(body): Payload<UpdateLink>,
) -> ApiResult<Json<TopicLink>> {
    let changes = TopicLinkChanges {
        title: body.title,
        url: body.url,
        description: body.description,
        link_type: body.link_type,
    };
    let updated = state
        .topics
        .update_link(user.id(), at(project_id, topic_id), link_id, changes)
        .await?;
    Ok(Json(updated))
}

async fn delete_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, link_id)): Path<(ProjectId, TopicId, TopicLinkId)>,
) -> ApiResult<StatusCode> {
    state
        .topics
        .delete_link(user.id(), at(project_id, topic_id), link_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<Json<Vec<TopicMedia>>> {
    Ok(Json(
        state
            .topics
            .media(user.id(), at(project_id, topic_id))
            .await?,
    ))
}

async fn media_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, media_id)): Path<(ProjectId, TopicId, TopicMediaId)>,
) -> ApiResult<Json<TopicMedia>> {
    Ok(Json(
        state
            .topics
            .media_item(user.id(), at(project_id, topic_id), media_id)
            .await?,
    ))
}

/// Parses the optional `duration` form field as whole seconds.
fn duration_seconds(raw: &str) -> ApiResult<Option<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ApiError::field("duration", "A valid integer is required."))
}

async fn upload_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<TopicMedia>)> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_upload()?;
    let input = NewTopicMedia {
        title: form.text("title"),
        description: form.text("description"),
        duration_seconds: duration_seconds(&form.text("duration"))?,
    };
    let created = state
        .topics
        .upload_media(user.id(), at(project_id, topic_id), input, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, media_id)): Path<(ProjectId, TopicId, TopicMediaId)>,
    Payload(body): Payload<UpdateMedia>,
) -> ApiResult<Json<TopicMedia>> {
    let updated = state
        .topics
        .update_media(
            user.id(),
            at(project_id, topic_id),
            media_id,
            body.title,
            body.description,
        )
        .await?;
    Ok(Json(updated))
}

async fn download_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, media_id)): Path<(ProjectId, TopicId, TopicMediaId)>,
) -> ApiResult<Download> {
    let (item, bytes) = state
        .topics
        .download_media(user.id(), at(project_id, topic_id), media_id)
        .await?;
    Ok(Download::of(&item.file, bytes))
}

async fn delete_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, media_id)): Path<(ProjectId, TopicId, TopicMediaId)>,
) -> ApiResult<StatusCode> {
    state
        .topics
        .delete_media(user.id(), at(project_id, topic_id), media_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<Json<Vec<TopicTag>>> {
    Ok(Json(
        state
            .topics
            .tags(user.id(), at(project_id, topic_id))
            .await?,
    ))
}

async fn tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, tag_id)): Path<(ProjectId, TopicId, TopicTagId)>,
) -> ApiResult<Json<TopicTag>> {
    Ok(Json(
        state
            .topics
            .tag(user.id(), at(project_id, topic_id), tag_id)
            .await?,
    ))
}

async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
    Payload(body): Payload<CreateTag>,
) -> ApiResult<(StatusCode, Json<TopicTag>)> {
    let created = state
        .topics
        .create_tag(
            user.id(),
            at(project_id, topic_id),
            body.name,
            body.color.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, tag_id)): Path<(ProjectId, TopicId, TopicTagId)>,
    Payload(body): Payload<UpdateTag>,
) -> ApiResult<Json<TopicTag>> {
    let updated = state
        .topics
        .update_tag(
            user.id(),
            at(project_id, topic_id),
            tag_id,
            body.name,
            body.color.as_deref(),
        )
        .await?;
    Ok(Json(updated))
}

async fn delete_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, tag_id)): Path<(ProjectId, TopicId, TopicTagId)>,
) -> ApiResult<StatusCode> {
    state
        .topics
        .delete_tag(user.id(), at(project_id, topic_id), tag_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn comments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
) -> ApiResult<Json<Vec<ThreadView<TopicComment>>>> {
    let found = state
        .topics
        .comments(user.id(), at(project_id, topic_id))
        .await?;
    Ok(Json(threads(found)))
}

async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id)): Path<(ProjectId, TopicId)>,
    Payload(body): Payload<CreateComment>,
) -> ApiResult<(StatusCode, Json<TopicComment>)> {
    let created = state
        .topics
        .create_comment(
            user.id(),
            at(project_id, topic_id),
            body.content,
            body.parent,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, comment_id)): Path<(ProjectId, TopicId, TopicCommentId)>,
    Payload(body): Payload<UpdateComment>,
) -> ApiResult<Json<TopicComment>> {
    let updated = state
        .topics
        .update_comment(user.id(), at(project_id, topic_id), comment_id, body.content)
        .await?;
    Ok(Json(updated))
}

async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, topic_id, comment_id)): Path<(ProjectId, TopicId, TopicCommentId)>,
) -> ApiResult<StatusCode> {
    state
        .topics
        .delete_comment(user.id(), at(project_id, topic_id), comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
