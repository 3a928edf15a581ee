//! `/api/projects`: projects, members, files, links and activity.

use super::error::{ApiError, ApiResult};
use super::extract::{CurrentUser, Payload, UploadForm, nullable};
use super::state::AppState;
use super::views::{Download, MemberView};
use crate::access::{AccessRole, Action, MemberRole, Permissions};
use crate::account::domain::UserId;
use crate::project::{
    domain::{
        LinkChanges, MembershipId, NewProject, Project, ProjectActivity, ProjectChanges,
        ProjectFile, ProjectFileId, ProjectId, ProjectLink, ProjectLinkId, ProjectMembership,
        ProjectPriority, ProjectStatus,
    },
    services::{ProjectGrant, ProjectStats},
};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Routes mounted under `/api/projects`, topics included.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{project_id}", get(detail).patch(update).delete(remove))
        .route("/{project_id}/members", get(members).post(add_member))
        .route(
            "/{project_id}/members/{member_id}",
            patch(change_member).delete(remove_member),
        )
        .route("/{project_id}/files", get(files).post(upload_file))
        .route(
            "/{project_id}/files/{file_id}",
            get(download_file).delete(delete_file),
        )
        .route("/{project_id}/links", get(links).post(create_link))
        .route(
            "/{project_id}/links/{link_id}",
            get(link).patch(update_link).delete(delete_link),
        )
        .route(
            "/{project_id}/activities",
            get(activities).post(record_activity),
        )
        .merge(super::topics::routes())
}

/// Project with the caller's role and permission flags.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
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
    user_role: AccessRole,
    permissions: Permissions,
}

impl ProjectView {
    fn of(project: &Project, role: AccessRole, permissions: Permissions) -> Self {
        Self {
            id: project.id(),
            title: project.title().to_owned(),
            description: project.description().to_owned(),
            status: project.status(),
            priority: project.priority(),
            owner: project.owner(),
            due_date: project.due_date(),
            progress: project.progress(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
            user_role: role,
            permissions,
        }
    }
}

impl From<&ProjectGrant> for ProjectView {
    fn from(grant: &ProjectGrant) -> Self {
        Self::of(&grant.project, grant.role, grant.permissions())
    }
}

#[derive(Debug, Deserialize)]
struct CreateProject {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: ProjectStatus,
    #[serde(default)]
    priority: ProjectPriority,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    progress: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateProject {
    title: Option<String>,
    description: Option<String>,
    status: Option<ProjectStatus>,
    priority: Option<ProjectPriority>,
    #[serde(deserialize_with = "nullable")]
    due_date: Option<Option<NaiveDate>>,
    progress: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AddMember {
    email: String,
    #[serde(default)]
    role: MemberRole,
}

#[derive(Debug, Deserialize)]
struct ChangeRole {
    role: MemberRole,
}

#[derive(Debug, Deserialize)]
struct CreateLink {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateLink {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordActivity {
    action: String,
    #[serde(default)]
    description: String,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ProjectView>>> {
    let grants = state.projects.list(user.id()).await?;
    Ok(Json(grants.iter().map(ProjectView::from).collect()))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<CreateProject>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    let input = NewProject {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: body.due_date,
        progress: body.progress,
    };
    let grant = state.projects.create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(ProjectView::from(&grant))))
}

async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ProjectStats>> {
    Ok(Json(state.projects.stats(user.id()).await?))
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<ProjectView>> {
    let grant = state.projects.get(user.id(), project_id).await?;
    Ok(Json(ProjectView::from(&grant)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Payload(body): Payload<UpdateProject>,
) -> ApiResult<Json<ProjectView>> {
    let changes = ProjectChanges {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: body.due_date,
        progress: body.progress,
    };
    let grant = state
        .projects
        .update(user.id(), project_id, changes)
        .await?;
    Ok(Json(ProjectView::from(&grant)))
}

/// Deleting a project also deletes its tasks and lists and unlinks it from
/// every idea.
///
/// Dependents go first and the project row last. A failure part way leaves
/// the project in place, so repeating the request finishes the cascade.
async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .authorize(user.id(), project_id, Action::Delete)
        .await?;
    state.tasks.purge_project(project_id).await?;
    state.ideas.detach_project(project_id).await?;
    state.projects.delete(user.id(), project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn members(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<MemberView<ProjectMembership>>>> {
    let memberships = state.projects.members(user.id(), project_id).await?;
    let ids: Vec<UserId> = memberships.iter().map(|row| row.user_id).collect();
    let users = state.accounts.summaries(&ids).await?;
    Ok(Json(MemberView::join(
        memberships,
        |row| row.user_id,
        &users,
    )))
}

async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Payload(body): Payload<AddMember>,
) -> ApiResult<(StatusCode, Json<MemberView<ProjectMembership>>)> {
    state
        .projects
        .authorize(user.id(), project_id, Action::ManageMembers)
        .await?;
    let member = state
        .accounts
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| {
            ApiError::field("email", format!("User with email {} not found", body.email))
        })?
        .summary();
    let membership = state
        .projects
        .add_member(user.id(), project_id, &member, body.role)
        .await?;
    let view = MemberView {
        membership,
        user: Some(member),
    };
    Ok((StatusCode::CREATED, Json(view)))
}

async fn change_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, member_id)): Path<(ProjectId, MembershipId)>,
    Payload(body): Payload<ChangeRole>,
) -> ApiResult<Json<ProjectMembership>> {
    let membership = state
        .projects
        .change_member_role(user.id(), project_id, member_id, body.role)
        .await?;
    Ok(Json(membership))
}

async fn remove_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, member_id)): Path<(ProjectId, MembershipId)>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .remove_member(user.id(), project_id, member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn files(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<ProjectFile>>> {
    Ok(Json(state.projects.files(user.id(), project_id).await?))
}

async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ProjectFile>)> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_upload()?;
    let file = state
        .projects
        .upload_file(
            user.id(),
            project_id,
            &form.text("title"),
            form.text("description"),
            upload,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(file)))
}

async fn download_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, file_id)): Path<(ProjectId, ProjectFileId)>,
) -> ApiResult<Download> {
    let (file, bytes) = state
        .projects
        .download_file(user.id(), project_id, file_id)
        .await?;
    Ok(Download::of(&file.file, bytes))
}

async fn delete_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, file_id)): Path<(ProjectId, ProjectFileId)>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .delete_file(user.id(), project_id, file_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn links(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<ProjectLink>>> {
    Ok(Json(state.projects.links(user.id(), project_id).await?))
}

async fn link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, link_id)): Path<(ProjectId, ProjectLinkId)>,
) -> ApiResult<Json<ProjectLink>> {
    Ok(Json(
        state.projects.link(user.id(), project_id, link_id).await?,
    ))
}

async fn create_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Payload(body): Payload<CreateLink>,
) -> ApiResult<(StatusCode, Json<ProjectLink>)> {
    let created = state
        .projects
        .create_link(user.id(), project_id, body.title, body.url, body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, link_id)): Path<(ProjectId, ProjectLinkId)>,
    Payload(body): Payload<UpdateLink>,
) -> ApiResult<Json<ProjectLink>> {
    let changes = LinkChanges {
        title: body.title,
        url: body.url,
        description: body.description,
    };
    let updated = state
        .projects
        .update_link(user.id(), project_id, link_id, changes)
        .await?;
    Ok(Json(updated))
}

async fn delete_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, link_id)): Path<(ProjectId, ProjectLinkId)>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .delete_link(user.id(), project_id, link_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn activities(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<ProjectActivity>>> {
    Ok(Json(state.projects.activities(user.id(), project_id).await?))
}

async fn record_activity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<ProjectId>,
    Payload(body): Payload<RecordActivity>,
) -> ApiResult<(StatusCode, Json<ProjectActivity>)> {
    let entry = state
        .projects
        .record_activity(user.id(), project_id, body.action, body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
