//! `/api/tasks/templates`: reusable task blueprints.

use super::error::ApiResult;
use super::extract::{CurrentUser, Payload, nullable};
use super::state::AppState;
use super::tasks::{TaskDetailView, detail_view};
use crate::account::domain::UserId;
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::task::{
    domain::{
        Hours, NewTemplate, TaskListId, TaskPriority, TaskTemplate, TaskTemplateId,
        TemplateChanges,
    },
    services::TemplateTarget,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list).post(create))
        .route(
            "/templates/{template_id}",
            get(detail).patch(update).delete(remove),
        )
        .route("/templates/{template_id}/create-task", post(create_task))
}

#[derive(Debug, Serialize)]
struct TemplateView {
    id: TaskTemplateId,
    name: String,
    description: String,
    title_template: String,
    description_template: String,
    priority: TaskPriority,
    estimated_hours: Option<Hours>,
    tags: String,
    tag_list: Vec<String>,
    created_by: UserId,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl From<TaskTemplate> for TemplateView {
    fn from(template: TaskTemplate) -> Self {
        Self {
            id: template.id,
            tags: template.tags.to_csv(),
            tag_list: template.tags.items().to_vec(),
            name: template.name,
            description: template.description,
            title_template: template.title_template,
            description_template: template.description_template,
            priority: template.priority,
            estimated_hours: template.estimated_hours,
            created_by: template.created_by,
            is_public: template.is_public,
            created_at: template.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateTemplate {
    name: String,
    #[serde(default)]
    description: String,
    title_template: String,
    #[serde(default)]
    description_template: String,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    estimated_hours: Option<Hours>,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    is_public: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateTemplate {
    name: Option<String>,
    description: Option<String>,
    title_template: Option<String>,
    description_template: Option<String>,
    priority: Option<TaskPriority>,
    #[serde(deserialize_with = "nullable")]
    estimated_hours: Option<Option<Hours>>,
    tags: Option<String>,
    is_public: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TargetBody {
    project_id: Option<ProjectId>,
    idea_id: Option<IdeaId>,
    task_list_id: Option<TaskListId>,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TemplateView>>> {
    let templates = state.tasks.templates(user.id()).await?;
    Ok(Json(templates.into_iter().map(TemplateView::from).collect()))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<CreateTemplate>,
) -> ApiResult<(StatusCode, Json<TemplateView>)> {
    let input = NewTemplate {
        name: body.name,
        description: body.description,
        title_template: body.title_template,
        description_template: body.description_template,
        priority: body.priority,
        estimated_hours: body.estimated_hours,
        tags: body.tags,
        is_public: body.is_public,
    };
    let created = state.tasks.create_template(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(template_id): Path<TaskTemplateId>,
) -> ApiResult<Json<TemplateView>> {
    Ok(Json(state.tasks.template(user.id(), template_id).await?.into()))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(template_id): Path<TaskTemplateId>,
    Payload(body): Payload<UpdateTemplate>,
) -> ApiResult<Json<TemplateView>> {
    let changes = TemplateChanges {
        name: body.name,
        description: body.description,
        title_template: body.title_template,
        description_template: body.description_template,
        priority: body.priority,
        estimated_hours: body.estimated_hours,
        tags: body.tags,
        is_public: body.is_public,
    };
    let updated = state
        .tasks
        .update_template(user.id(), template_id, changes)
        .await?;
    Ok(Json(updated.into()))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(template_id): Path<TaskTemplateId>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_template(user.id(), template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `{}` places the new task outside any project, idea or list.
async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(template_id): Path<TaskTemplateId>,
    Payload(body): Payload<TargetBody>,
) -> ApiResult<(StatusCode, Json<TaskDetailView>)> {
    let target = TemplateTarget {
        project: body.project_id,
        idea: body.idea_id,
        task_list: body.task_list_id,
    };
    let grant = state
        .tasks
        .create_from_template(user.id(), &user.display_name(), template_id, target)
        .await?;
    let view = detail_view(&state, user.id(), grant.task.id()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
