//! `/api/tasks/task-lists`: project and personal task lists.

use super::error::ApiResult;
use super::extract::{CurrentUser, Params, Payload};
use super::state::AppState;
use super::views::Message;
use crate::project::domain::ProjectId;
use crate::task::{
    domain::{ListScope, TaskId, TaskList, TaskListChanges, TaskListId},
    services::{NewTaskList, TaskListOverview},
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/task-lists", get(list).post(create))
        .route(
            "/task-lists/{list_id}",
            get(detail).patch(update).delete(remove),
        )
        .route("/task-lists/{list_id}/reorder", post(reorder))
}

#[derive(Debug, Serialize)]
struct TaskListView {
    #[serde(flatten)]
    list: TaskList,
    tasks_count: usize,
    completed_tasks_count: usize,
}

impl From<TaskListOverview> for TaskListView {
    fn from(overview: TaskListOverview) -> Self {
        Self {
            list: overview.list,
            tasks_count: overview.counts.tasks,
            completed_tasks_count: overview.counts.completed_tasks,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    project: Option<ProjectId>,
}

#[derive(Debug, Deserialize)]
struct CreateList {
    #[serde(default)]
    project: Option<ProjectId>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    position: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateList {
    name: Option<String>,
    description: Option<String>,
    position: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReorderBody {
    task_ids: Vec<TaskId>,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Params(params): Params<ListParams>,
) -> ApiResult<Json<Vec<TaskListView>>> {
    let scope = params
        .project
        .map_or(ListScope::Personal(user.id()), ListScope::Project);
    let lists = state.tasks.lists(user.id(), scope).await?;
    Ok(Json(lists.into_iter().map(TaskListView::from).collect()))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<CreateList>,
) -> ApiResult<(StatusCode, Json<TaskListView>)> {
    let input = NewTaskList {
        project: body.project,
        name: body.name,
        description: body.description,
        position: body.position,
    };
    let created = state.tasks.create_list(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(list_id): Path<TaskListId>,
) -> ApiResult<Json<TaskListView>> {
    Ok(Json(state.tasks.get_list(user.id(), list_id).await?.into()))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(list_id): Path<TaskListId>,
    Payload(body): Payload<UpdateList>,
) -> ApiResult<Json<TaskListView>> {
    let changes = TaskListChanges {
        name: body.name,
        description: body.description,
        position: body.position,
    };
    let updated = state.tasks.update_list(user.id(), list_id, changes).await?;
    Ok(Json(updated.into()))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(list_id): Path<TaskListId>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_list(user.id(), list_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(list_id): Path<TaskListId>,
    Payload(body): Payload<ReorderBody>,
) -> ApiResult<Json<Message>> {
    state
        .tasks
        .reorder(user.id(), list_id, &body.task_ids)
        .await?;
    Ok(Json(Message::new("Tasks reordered successfully")))
}
