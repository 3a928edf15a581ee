//! `/api/tasks/tasks`: tasks, bulk changes, reporting and the records hung
//! off a task.

use super::error::{ApiError, ApiResult};
use super::extract::{CurrentUser, Params, Payload, UploadForm, nullable};
use super::state::AppState;
use super::views::{Download, Message, ThreadView};
use crate::access::{AccessRole, Permissions};
use crate::account::domain::{UserId, UserSummary};
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::shared::Tags;
use crate::task::{
    domain::{
        AssigneeFilter, ContextFilter, ContextType, DueFilter, Hours, NewTask, RelationChanges,
        TaskActivity, TaskAttachment, TaskAttachmentId, TaskChanges, TaskComment, TaskCommentId,
        TaskFilter, TaskId, TaskListId, TaskPriority, TaskScope, TaskStatus, TaskTimeLog,
        TimeLogChanges, TimeLogId,
    },
    services::{
        BulkAction, CompleteOutcome, ContextCounts, IdeaRef, NewTimeLog, ProjectRef,
        TaskCommentThread, TaskDetail, TaskOverview, TaskStats, TaskSummaryCounts,
    },
};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list).post(create))
        .route("/tasks/dashboard", get(dashboard))
        .route("/tasks/stats", get(stats))
        .route("/tasks/bulk", post(bulk))
        .route(
            "/tasks/{task_id}",
            get(detail).patch(update).delete(remove),
        )
        .route("/tasks/{task_id}/complete", post(complete))
        .route("/tasks/{task_id}/activities", get(activities))
        .route(
            "/tasks/{task_id}/comments",
            get(comments).post(create_comment),
        )
        .route(
            "/tasks/{task_id}/comments/{comment_id}",
            patch(update_comment).delete(delete_comment),
        )
        .route(
            "/tasks/{task_id}/attachments",
            get(attachments).post(upload_attachment),
        )
        .route(
            "/tasks/{task_id}/attachments/{attachment_id}",
            get(download_attachment).delete(delete_attachment),
        )
        .route(
            "/tasks/{task_id}/time-logs",
            get(time_logs).post(log_time),
        )
        .route(
            "/tasks/{task_id}/time-logs/{log_id}",
            patch(update_time_log).delete(delete_time_log),
        )
}

/// Public identities of the people a set of tasks refers to.
pub(super) type People = HashMap<UserId, UserSummary>;

/// Loads the creators and assignees of `overviews`.
pub(super) async fn people<'a>(
    state: &AppState,
    overviews: impl IntoIterator<Item = &'a TaskOverview>,
) -> ApiResult<People> {
    let mut ids = Vec::new();
    for overview in overviews {
        let task = &overview.grant.task;
        ids.push(task.created_by());
        ids.extend(task.assignee());
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(state.accounts.summaries(&ids).await?)
}

/// Task as listed, with derived values and the caller's permissions.
#[derive(Debug, Serialize)]
pub(super) struct TaskView {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    start_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    estimated_hours: Option<Hours>,
    actual_hours: Option<Hours>,
    position: u32,
    tags: String,
    tag_list: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee: Option<UserSummary>,
    created_by: Option<UserSummary>,
    task_list: Option<TaskListId>,
    project: Option<ProjectRef>,
    idea: Option<IdeaRef>,
    parent_task: Option<TaskId>,
    dependency_ids: Vec<TaskId>,
    is_overdue: bool,
    progress_percentage: u8,
    context_type: ContextType,
    context_display: String,
    subtasks_count: usize,
    comments_count: usize,
    attachments_count: usize,
    user_role: AccessRole,
    permissions: Permissions,
}

impl TaskView {
    pub(super) fn new(overview: &TaskOverview, now: DateTime<Utc>, people: &People) -> Self {
        let grant = &overview.grant;
        let task = &grant.task;
        let person = |id: UserId| people.get(&id).cloned();
        Self {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            priority: task.priority(),
            due_date: task.due_date(),
            start_date: task.start_date(),
            completed_at: task.completed_at(),
            estimated_hours: task.estimated_hours(),
            actual_hours: task.actual_hours(),
            position: task.position(),
            tags: task.tags().to_csv(),
            tag_list: task.tags().items().to_vec(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            assignee: task.assignee().and_then(person),
            created_by: person(task.created_by()),
            task_list: task.task_list(),
            project: grant.context.project.clone(),
            idea: grant.context.idea.clone(),
            parent_task: task.parent_task(),
            dependency_ids: task.dependencies().to_vec(),
            is_overdue: task.is_overdue(now),
            progress_percentage: overview.progress(),
            context_type: task.context_type(),
            context_display: grant.context.display(),
            subtasks_count: overview.counts.subtasks,
            comments_count: overview.counts.comments,
            attachments_count: overview.counts.attachments,
            user_role: grant.role,
            permissions: grant.permissions(),
        }
    }

    pub(super) fn many(
        overviews: &[TaskOverview],
        now: DateTime<Utc>,
        people: &People,
    ) -> Vec<Self> {
        overviews
            .iter()
            .map(|overview| Self::new(overview, now, people))
            .collect()
    }
}

/// Task with its related work.
#[derive(Debug, Serialize)]
pub(super) struct TaskDetailView {
    #[serde(flatten)]
    task: TaskView,
    parent: Option<TaskView>,
    subtasks: Vec<TaskView>,
    dependencies: Vec<TaskView>,
    dependent_tasks: Vec<TaskView>,
    blocked_dependencies: Vec<TaskView>,
    can_start: bool,
    total_time_logged: String,
}

/// Loads the detail of `id` for the caller and renders it.
pub(super) async fn detail_view(
    state: &AppState,
    caller: UserId,
    id: TaskId,
) -> ApiResult<TaskDetailView> {
    let detail = state.tasks.detail(caller, id).await?;
    let related = std::iter::once(&detail.overview)
        .chain(detail.parent.iter())
        .chain(detail.subtasks.iter())
        .chain(detail.dependencies.iter())
        .chain(detail.dependents.iter());
    let people = people(state, related).await?;
    let now = state.now();
    let TaskDetail {
        overview,
        parent,
        subtasks,
        dependencies,
        dependents,
        blocked_dependencies,
        can_start,
        total_time_logged,
    } = detail;
    Ok(TaskDetailView {
        task: TaskView::new(&overview, now, &people),
        parent: parent.map(|found| TaskView::new(&found, now, &people)),
        subtasks: TaskView::many(&subtasks, now, &people),
        dependencies: TaskView::many(&dependencies, now, &people),
        dependent_tasks: TaskView::many(&dependents, now, &people),
        blocked_dependencies: TaskView::many(&blocked_dependencies, now, &people),
        can_start,
        total_time_logged,
    })
}

#[derive(Debug, Serialize)]
struct DashboardView {
    my_tasks_summary: TaskSummaryCounts,
    by_context: ContextCounts,
    recent_tasks: Vec<TaskView>,
    upcoming_deadlines: Vec<TaskView>,
}

#[derive(Debug, Serialize)]
struct BulkResult {
    message: String,
    updated_count: usize,
}

/// Scope and filter query shared by listing and statistics.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    project: Option<ProjectId>,
    idea: Option<IdeaId>,
    task_list: Option<TaskListId>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    assignee: Option<String>,
    context: Option<ContextFilter>,
    search: Option<String>,
    due: Option<DueFilter>,
}

impl ListParams {
    fn scope(&self, caller: UserId) -> TaskScope {
        match (self.task_list, self.project, self.idea) {
            (Some(list), _, _) => TaskScope::List(list),
            (None, Some(project), _) => TaskScope::Project(project),
            (None, None, Some(idea)) => TaskScope::Idea(idea),
            (None, None, None) => TaskScope::Personal(caller),
        }
    }

    fn filter(self) -> ApiResult<TaskFilter> {
        let assignee = self
            .assignee
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_assignee)
            .transpose()?;
        Ok(TaskFilter {
            status: self.status,
            priority: self.priority,
            assignee,
            context: self.context,
            search: self.search,
            due: self.due,
        })
    }
}

fn parse_assignee(raw: &str) -> ApiResult<AssigneeFilter> {
    match raw.to_ascii_lowercase().as_str() {
        "me" => Ok(AssigneeFilter::Me),
        "unassigned" => Ok(AssigneeFilter::Unassigned),
        _ => Uuid::parse_str(raw)
            .map(|id| AssigneeFilter::User(UserId::from_uuid(id)))
            .map_err(|_| ApiError::field("assignee", "Expected me, unassigned or a user id.")),
    }
}

#[derive(Debug, Deserialize)]
struct CreateTask {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    estimated_hours: Option<Hours>,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    assignee_id: Option<UserId>,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    idea_id: Option<IdeaId>,
    #[serde(default)]
    task_list_id: Option<TaskListId>,
    #[serde(default)]
    parent_task_id: Option<TaskId>,
    #[serde(default)]
    dependency_ids: Option<Vec<TaskId>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateTask {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    #[serde(deserialize_with = "nullable")]
    due_date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "nullable")]
    start_date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "nullable")]
    estimated_hours: Option<Option<Hours>>,
    tags: Option<String>,
    #[serde(deserialize_with = "nullable")]
    assignee_id: Option<Option<UserId>>,
    #[serde(deserialize_with = "nullable")]
    project_id: Option<Option<ProjectId>>,
    #[serde(deserialize_with = "nullable")]
    idea_id: Option<Option<IdeaId>>,
    #[serde(deserialize_with = "nullable")]
    task_list_id: Option<Option<TaskListId>>,
    #[serde(deserialize_with = "nullable")]
    parent_task_id: Option<Option<TaskId>>,
    dependency_ids: Option<Vec<TaskId>>,
}

#[derive(Debug, Deserialize)]
struct BulkBody {
    #[serde(default)]
    task_ids: Vec<TaskId>,
    action: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct CreateComment {
    content: String,
    #[serde(default)]
    parent: Option<TaskCommentId>,
}

#[derive(Debug, Deserialize)]
struct UpdateComment {
    content: String,
}

#[derive(Debug, Deserialize)]
struct CreateTimeLog {
    #[serde(default)]
    description: String,
    hours: Hours,
    date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateTimeLog {
    description: Option<String>,
    hours: Option<Hours>,
    date: Option<NaiveDate>,
}

/// Rejects an assignee that does not name an active account.
pub(super) async fn check_assignee(
    state: &AppState,
    field: &'static str,
    assignee: Option<UserId>,
) -> ApiResult<()> {
    if let Some(id) = assignee
        && state.accounts.find_active(id).await?.is_none()
    {
        return Err(ApiError::field(field, "User not found"));
    }
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Params(params): Params<ListParams>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let scope = params.scope(user.id());
    let filter = params.filter()?;
    let overviews = state.tasks.list(user.id(), scope, &filter).await?;
    let people = people(&state, &overviews).await?;
    Ok(Json(TaskView::many(&overviews, state.now(), &people)))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<CreateTask>,
) -> ApiResult<(StatusCode, Json<TaskDetailView>)> {
    check_assignee(&state, "assignee_id", body.assignee_id).await?;
    let input = NewTask {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: body.due_date,
        start_date: body.start_date,
        estimated_hours: body.estimated_hours,
        tags: body.tags,
        assignee: body.assignee_id,
    };
    let relations = RelationChanges {
        project: body.project_id.map(Some),
        idea: body.idea_id.map(Some),
        task_list: body.task_list_id.map(Some),
        parent_task: body.parent_task_id.map(Some),
        dependencies: body.dependency_ids,
    };
    let grant = state.tasks.create(user.id(), input, relations).await?;
    let view = detail_view(&state, user.id(), grant.task.id()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<DashboardView>> {
    let board = state.tasks.dashboard(user.id()).await?;
    let people = people(
        &state,
        board.recent_tasks.iter().chain(&board.upcoming_deadlines),
    )
    .await?;
    let now = state.now();
    Ok(Json(DashboardView {
        my_tasks_summary: board.my_tasks_summary,
        by_context: board.by_context,
        recent_tasks: TaskView::many(&board.recent_tasks, now, &people),
        upcoming_deadlines: TaskView::many(&board.upcoming_deadlines, now, &people),
    }))
}

async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Params(params): Params<ListParams>,
) -> ApiResult<Json<TaskStats>> {
    let scope = params.scope(user.id());
    Ok(Json(state.tasks.stats(user.id(), scope).await?))
}

fn required_value(body: &BulkBody) -> ApiResult<&str> {
    let value = body.value.trim();
    if value.is_empty() {
        return Err(ApiError::field(
            "value",
            format!("Value is required for action: {}", body.action),
        ));
    }
    Ok(value)
}

fn parse_uuid(value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| ApiError::field("value", "Must be a valid UUID."))
}

async fn bulk_action(state: &AppState, body: &BulkBody) -> ApiResult<BulkAction> {
    let action = match body.action.as_str() {
        "update_status" => BulkAction::UpdateStatus(
            TaskStatus::try_from(required_value(body)?)
                .map_err(|_| ApiError::field("value", "Invalid status value"))?,
        ),
        "update_priority" => BulkAction::UpdatePriority(
            TaskPriority::try_from(required_value(body)?)
                .map_err(|_| ApiError::field("value", "Invalid priority value"))?,
        ),
        "update_assignee" => {
            let user = UserId::from_uuid(parse_uuid(required_value(body)?)?);
            check_assignee(state, "value", Some(user)).await?;
            BulkAction::UpdateAssignee(user)
        }
        "update_task_list" => BulkAction::UpdateTaskList(TaskListId::from_uuid(parse_uuid(
            required_value(body)?,
        )?)),
        "add_tags" => BulkAction::AddTags(Tags::parse("value", &body.value)?),
        "remove_tags" => BulkAction::RemoveTags(Tags::parse("value", &body.value)?),
        "delete" => BulkAction::Delete,
        other => {
            return Err(ApiError::field(
                "action",
                format!("\"{other}\" is not a valid choice."),
            ));
        }
    };
    Ok(action)
}

async fn bulk(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<BulkBody>,
) -> ApiResult<Json<BulkResult>> {
    let action = bulk_action(&state, &body).await?;
    let name = action.as_str();
    let count = state.tasks.bulk(user.id(), body.task_ids, action).await?;
    Ok(Json(BulkResult {
        message: format!("Successfully {name} {count} tasks"),
        updated_count: count,
    }))
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<TaskDetailView>> {
    Ok(Json(detail_view(&state, user.id(), task_id).await?))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
    Payload(body): Payload<UpdateTask>,
) -> ApiResult<Json<TaskDetailView>> {
    check_assignee(&state, "assignee_id", body.assignee_id.flatten()).await?;
    let changes = TaskChanges {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: body.due_date,
        start_date: body.start_date,
        estimated_hours: body.estimated_hours,
        tags: body.tags,
        assignee: body.assignee_id,
    };
    let relations = RelationChanges {
        project: body.project_id,
        idea: body.idea_id,
        task_list: body.task_list_id,
        parent_task: body.parent_task_id,
        dependencies: body.dependency_ids,
    };
    state
        .tasks
        .update(user.id(), task_id, changes, relations)
        .await?;
    Ok(Json(detail_view(&state, user.id(), task_id).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(user.id(), task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Message>> {
    let message = match state.tasks.complete(user.id(), task_id).await? {
        CompleteOutcome::Completed(_) => "Task completed successfully",
        CompleteOutcome::AlreadyDone => "Task is already completed",
    };
    Ok(Json(Message::new(message)))
}

async fn activities(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<TaskActivity>>> {
    Ok(Json(state.tasks.activities(user.id(), task_id).await?))
}

fn threads(comments: Vec<TaskCommentThread>) -> Vec<ThreadView<TaskComment>> {
    comments
        .into_iter()
        .map(|thread| ThreadView {
            comment: thread.comment,
            replies: threads(thread.replies),
        })
        .collect()
}

async fn comments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<ThreadView<TaskComment>>>> {
    let found = state.tasks.comments(user.id(), task_id).await?;
    Ok(Json(threads(found)))
}

async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
    Payload(body): Payload<CreateComment>,
) -> ApiResult<(StatusCode, Json<TaskComment>)> {
    let created = state
        .tasks
        .create_comment(user.id(), task_id, body.content, body.parent)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, comment_id)): Path<(TaskId, TaskCommentId)>,
    Payload(body): Payload<UpdateComment>,
) -> ApiResult<Json<TaskComment>> {
    let updated = state
        .tasks
        .update_comment(user.id(), task_id, comment_id, body.content)
        .await?;
    Ok(Json(updated))
}

async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, comment_id)): Path<(TaskId, TaskCommentId)>,
) -> ApiResult<StatusCode> {
    state
        .tasks
        .delete_comment(user.id(), task_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn attachments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<TaskAttachment>>> {
    Ok(Json(state.tasks.attachments(user.id(), task_id).await?))
}

async fn upload_attachment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<TaskAttachment>)> {
    let upload = UploadForm::read(multipart).await?.take_upload()?;
    let created = state
        .tasks
        .upload_attachment(user.id(), task_id, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn download_attachment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, attachment_id)): Path<(TaskId, TaskAttachmentId)>,
) -> ApiResult<Download> {
    let (attachment, bytes) = state
        .tasks
        .download_attachment(user.id(), task_id, attachment_id)
        .await?;
    Ok(Download::of(&attachment.file, bytes))
}

async fn delete_attachment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, attachment_id)): Path<(TaskId, TaskAttachmentId)>,
) -> ApiResult<StatusCode> {
    state
        .tasks
        .delete_attachment(user.id(), task_id, attachment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn time_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<TaskTimeLog>>> {
    Ok(Json(state.tasks.time_logs(user.id(), task_id).await?))
}

async fn log_time(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<TaskId>,
    Payload(body): Payload<CreateTimeLog>,
) -> ApiResult<(StatusCode, Json<TaskTimeLog>)> {
    let input = NewTimeLog {
        description: body.description,
        hours: body.hours,
        date: body.date,
    };
    let created = state.tasks.log_time(user.id(), task_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_time_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, log_id)): Path<(TaskId, TimeLogId)>,
    Payload(body): Payload<UpdateTimeLog>,
) -> ApiResult<Json<TaskTimeLog>> {
    let changes = TimeLogChanges {
        description: body.description,
        hours: body.hours,
        date: body.date,
    };
    let updated = state
        .tasks
        .update_time_log(user.id(), task_id, log_id, changes)
        .await?;
    Ok(Json(updated))
}

async fn delete_time_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, log_id)): Path<(TaskId, TimeLogId)>,
) -> ApiResult<StatusCode> {
    state
        .tasks
        .delete_time_log(user.id(), task_id, log_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
