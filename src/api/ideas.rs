//! `/api/ideas`: ideas, collaborators, notes and resources.

use super::error::{ApiError, ApiResult};
use super::extract::{CurrentUser, Params, Payload};
use super::state::AppState;
use super::views::MemberView;
use crate::access::{AccessRole, Action, MemberRole, Permissions};
use crate::account::domain::{UserId, UserSummary};
use crate::idea::{
    domain::{
        Idea, IdeaBrief, IdeaChanges, IdeaCounts, IdeaFilter, IdeaId, IdeaMembership, IdeaNote,
        IdeaNoteId, IdeaPriority, IdeaResource, IdeaResourceId, IdeaStatus, NewIdea,
        ResourceChanges, ResourceType,
    },
    services::{IdeaDetail, IdeaGrant, IdeaOverview, IdeaStats},
};
use crate::project::domain::{Project, ProjectId, ProjectStatus};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Routes mounted under `/api/ideas`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/my_user_projects", get(my_user_projects))
        .route("/{idea_id}", get(detail).patch(update).delete(remove))
        .route("/{idea_id}/members", get(members).post(add_member))
        .route("/{idea_id}/members/{user_id}", delete(remove_member))
        .route("/{idea_id}/notes", get(notes).post(create_note))
        .route(
            "/{idea_id}/notes/{note_id}",
            get(note).patch(update_note).delete(delete_note),
        )
        .route("/{idea_id}/resources", get(resources).post(create_resource))
        .route(
            "/{idea_id}/resources/{resource_id}",
            get(resource).patch(update_resource).delete(delete_resource),
        )
}

#[derive(Debug, Serialize)]
struct IdeaView {
    id: IdeaId,
    title: String,
    description: String,
    #[serde(flatten)]
    brief: IdeaBrief,
    priority: IdeaPriority,
    status: IdeaStatus,
    tags: String,
    tag_list: Vec<String>,
    owner: UserId,
    project_ids: Vec<ProjectId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_role: AccessRole,
    permissions: Permissions,
}

impl IdeaView {
    fn of(idea: &Idea, role: AccessRole, permissions: Permissions) -> Self {
        Self {
            id: idea.id(),
            title: idea.title().to_owned(),
            description: idea.description().to_owned(),
            brief: idea.brief().clone(),
            priority: idea.priority(),
            status: idea.status(),
            tags: idea.tags().to_csv(),
            tag_list: idea.tags().items().to_vec(),
            owner: idea.owner(),
            project_ids: idea.project_ids().to_vec(),
            created_at: idea.created_at(),
            updated_at: idea.updated_at(),
            user_role: role,
            permissions,
        }
    }
}

impl From<&IdeaGrant> for IdeaView {
    fn from(grant: &IdeaGrant) -> Self {
        Self::of(&grant.idea, grant.role, grant.permissions())
    }
}

#[derive(Debug, Serialize)]
struct IdeaOverviewView {
    #[serde(flatten)]
    idea: IdeaView,
    counts: IdeaCounts,
}

impl From<&IdeaOverview> for IdeaOverviewView {
    fn from(overview: &IdeaOverview) -> Self {
        Self {
            idea: IdeaView::from(&overview.grant),
            counts: overview.counts,
        }
    }
}

/// Compact project shown next to ideas.
#[derive(Debug, Serialize)]
struct ProjectSummaryView {
    id: ProjectId,
    title: String,
    description: String,
    status: ProjectStatus,
}

impl From<&Project> for ProjectSummaryView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id(),
            title: project.title().to_owned(),
            description: project.description().to_owned(),
            status: project.status(),
        }
    }
}

#[derive(Debug, Serialize)]
struct IdeaDetailView {
    #[serde(flatten)]
    idea: IdeaView,
    counts: IdeaCounts,
    projects: Vec<ProjectSummaryView>,
    notes: Vec<IdeaNote>,
    resources: Vec<IdeaResource>,
    members: Vec<MemberView<IdeaMembership>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    status: Option<IdeaStatus>,
    priority: Option<IdeaPriority>,
    search: Option<String>,
    project: Option<ProjectId>,
}

#[derive(Debug, Deserialize)]
struct CreateIdea {
    title: String,
    description: String,
    #[serde(flatten)]
    brief: BriefBody,
    #[serde(default)]
    priority: IdeaPriority,
    #[serde(default)]
    status: IdeaStatus,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    project_ids: Vec<ProjectId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BriefBody {
    problem_statement: String,
    solution_overview: String,
    target_audience: String,
    market_potential: String,
    revenue_model: String,
    competition_analysis: String,
    technical_requirements: String,
    estimated_effort: String,
}

impl From<BriefBody> for IdeaBrief {
    fn from(body: BriefBody) -> Self {
        Self {
            problem_statement: body.problem_statement,
            solution_overview: body.solution_overview,
            target_audience: body.target_audience,
            market_potential: body.market_potential,
            revenue_model: body.revenue_model,
            competition_analysis: body.competition_analysis,
            technical_requirements: body.technical_requirements,
            estimated_effort: body.estimated_effort,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateIdea {
    title: Option<String>,
    description: Option<String>,
    problem_statement: Option<String>,
    solution_overview: Option<String>,
    target_audience: Option<String>,
    market_potential: Option<String>,
    revenue_model: Option<String>,
    competition_analysis: Option<String>,
    technical_requirements: Option<String>,
    estimated_effort: Option<String>,
    priority: Option<IdeaPriority>,
    status: Option<IdeaStatus>,
    tags: Option<String>,
    project_ids: Option<Vec<ProjectId>>,
}

impl From<UpdateIdea> for IdeaChanges {
    fn from(body: UpdateIdea) -> Self {
        Self {
            title: body.title,
            description: body.description,
            problem_statement: body.problem_statement,
            solution_overview: body.solution_overview,
            target_audience: body.target_audience,
            market_potential: body.market_potential,
            revenue_model: body.revenue_model,
            competition_analysis: body.competition_analysis,
            technical_requirements: body.technical_requirements,
            estimated_effort: body.estimated_effort,
            priority: body.priority,
            status: body.status,
            tags: body.tags,
            project_ids: body.project_ids,
        }
    }
}

/// A collaborator is named by email or by account id.
#[derive(Debug, Deserialize)]
struct AddMember {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    role: MemberRole,
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

#[derive(Debug, Deserialize)]
struct CreateResource {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    resource_type: ResourceType,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateResource {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    resource_type: Option<ResourceType>,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Params(params): Params<ListParams>,
) -> ApiResult<Json<Vec<IdeaOverviewView>>> {
    let filter = IdeaFilter {
        status: params.status,
        priority: params.priority,
        search: params.search,
        project: params.project,
    };
    let overviews = state.ideas.list(user.id(), &filter).await?;
    Ok(Json(overviews.iter().map(IdeaOverviewView::from).collect()))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<CreateIdea>,
) -> ApiResult<(StatusCode, Json<IdeaView>)> {
    let input = NewIdea {
        title: body.title,
        description: body.description,
        brief: body.brief.into(),
        priority: body.priority,
        status: body.status,
        tags: body.tags,
    };
    let grant = state
        .ideas
        .create(user.id(), input, body.project_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(IdeaView::from(&grant))))
}

async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<IdeaStats>> {
    Ok(Json(state.ideas.stats(user.id()).await?))
}

async fn my_user_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ProjectSummaryView>>> {
    let projects = state.ideas.my_user_projects(user.id()).await?;
    Ok(Json(projects.iter().map(ProjectSummaryView::from).collect()))
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
) -> ApiResult<Json<IdeaDetailView>> {
    let IdeaDetail {
        grant,
        counts,
        projects,
        notes,
        resources,
        members,
    } = state.ideas.detail(user.id(), idea_id).await?;
    let ids: Vec<UserId> = members.iter().map(|row| row.user_id).collect();
    let users = state.accounts.summaries(&ids).await?;
    Ok(Json(IdeaDetailView {
        idea: IdeaView::from(&grant),
        counts,
        projects: projects.iter().map(ProjectSummaryView::from).collect(),
        notes,
        resources,
        members: MemberView::join(members, |row| row.user_id, &users),
    }))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
    Payload(body): Payload<UpdateIdea>,
) -> ApiResult<Json<IdeaView>> {
    let grant = state
        .ideas
        .update(user.id(), idea_id, body.into())
        .await?;
    Ok(Json(IdeaView::from(&grant)))
}

/// Deleting an idea also deletes the tasks attached to it.
///
/// The idea row goes last so a failed request can be repeated.
async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
) -> ApiResult<StatusCode> {
    state
        .ideas
        .authorize(user.id(), idea_id, Action::Delete)
        .await?;
    state.tasks.purge_idea(idea_id).await?;
    state.ideas.delete(user.id(), idea_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn members(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
) -> ApiResult<Json<Vec<MemberView<IdeaMembership>>>> {
    let memberships = state.ideas.members(user.id(), idea_id).await?;
    let ids: Vec<UserId> = memberships.iter().map(|row| row.user_id).collect();
    let users = state.accounts.summaries(&ids).await?;
    Ok(Json(MemberView::join(
        memberships,
        |row| row.user_id,
        &users,
    )))
}

async fn resolve_member(state: &AppState, body: &AddMember) -> ApiResult<UserSummary> {
    let found = match (&body.email, body.user_id) {
        (Some(email), _) if !email.trim().is_empty() => {
            state.accounts.find_by_email(email).await?.ok_or_else(|| {
                ApiError::field("email", format!("User with email {email} not found"))
            })?
        }
        (_, Some(id)) => state
            .accounts
            .find_active(id)
            .await?
            .ok_or_else(|| ApiError::field("user_id", "User not found"))?,
        _ => {
            return Err(ApiError::field(
                "non_field_errors",
                "Either email or user_id is required.",
            ));
        }
    };
    Ok(found.summary())
}

async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
    Payload(body): Payload<AddMember>,
) -> ApiResult<(StatusCode, Json<MemberView<IdeaMembership>>)> {
    state
        .ideas
        .authorize(user.id(), idea_id, Action::ManageMembers)
        .await?;
    let member = resolve_member(&state, &body).await?;
    let membership = state
        .ideas
        .add_member(user.id(), idea_id, &member, body.role)
        .await?;
    let view = MemberView {
        membership,
        user: Some(member),
    };
    Ok((StatusCode::CREATED, Json(view)))
}

async fn remove_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, member)): Path<(IdeaId, UserId)>,
) -> ApiResult<StatusCode> {
    state
        .ideas
        .remove_member(user.id(), idea_id, member)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
) -> ApiResult<Json<Vec<IdeaNote>>> {
    Ok(Json(state.ideas.notes(user.id(), idea_id).await?))
}

async fn note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, note_id)): Path<(IdeaId, IdeaNoteId)>,
) -> ApiResult<Json<IdeaNote>> {
    Ok(Json(state.ideas.note(user.id(), idea_id, note_id).await?))
}

async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
    Payload(body): Payload<CreateNote>,
) -> ApiResult<(StatusCode, Json<IdeaNote>)> {
    let created = state
        .ideas
        .create_note(user.id(), idea_id, body.title, body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, note_id)): Path<(IdeaId, IdeaNoteId)>,
    Payload(body): Payload<UpdateNote>,
) -> ApiResult<Json<IdeaNote>> {
    let updated = state
        .ideas
        .update_note(user.id(), idea_id, note_id, body.title, body.content)
        .await?;
    Ok(Json(updated))
}

async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, note_id)): Path<(IdeaId, IdeaNoteId)>,
) -> ApiResult<StatusCode> {
    state
        .ideas
        .delete_note(user.id(), idea_id, note_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn resources(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
) -> ApiResult<Json<Vec<IdeaResource>>> {
    Ok(Json(state.ideas.resources(user.id(), idea_id).await?))
}

async fn resource(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, resource_id)): Path<(IdeaId, IdeaResourceId)>,
) -> ApiResult<Json<IdeaResource>> {
    Ok(Json(
        state
            .ideas
            .resource(user.id(), idea_id, resource_id)
            .await?,
    ))
}

async fn create_resource(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(idea_id): Path<IdeaId>,
    Payload(body): Payload<CreateResource>,
) -> ApiResult<(StatusCode, Json<IdeaResource>)> {
    let created = state
        .ideas
        .create_resource(
            user.id(),
            idea_id,
            body.title,
            body.url,
            body.description,
            body.resource_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_resource(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, resource_id)): Path<(IdeaId, IdeaResourceId)>,
    Payload(body): Payload<UpdateResource>,
) -> ApiResult<Json<IdeaResource>> {
    let changes = ResourceChanges {
        title: body.title,
        url: body.url,
        description: body.description,
        resource_type: body.resource_type,
    };
    let updated = state
        .ideas
        .update_resource(user.id(), idea_id, resource_id, changes)
        .await?;
    Ok(Json(updated))
}

async fn delete_resource(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((idea_id, resource_id)): Path<(IdeaId, IdeaResourceId)>,
) -> ApiResult<StatusCode> {
    state
        .ideas
        .delete_resource(user.id(), idea_id, resource_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
