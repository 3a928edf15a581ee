//! `PostgreSQL` repository implementation for ideas.

use super::models::{IdeaMembershipRow, IdeaNoteRow, IdeaProjectRow, IdeaResourceRow, IdeaRow};
use super::schema::{idea_memberships, idea_notes, idea_projects, idea_resources, ideas};
use crate::access::MemberRole;
use crate::account::domain::UserId;
use crate::idea::{
    domain::{
        Idea, IdeaBrief, IdeaCounts, IdeaFilter, IdeaId, IdeaMembership, IdeaMembershipId,
        IdeaNote, IdeaNoteId, IdeaPriority, IdeaResource, IdeaResourceId, IdeaStatus,
        PersistedIdeaData, ResourceType,
    },
    ports::{IdeaRepository, IdeaRepositoryError, IdeaRepositoryResult},
};
use crate::project::domain::ProjectId;
use crate::shared::Tags;
use crate::storage::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL`-backed idea repository.
#[derive(Debug, Clone)]
pub struct PostgresIdeaRepository {
    pool: PgPool,
}

impl PostgresIdeaRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type ProjectLinks = HashMap<Uuid, Vec<ProjectId>>;

fn load_links(connection: &mut PgConnection, ids: &[Uuid]) -> Result<ProjectLinks, DieselError> {
    let rows = idea_projects::table
        .filter(idea_projects::idea_id.eq_any(ids))
        .select(IdeaProjectRow::as_select())
        .load::<IdeaProjectRow>(connection)?;
    let mut links = ProjectLinks::new();
    for row in rows {
        links
            .entry(row.idea_id)
            .or_default()
            .push(ProjectId::from_uuid(row.project_id));
    }
    Ok(links)
}

fn replace_links(
    connection: &mut PgConnection,
    idea: Uuid,
    links: &[IdeaProjectRow],
) -> Result<(), DieselError> {
    diesel::delete(idea_projects::table.filter(idea_projects::idea_id.eq(idea)))
        .execute(connection)?;
    if !links.is_empty() {
        diesel::insert_into(idea_projects::table)
            .values(links)
            .execute(connection)?;
    }
    Ok(())
}

/// Escapes `LIKE` wildcards and wraps `term` for a substring match.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn count_column(value: i64) -> IdeaRepositoryResult<usize> {
    usize::try_from(value).map_err(IdeaRepositoryError::persistence)
}

#[async_trait]
impl IdeaRepository for PostgresIdeaRepository {
    async fn store(&self, idea: &Idea) -> IdeaRepositoryResult<()> {
        let row = idea_to_row(idea);
        let links = link_rows(idea);
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::insert_into(ideas::table).values(&row).execute(tx)?;
                    replace_links(tx, row.id, &links)
                })
                .map_err(IdeaRepositoryError::persistence)
        })
        .await
    }

    async fn update(&self, idea: &Idea) -> IdeaRepositoryResult<()> {
        let row = idea_to_row(idea);
        let links = link_rows(idea);
        let id = idea.id();
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let affected = connection
                .transaction::<_, DieselError, _>(|tx| {
                    let changed = diesel::update(ideas::table.filter(ideas::id.eq(row.id)))
                        .set(&row)
                        .execute(tx)?;
                    if changed > 0 {
                        replace_links(tx, row.id, &links)?;
                    }
                    Ok(changed)
                })
                .map_err(IdeaRepositoryError::persistence)?;
            if affected == 0 {
                return Err(IdeaRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: IdeaId) -> IdeaRepositoryResult<Option<Idea>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let Some(row) = ideas::table
                .filter(ideas::id.eq(id.into_inner()))
                .select(IdeaRow::as_select())
                .first::<IdeaRow>(connection)
                .optional()
                .map_err(IdeaRepositoryError::persistence)?
            else {
                return Ok(None);
            };
            let mut links =
                load_links(connection, &[row.id]).map_err(IdeaRepositoryError::persistence)?;
            let project_ids = links.remove(&row.id).unwrap_or_default();
            row_to_idea(row, project_ids).map(Some)
        })
        .await
    }

    async fn list_for_user(
        &self,
        user: UserId,
        filter: &IdeaFilter,
    ) -> IdeaRepositoryResult<Vec<Idea>> {
        let key = user.into_inner();
        let criteria = filter.clone();
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let member_of = idea_memberships::table
                .filter(idea_memberships::user_id.eq(key))
                .select(idea_memberships::idea_id);
            let mut query = ideas::table
                .filter(ideas::owner_id.eq(key).or(ideas::id.eq_any(member_of)))
                .into_boxed();
            if let Some(status) = criteria.status {
                query = query.filter(ideas::status.eq(status.as_str()));
            }
            if let Some(priority) = criteria.priority {
                query = query.filter(ideas::priority.eq(priority.as_str()));
            }
            if let Some(project) = criteria.project {
                let linked = idea_projects::table
                    .filter(idea_projects::project_id.eq(project.into_inner()))
                    .select(idea_projects::idea_id);
                query = query.filter(ideas::id.eq_any(linked));
            }
            if let Some(term) = criteria.search_term() {
                let pattern = like_pattern(term);
                query = query.filter(
                    ideas::title
                        .ilike(pattern.clone())
                        .or(ideas::description.ilike(pattern.clone()))
                        .or(ideas::problem_statement.ilike(pattern.clone()))
                        .or(ideas::tags.ilike(pattern)),
                );
            }
            let rows = query
                .order(ideas::updated_at.desc())
                .select(IdeaRow::as_select())
                .load::<IdeaRow>(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
            let mut links =
                load_links(connection, &ids).map_err(IdeaRepositoryError::persistence)?;
            rows.into_iter()
                .map(|row| {
                    let project_ids = links.remove(&row.id).unwrap_or_default();
                    row_to_idea(row, project_ids)
                })
                .collect()
        })
        .await
    }

    async fn delete_idea(&self, id: IdeaId) -> IdeaRepositoryResult<()> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let affected = diesel::delete(ideas::table.filter(ideas::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            if affected == 0 {
                return Err(IdeaRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn detach_project(&self, project: ProjectId) -> IdeaRepositoryResult<()> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::delete(
                idea_projects::table.filter(idea_projects::project_id.eq(project.into_inner())),
            )
            .execute(connection)
            .map_err(IdeaRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn counts(&self, id: IdeaId) -> IdeaRepositoryResult<IdeaCounts> {
        let key = id.into_inner();
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let notes: i64 = idea_notes::table
                .filter(idea_notes::idea_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            let resources: i64 = idea_resources::table
                .filter(idea_resources::idea_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            let projects: i64 = idea_projects::table
                .filter(idea_projects::idea_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            let members: i64 = idea_memberships::table
                .filter(idea_memberships::idea_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(IdeaCounts {
                notes: count_column(notes)?,
                resources: count_column(resources)?,
                projects: count_column(projects)?,
                members: count_column(members)?,
            })
        })
        .await
    }

    async fn save_membership(&self, membership: &IdeaMembership) -> IdeaRepositoryResult<()> {
        let row = membership_to_row(membership);
        let idea = membership.idea_id;
        let user = membership.user_id;
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::insert_into(idea_memberships::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        IdeaRepositoryError::DuplicateMember { idea, user }
                    }
                    other => IdeaRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_membership(
        &self,
        idea: IdeaId,
        user: UserId,
    ) -> IdeaRepositoryResult<Option<IdeaMembership>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let row = idea_memberships::table
                .filter(idea_memberships::idea_id.eq(idea.into_inner()))
                .filter(idea_memberships::user_id.eq(user.into_inner()))
                .select(IdeaMembershipRow::as_select())
                .first::<IdeaMembershipRow>(connection)
                .optional()
                .map_err(IdeaRepositoryError::persistence)?;
            row.map(row_to_membership).transpose()
        })
        .await
    }

    async fn list_memberships(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaMembership>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            idea_memberships::table
                .filter(idea_memberships::idea_id.eq(idea.into_inner()))
                .order(idea_memberships::created_at.desc())
                .select(IdeaMembershipRow::as_select())
                .load::<IdeaMembershipRow>(connection)
                .map_err(IdeaRepositoryError::persistence)?
                .into_iter()
                .map(row_to_membership)
                .collect()
        })
        .await
    }

    async fn delete_membership(&self, id: IdeaMembershipId) -> IdeaRepositoryResult<()> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::delete(idea_memberships::table.filter(idea_memberships::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_note(&self, note: &IdeaNote) -> IdeaRepositoryResult<()> {
        let row = note_to_row(note);
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::insert_into(idea_notes::table)
                .values(&row)
                .on_conflict(idea_notes::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_note(&self, id: IdeaNoteId) -> IdeaRepositoryResult<Option<IdeaNote>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let row = idea_notes::table
                .filter(idea_notes::id.eq(id.into_inner()))
                .select(IdeaNoteRow::as_select())
                .first::<IdeaNoteRow>(connection)
                .optional()
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(row.map(row_to_note))
        })
        .await
    }

    async fn list_notes(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaNote>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let rows = idea_notes::table
                .filter(idea_notes::idea_id.eq(idea.into_inner()))
                .order(idea_notes::created_at.desc())
                .select(IdeaNoteRow::as_select())
                .load::<IdeaNoteRow>(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_note).collect())
        })
        .await
    }

    async fn delete_note(&self, id: IdeaNoteId) -> IdeaRepositoryResult<()> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::delete(idea_notes::table.filter(idea_notes::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_resource(&self, resource: &IdeaResource) -> IdeaRepositoryResult<()> {
        let row = resource_to_row(resource);
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::insert_into(idea_resources::table)
                .values(&row)
                .on_conflict(idea_resources::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_resource(
        &self,
        id: IdeaResourceId,
    ) -> IdeaRepositoryResult<Option<IdeaResource>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            let row = idea_resources::table
                .filter(idea_resources::id.eq(id.into_inner()))
                .select(IdeaResourceRow::as_select())
                .first::<IdeaResourceRow>(connection)
                .optional()
                .map_err(IdeaRepositoryError::persistence)?;
            row.map(row_to_resource).transpose()
        })
        .await
    }

    async fn list_resources(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaResource>> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            idea_resources::table
                .filter(idea_resources::idea_id.eq(idea.into_inner()))
                .order(idea_resources::created_at.desc())
                .select(IdeaResourceRow::as_select())
                .load::<IdeaResourceRow>(connection)
                .map_err(IdeaRepositoryError::persistence)?
                .into_iter()
                .map(row_to_resource)
                .collect()
        })
        .await
    }

    async fn delete_resource(&self, id: IdeaResourceId) -> IdeaRepositoryResult<()> {
        run_blocking(&self.pool, IdeaRepositoryError::persistence, move |connection| {
            diesel::delete(idea_resources::table.filter(idea_resources::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(IdeaRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

pub(super) fn idea_to_row(idea: &Idea) -> IdeaRow {
    let brief = idea.brief();
    IdeaRow {
        id: idea.id().into_inner(),
        title: idea.title().to_owned(),
        description: idea.description().to_owned(),
        problem_statement: brief.problem_statement.clone(),
        solution_overview: brief.solution_overview.clone(),
        target_audience: brief.target_audience.clone(),
        market_potential: brief.market_potential.clone(),
        revenue_model: brief.revenue_model.clone(),
        competition_analysis: brief.competition_analysis.clone(),
        technical_requirements: brief.technical_requirements.clone(),
        estimated_effort: brief.estimated_effort.clone(),
        priority: idea.priority().as_str().to_owned(),
        status: idea.status().as_str().to_owned(),
        tags: idea.tags().to_csv(),
        owner_id: idea.owner().into_inner(),
        created_at: idea.created_at(),
        updated_at: idea.updated_at(),
    }
}

fn link_rows(idea: &Idea) -> Vec<IdeaProjectRow> {
    idea.project_ids()
        .iter()
        .map(|project| IdeaProjectRow {
            idea_id: idea.id().into_inner(),
            project_id: project.into_inner(),
        })
        .collect()
}

pub(super) fn row_to_idea(row: IdeaRow, project_ids: Vec<ProjectId>) -> IdeaRepositoryResult<Idea> {
    let priority =
        IdeaPriority::try_from(row.priority.as_str()).map_err(IdeaRepositoryError::persistence)?;
    let status =
        IdeaStatus::try_from(row.status.as_str()).map_err(IdeaRepositoryError::persistence)?;
    Ok(Idea::from_persisted(PersistedIdeaData {
        id: IdeaId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        brief: IdeaBrief {
            problem_statement: row.problem_statement,
            solution_overview: row.solution_overview,
            target_audience: row.target_audience,
            market_potential: row.market_potential,
            revenue_model: row.revenue_model,
            competition_analysis: row.competition_analysis,
            technical_requirements: row.technical_requirements,
            estimated_effort: row.estimated_effort,
        },
        priority,
        status,
        tags: Tags::from_persisted(&row.tags),
        owner: UserId::from_uuid(row.owner_id),
        project_ids,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn membership_to_row(membership: &IdeaMembership) -> IdeaMembershipRow {
    IdeaMembershipRow {
        id: membership.id.into_inner(),
        idea_id: membership.idea_id.into_inner(),
        user_id: membership.user_id.into_inner(),
        role: membership.role.as_str().to_owned(),
        added_by: membership.added_by.into_inner(),
        created_at: membership.created_at,
    }
}

pub(super) fn row_to_membership(row: IdeaMembershipRow) -> IdeaRepositoryResult<IdeaMembership> {
    let role = MemberRole::try_from(row.role.as_str()).map_err(IdeaRepositoryError::persistence)?;
    Ok(IdeaMembership {
        id: IdeaMembershipId::from_uuid(row.id),
        idea_id: IdeaId::from_uuid(row.idea_id),
        user_id: UserId::from_uuid(row.user_id),
        role,
        added_by: UserId::from_uuid(row.added_by),
        created_at: row.created_at,
    })
}

fn note_to_row(note: &IdeaNote) -> IdeaNoteRow {
    IdeaNoteRow {
        id: note.id.into_inner(),
        idea_id: note.idea_id.into_inner(),
        title: note.title.clone(),
        content: note.content.clone(),
        author_id: note.author.into_inner(),
        created_at: note.created_at,
        updated_at: note.updated_at,
    }
}

fn row_to_note(row: IdeaNoteRow) -> IdeaNote {
    IdeaNote {
        id: IdeaNoteId::from_uuid(row.id),
        idea_id: IdeaId::from_uuid(row.idea_id),
        title: row.title,
        content: row.content,
        author: UserId::from_uuid(row.author_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub(super) fn resource_to_row(resource: &IdeaResource) -> IdeaResourceRow {
    IdeaResourceRow {
        id: resource.id.into_inner(),
        idea_id: resource.idea_id.into_inner(),
        title: resource.title.clone(),
        url: resource.url.clone(),
        description: resource.description.clone(),
        resource_type: resource.resource_type.as_str().to_owned(),
        added_by: resource.added_by.into_inner(),
        created_at: resource.created_at,
    }
}

pub(super) fn row_to_resource(row: IdeaResourceRow) -> IdeaRepositoryResult<IdeaResource> {
    let resource_type = ResourceType::try_from(row.resource_type.as_str())
        .map_err(IdeaRepositoryError::persistence)?;
    Ok(IdeaResource {
        id: IdeaResourceId::from_uuid(row.id),
        idea_id: IdeaId::from_uuid(row.idea_id),
        title: row.title,
        url: row.url,
        description: row.description,
        resource_type,
        added_by: UserId::from_uuid(row.added_by),
        created_at: row.created_at,
    })
}
