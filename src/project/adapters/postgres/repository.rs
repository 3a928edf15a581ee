//! `PostgreSQL` repository implementation for projects.

use super::models::{ActivityRow, MembershipRow, ProjectFileRow, ProjectLinkRow, ProjectRow};
use super::schema::{
    project_activities, project_files, project_links, project_memberships, projects,
    topic_media, topics,
};
use crate::access::MemberRole;
use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::project::{
    domain::{
        ActivityId, MembershipId, PersistedProjectData, Project, ProjectActivity, ProjectFile,
        ProjectFileId, ProjectId, ProjectLink, ProjectLinkId, ProjectMembership, ProjectPriority,
        ProjectStatus,
    },
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};
use crate::storage::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed project and topic repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pub(super) pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let row = project_to_row(project);
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let row = project_to_row(project);
        let id = project.id();
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let affected = diesel::update(projects::table.filter(projects::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            if affected == 0 {
                return Err(ProjectRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_for_user(&self, user: UserId) -> ProjectRepositoryResult<Vec<Project>> {
        let key = user.into_inner();
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let member_of = project_memberships::table
                .filter(project_memberships::user_id.eq(key))
                .select(project_memberships::project_id);
            projects::table
                .filter(projects::owner_id.eq(key).or(projects::id.eq_any(member_of)))
                .order(projects::updated_at.desc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?
                .into_iter()
                .map(row_to_project)
                .collect()
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<Vec<String>> {
        let key = id.into_inner();
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    let mut keys: Vec<String> = project_files::table
                        .filter(project_files::project_id.eq(key))
                        .select(project_files::storage_key)
                        .load(tx)?;
                    let project_topics = topics::table
                        .filter(topics::project_id.eq(key))
                        .select(topics::id);
                    keys.extend(
                        topic_media::table
                            .filter(topic_media::topic_id.eq_any(project_topics))
                            .select(topic_media::storage_key)
                            .load::<String>(tx)?,
                    );
                    let affected =
                        diesel::delete(projects::table.filter(projects::id.eq(key))).execute(tx)?;
                    Ok((affected, keys))
                })
                .map_err(ProjectRepositoryError::persistence)
                .and_then(|(affected, keys)| {
                    if affected == 0 {
                        Err(ProjectRepositoryError::NotFound(id))
                    } else {
                        Ok(keys)
                    }
                })
        })
        .await
    }

    async fn save_membership(
        &self,
        membership: &ProjectMembership,
    ) -> ProjectRepositoryResult<()> {
        let row = membership_to_row(membership);
        let project = membership.project_id;
        let user = membership.user_id;
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::insert_into(project_memberships::table)
                .values(&row)
                .on_conflict(project_memberships::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProjectRepositoryError::DuplicateMember { project, user }
                    }
                    other => ProjectRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> ProjectRepositoryResult<Option<ProjectMembership>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let row = project_memberships::table
                .filter(project_memberships::project_id.eq(project.into_inner()))
                .filter(project_memberships::user_id.eq(user.into_inner()))
                .select(MembershipRow::as_select())
                .first::<MembershipRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_membership).transpose()
        })
        .await
    }

    async fn find_membership_by_id(
        &self,
        id: MembershipId,
    ) -> ProjectRepositoryResult<Option<ProjectMembership>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let row = project_memberships::table
                .filter(project_memberships::id.eq(id.into_inner()))
                .select(MembershipRow::as_select())
                .first::<MembershipRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_membership).transpose()
        })
        .await
    }

    async fn list_memberships(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectMembership>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            project_memberships::table
                .filter(project_memberships::project_id.eq(project.into_inner()))
                .order(project_memberships::created_at.asc())
                .select(MembershipRow::as_select())
                .load::<MembershipRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?
                .into_iter()
                .map(row_to_membership)
                .collect()
        })
        .await
    }

    async fn delete_membership(&self, id: MembershipId) -> ProjectRepositoryResult<()> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::delete(
                project_memberships::table.filter(project_memberships::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_file(&self, file: &ProjectFile) -> ProjectRepositoryResult<()> {
        let row = file_to_row(file);
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::insert_into(project_files::table)
                .values(&row)
                .on_conflict(project_files::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_file(&self, id: ProjectFileId) -> ProjectRepositoryResult<Option<ProjectFile>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let row = project_files::table
                .filter(project_files::id.eq(id.into_inner()))
                .select(ProjectFileRow::as_select())
                .first::<ProjectFileRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_file).transpose()
        })
        .await
    }

    async fn list_files(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<ProjectFile>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            project_files::table
                .filter(project_files::project_id.eq(project.into_inner()))
                .order(project_files::uploaded_at.desc())
                .select(ProjectFileRow::as_select())
                .load::<ProjectFileRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?
                .into_iter()
                .map(row_to_file)
                .collect()
        })
        .await
    }

    async fn delete_file(&self, id: ProjectFileId) -> ProjectRepositoryResult<()> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::delete(project_files::table.filter(project_files::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_link(&self, link: &ProjectLink) -> ProjectRepositoryResult<()> {
        let row = link_to_row(link);
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::insert_into(project_links::table)
                .values(&row)
                .on_conflict(project_links::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_link(&self, id: ProjectLinkId) -> ProjectRepositoryResult<Option<ProjectLink>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let row = project_links::table
                .filter(project_links::id.eq(id.into_inner()))
                .select(ProjectLinkRow::as_select())
                .first::<ProjectLinkRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(row.map(row_to_link))
        })
        .await
    }

    async fn list_links(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<ProjectLink>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let rows = project_links::table
                .filter(project_links::project_id.eq(project.into_inner()))
                .order(project_links::created_at.desc())
                .select(ProjectLinkRow::as_select())
                .load::<ProjectLinkRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_link).collect())
        })
        .await
    }

    async fn delete_link(&self, id: ProjectLinkId) -> ProjectRepositoryResult<()> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::delete(project_links::table.filter(project_links::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn record_activity(&self, activity: &ProjectActivity) -> ProjectRepositoryResult<()> {
        let row = ActivityRow {
            id: activity.id.into_inner(),
            project_id: activity.project_id.into_inner(),
            user_id: activity.user_id.into_inner(),
            action: activity.action.clone(),
            description: activity.description.clone(),
            created_at: activity.created_at,
        };
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            diesel::insert_into(project_activities::table)
                .values(&row)
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_activities(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectActivity>> {
        run_blocking(&self.pool, ProjectRepositoryError::persistence, move |connection| {
            let rows = project_activities::table
                .filter(project_activities::project_id.eq(project.into_inner()))
                .order(project_activities::created_at.desc())
                .select(ActivityRow::as_select())
                .load::<ActivityRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(rows
                .into_iter()
                .map(|row| ProjectActivity {
                    id: ActivityId::from_uuid(row.id),
                    project_id: ProjectId::from_uuid(row.project_id),
                    user_id: UserId::from_uuid(row.user_id),
                    action: row.action,
                    description: row.description,
                    created_at: row.created_at,
                })
                .collect())
        })
        .await
    }
}

/// Converts a byte count into its column representation.
pub(super) fn size_column(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

pub(super) fn project_to_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        title: project.title().to_owned(),
        description: project.description().to_owned(),
        status: project.status().as_str().to_owned(),
        priority: project.priority().as_str().to_owned(),
        owner_id: project.owner().into_inner(),
        due_date: project.due_date(),
        progress: i16::from(project.progress()),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

pub(super) fn row_to_project(row: ProjectRow) -> ProjectRepositoryResult<Project> {
    let status =
        ProjectStatus::try_from(row.status.as_str()).map_err(ProjectRepositoryError::persistence)?;
    let priority = ProjectPriority::try_from(row.priority.as_str())
        .map_err(ProjectRepositoryError::persistence)?;
    let progress = u8::try_from(row.progress).map_err(ProjectRepositoryError::persistence)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        status,
        priority,
        owner: UserId::from_uuid(row.owner_id),
        due_date: row.due_date,
        progress,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn membership_to_row(membership: &ProjectMembership) -> MembershipRow {
    MembershipRow {
        id: membership.id.into_inner(),
        project_id: membership.project_id.into_inner(),
        user_id: membership.user_id.into_inner(),
        role: membership.role.as_str().to_owned(),
        created_at: membership.created_at,
        updated_at: membership.updated_at,
    }
}

pub(super) fn row_to_membership(row: MembershipRow) -> ProjectRepositoryResult<ProjectMembership> {
    let role =
        MemberRole::try_from(row.role.as_str()).map_err(ProjectRepositoryError::persistence)?;
    Ok(ProjectMembership {
        id: MembershipId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        user_id: UserId::from_uuid(row.user_id),
        role,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(super) fn file_to_row(file: &ProjectFile) -> ProjectFileRow {
    ProjectFileRow {
        id: file.id.into_inner(),
        project_id: file.project_id.into_inner(),
        title: file.title.clone(),
        description: file.description.clone(),
        file_name: file.file.file_name.clone(),
        content_type: file.file.content_type.clone(),
        file_size: size_column(file.file.size),
        storage_key: file.file.storage_key.clone(),
        sha256: file.file.sha256.clone(),
        uploaded_by: file.uploaded_by.into_inner(),
        uploaded_at: file.uploaded_at,
    }
}

pub(super) fn row_to_file(row: ProjectFileRow) -> ProjectRepositoryResult<ProjectFile> {
    let size = u64::try_from(row.file_size).map_err(ProjectRepositoryError::persistence)?;
    Ok(ProjectFile {
        id: ProjectFileId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title: row.title,
        description: row.description,
        file: StoredFile {
            file_name: row.file_name,
            content_type: row.content_type,
            size,
            storage_key: row.storage_key,
            sha256: row.sha256,
        },
        uploaded_by: UserId::from_uuid(row.uploaded_by),
        uploaded_at: row.uploaded_at,
    })
}

fn link_to_row(link: &ProjectLink) -> ProjectLinkRow {
    ProjectLinkRow {
        id: link.id.into_inner(),
        project_id: link.project_id.into_inner(),
        title: link.title.clone(),
        url: link.url.clone(),
        description: link.description.clone(),
        created_by: link.created_by.into_inner(),
        created_at: link.created_at,
        updated_at: link.updated_at,
    }
}

fn row_to_link(row: ProjectLinkRow) -> ProjectLink {
    ProjectLink {
        id: ProjectLinkId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title: row.title,
        url: row.url,
        description: row.description,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
