//! `PostgreSQL` repository implementation for tasks.
//!
//! Child records (comments, attachments, time logs, history and dependency
//! edges) cascade from `tasks` at the database level. Subtask hierarchies
//! are expanded here so attachment storage keys can be handed back before
//! the rows disappear.

use super::models::{
    TaskActivityRow, TaskAttachmentRow, TaskCommentRow, TaskDependencyRow, TaskListRow, TaskRow,
    TaskTemplateRow, TaskTimeLogRow,
};
use super::schema::{
    task_activities, task_attachments, task_comments, task_dependencies, task_lists,
    task_templates, task_time_logs, tasks,
};
use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::shared::Tags;
use crate::task::{
    domain::{
        ActivityAction, Hours, ListScope, PersistedTaskData, Task, TaskActivity, TaskActivityId,
        TaskAttachment, TaskAttachmentId, TaskComment, TaskCommentId, TaskCounts, TaskId,
        TaskList, TaskListCounts, TaskListId, TaskPriority, TaskScope, TaskStatus, TaskTemplate,
        TaskTemplateId, TaskTimeLog, TimeLogId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::storage::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A stored hour amount outside the supported range.
#[derive(Debug, Error)]
#[error("hour column out of range: {0}")]
pub(super) struct InvalidHours(i32);

type DependencyMap = HashMap<Uuid, Vec<TaskId>>;

fn load_dependencies(
    connection: &mut PgConnection,
    ids: &[Uuid],
) -> Result<DependencyMap, DieselError> {
    let rows = task_dependencies::table
        .filter(task_dependencies::task_id.eq_any(ids))
        .select(TaskDependencyRow::as_select())
        .load::<TaskDependencyRow>(connection)?;
    let mut edges = DependencyMap::new();
    for row in rows {
        edges
            .entry(row.task_id)
            .or_default()
            .push(TaskId::from_uuid(row.depends_on_id));
    }
    Ok(edges)
}

fn replace_dependencies(
    connection: &mut PgConnection,
    task: Uuid,
    edges: &[TaskDependencyRow],
) -> Result<(), DieselError> {
    diesel::delete(task_dependencies::table.filter(task_dependencies::task_id.eq(task)))
        .execute(connection)?;
    if !edges.is_empty() {
        diesel::insert_into(task_dependencies::table)
            .values(edges)
            .execute(connection)?;
    }
    Ok(())
}

fn hydrate(connection: &mut PgConnection, rows: Vec<TaskRow>) -> TaskRepositoryResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut edges =
        load_dependencies(connection, &ids).map_err(TaskRepositoryError::persistence)?;
    rows.into_iter()
        .map(|row| {
            let dependencies = edges.remove(&row.id).unwrap_or_default();
            row_to_task(row, dependencies)
        })
        .collect()
}

/// Expands `roots` with every task below them in the parent hierarchy.
fn with_descendants(
    connection: &mut PgConnection,
    roots: Vec<Uuid>,
) -> Result<Vec<Uuid>, DieselError> {
    let mut found: HashSet<Uuid> = roots.iter().copied().collect();
    let mut frontier = roots;
    while !frontier.is_empty() {
        let children: Vec<Uuid> = tasks::table
            .filter(tasks::parent_task_id.eq_any(&frontier))
            .select(tasks::id)
            .load(connection)?;
        frontier = children
            .into_iter()
            .filter(|child| found.insert(*child))
            .collect();
    }
    Ok(found.into_iter().collect())
}

/// Deletes the given tasks, returning their attachment storage keys.
fn remove_tasks(connection: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<String>, DieselError> {
    let keys: Vec<String> = task_attachments::table
        .filter(task_attachments::task_id.eq_any(ids))
        .select(task_attachments::storage_key)
        .load(connection)?;
    diesel::delete(tasks::table.filter(tasks::id.eq_any(ids))).execute(connection)?;
    Ok(keys)
}

fn purge_where(
    connection: &mut PgConnection,
    roots: Vec<Uuid>,
) -> Result<Vec<String>, DieselError> {
    let doomed = with_descendants(connection, roots)?;
    remove_tasks(connection, &doomed)
}

fn count_column(value: i64) -> TaskRepositoryResult<usize> {
    usize::try_from(value).map_err(TaskRepositoryError::persistence)
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let row = task_to_row(task);
        let edges = dependency_rows(task);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::insert_into(tasks::table).values(&row).execute(tx)?;
                    replace_dependencies(tx, row.id, &edges)
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.update_batch(std::slice::from_ref(task), &[]).await
    }

    async fn update_batch(
        &self,
        changed: &[Task],
        activities: &[TaskActivity],
    ) -> TaskRepositoryResult<()> {
        let rows: Vec<(TaskRow, Vec<TaskDependencyRow>)> = changed
            .iter()
            .map(|task| (task_to_row(task), dependency_rows(task)))
            .collect();
        let history: Vec<TaskActivityRow> = activities.iter().map(activity_to_row).collect();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let mut missing = None;
            let outcome = connection.transaction::<_, DieselError, _>(|tx| {
                for (row, edges) in &rows {
                    let affected = diesel::update(tasks::table.filter(tasks::id.eq(row.id)))
                        .set(row)
                        .execute(tx)?;
                    if affected == 0 {
                        missing = Some(TaskId::from_uuid(row.id));
                        return Err(DieselError::RollbackTransaction);
                    }
                    replace_dependencies(tx, row.id, edges)?;
                }
                if !history.is_empty() {
                    diesel::insert_into(task_activities::table)
                        .values(&history)
                        .execute(tx)?;
                }
                Ok(())
            });
            match (outcome, missing) {
                (_, Some(id)) => Err(TaskRepositoryError::NotFound(id)),
                (Err(err), None) => Err(TaskRepositoryError::persistence(err)),
                (Ok(()), None) => Ok(()),
            }
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let rows = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(hydrate(connection, rows)?.into_iter().next())
        })
        .await
    }

    async fn find_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let keys: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let rows = tasks::table
                .filter(tasks::id.eq_any(&keys))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn list(&self, scope: TaskScope) -> TaskRepositoryResult<Vec<Task>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let mut query = tasks::table.into_boxed();
            query = match scope {
                TaskScope::Personal(user) => {
                    let key = user.into_inner();
                    query.filter(tasks::created_by.eq(key).or(tasks::assignee_id.eq(key)))
                }
                TaskScope::Project(project) => {
                    query.filter(tasks::project_id.eq(project.into_inner()))
                }
                TaskScope::Idea(idea) => query.filter(tasks::idea_id.eq(idea.into_inner())),
                TaskScope::List(list) => query.filter(tasks::task_list_id.eq(list.into_inner())),
            };
            let rows = query
                .order((tasks::position.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn subtasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_task_id.eq(parent.into_inner()))
                .order((tasks::position.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn dependents(&self, task: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let waiting = task_dependencies::table
                .filter(task_dependencies::depends_on_id.eq(task.into_inner()))
                .select(task_dependencies::task_id);
            let rows = tasks::table
                .filter(tasks::id.eq_any(waiting))
                .order((tasks::position.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn counts(&self, id: TaskId) -> TaskRepositoryResult<TaskCounts> {
        let key = id.into_inner();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let exists: i64 = tasks::table
                .filter(tasks::id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if exists == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            let subtasks: i64 = tasks::table
                .filter(tasks::parent_task_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let completed: i64 = tasks::table
                .filter(tasks::parent_task_id.eq(key))
                .filter(tasks::status.eq(TaskStatus::Done.as_str()))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let comments: i64 = task_comments::table
                .filter(task_comments::task_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let attachments: i64 = task_attachments::table
                .filter(task_attachments::task_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(TaskCounts {
                subtasks: count_column(subtasks)?,
                completed_subtasks: count_column(completed)?,
                comments: count_column(comments)?,
                attachments: count_column(attachments)?,
            })
        })
        .await
    }

    async fn delete_tasks(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<String>> {
        let roots: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| purge_where(tx, roots))
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn purge_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<String>> {
        let key = project.into_inner();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    let roots: Vec<Uuid> = tasks::table
                        .filter(tasks::project_id.eq(key))
                        .select(tasks::id)
                        .load(tx)?;
                    let keys = purge_where(tx, roots)?;
                    diesel::delete(task_lists::table.filter(task_lists::project_id.eq(key)))
                        .execute(tx)?;
                    Ok(keys)
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn purge_idea(&self, idea: IdeaId) -> TaskRepositoryResult<Vec<String>> {
        let key = idea.into_inner();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    let roots: Vec<Uuid> = tasks::table
                        .filter(tasks::idea_id.eq(key))
                        .select(tasks::id)
                        .load(tx)?;
                    purge_where(tx, roots)
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn save_list(&self, list: &TaskList) -> TaskRepositoryResult<()> {
        let row = list_to_row(list);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::insert_into(task_lists::table)
                .values(&row)
                .on_conflict(task_lists::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_list(&self, id: TaskListId) -> TaskRepositoryResult<Option<TaskList>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let row = task_lists::table
                .filter(task_lists::id.eq(id.into_inner()))
                .select(TaskListRow::as_select())
                .first::<TaskListRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_list).transpose()
        })
        .await
    }

    async fn list_lists(&self, scope: ListScope) -> TaskRepositoryResult<Vec<TaskList>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let mut query = task_lists::table.into_boxed();
            query = match scope {
                ListScope::Project(project) => {
                    query.filter(task_lists::project_id.eq(project.into_inner()))
                }
                ListScope::Personal(user) => query
                    .filter(task_lists::project_id.is_null())
                    .filter(task_lists::created_by.eq(user.into_inner())),
            };
            query
                .order((task_lists::position.asc(), task_lists::created_at.asc()))
                .select(TaskListRow::as_select())
                .load::<TaskListRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_list)
                .collect()
        })
        .await
    }

    async fn list_counts(&self, id: TaskListId) -> TaskRepositoryResult<TaskListCounts> {
        let key = id.into_inner();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let total: i64 = tasks::table
                .filter(tasks::task_list_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let completed: i64 = tasks::table
                .filter(tasks::task_list_id.eq(key))
                .filter(tasks::status.eq(TaskStatus::Done.as_str()))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(TaskListCounts {
                tasks: count_column(total)?,
                completed_tasks: count_column(completed)?,
            })
        })
        .await
    }

    async fn delete_list(&self, id: TaskListId) -> TaskRepositoryResult<Vec<String>> {
        let key = id.into_inner();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    let roots: Vec<Uuid> = tasks::table
                        .filter(tasks::task_list_id.eq(key))
                        .select(tasks::id)
                        .load(tx)?;
                    let keys = purge_where(tx, roots)?;
                    diesel::delete(task_lists::table.filter(task_lists::id.eq(key)))
                        .execute(tx)?;
                    Ok(keys)
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn reorder(&self, list: TaskListId, order: &[TaskId]) -> TaskRepositoryResult<()> {
        let key = list.into_inner();
        let ids: Vec<Uuid> = order.iter().map(|id| id.into_inner()).collect();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    for (index, id) in ids.iter().enumerate() {
                        let position = i32::try_from(index).unwrap_or(i32::MAX);
                        diesel::update(
                            tasks::table
                                .filter(tasks::id.eq(*id))
                                .filter(tasks::task_list_id.eq(key)),
                        )
                        .set(tasks::position.eq(position))
                        .execute(tx)?;
                    }
                    Ok(())
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn record_activity(&self, activity: &TaskActivity) -> TaskRepositoryResult<()> {
        let row = activity_to_row(activity);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::insert_into(task_activities::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_activities(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskActivity>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            task_activities::table
                .filter(task_activities::task_id.eq(task.into_inner()))
                .order(task_activities::created_at.desc())
                .select(TaskActivityRow::as_select())
                .load::<TaskActivityRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_activity)
                .collect()
        })
        .await
    }

    async fn save_comment(&self, comment: &TaskComment) -> TaskRepositoryResult<()> {
        let row = comment_to_row(comment);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::insert_into(task_comments::table)
                .values(&row)
                .on_conflict(task_comments::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_comment(&self, id: TaskCommentId) -> TaskRepositoryResult<Option<TaskComment>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let row = task_comments::table
                .filter(task_comments::id.eq(id.into_inner()))
                .select(TaskCommentRow::as_select())
                .first::<TaskCommentRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            Ok(row.map(row_to_comment))
        })
        .await
    }

    async fn list_comments(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskComment>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task.into_inner()))
                .order(task_comments::created_at.asc())
                .select(TaskCommentRow::as_select())
                .load::<TaskCommentRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_comment).collect())
        })
        .await
    }

    async fn delete_comment(&self, id: TaskCommentId) -> TaskRepositoryResult<()> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::delete(task_comments::table.filter(task_comments::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_attachment(&self, attachment: &TaskAttachment) -> TaskRepositoryResult<()> {
        let row = attachment_to_row(attachment);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::insert_into(task_attachments::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_attachment(
        &self,
        id: TaskAttachmentId,
    ) -> TaskRepositoryResult<Option<TaskAttachment>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let row = task_attachments::table
                .filter(task_attachments::id.eq(id.into_inner()))
                .select(TaskAttachmentRow::as_select())
                .first::<TaskAttachmentRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_attachment).transpose()
        })
        .await
    }

    async fn list_attachments(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskAttachment>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            task_attachments::table
                .filter(task_attachments::task_id.eq(task.into_inner()))
                .order(task_attachments::uploaded_at.desc())
                .select(TaskAttachmentRow::as_select())
                .load::<TaskAttachmentRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_attachment)
                .collect()
        })
        .await
    }

    async fn delete_attachment(&self, id: TaskAttachmentId) -> TaskRepositoryResult<()> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::delete(
                task_attachments::table.filter(task_attachments::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_time_log(&self, log: &TaskTimeLog) -> TaskRepositoryResult<()> {
        let row = time_log_to_row(log);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::insert_into(task_time_logs::table)
                .values(&row)
                .on_conflict(task_time_logs::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_time_log(&self, id: TimeLogId) -> TaskRepositoryResult<Option<TaskTimeLog>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let row = task_time_logs::table
                .filter(task_time_logs::id.eq(id.into_inner()))
                .select(TaskTimeLogRow::as_select())
                .first::<TaskTimeLogRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_time_log).transpose()
        })
        .await
    }

    async fn list_time_logs(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskTimeLog>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            task_time_logs::table
                .filter(task_time_logs::task_id.eq(task.into_inner()))
                .order((
                    task_time_logs::work_date.desc(),
                    task_time_logs::created_at.desc(),
                ))
                .select(TaskTimeLogRow::as_select())
                .load::<TaskTimeLogRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_time_log)
                .collect()
        })
        .await
    }

    async fn delete_time_log(&self, id: TimeLogId) -> TaskRepositoryResult<()> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::delete(task_time_logs::table.filter(task_time_logs::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_template(&self, template: &TaskTemplate) -> TaskRepositoryResult<()> {
        let row = template_to_row(template);
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::insert_into(task_templates::table)
                .values(&row)
                .on_conflict(task_templates::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_template(
        &self,
        id: TaskTemplateId,
    ) -> TaskRepositoryResult<Option<TaskTemplate>> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            let row = task_templates::table
                .filter(task_templates::id.eq(id.into_inner()))
                .select(TaskTemplateRow::as_select())
                .first::<TaskTemplateRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_template).transpose()
        })
        .await
    }

    async fn list_templates(&self, user: UserId) -> TaskRepositoryResult<Vec<TaskTemplate>> {
        let key = user.into_inner();
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            task_templates::table
                .filter(
                    task_templates::created_by
                        .eq(key)
                        .or(task_templates::is_public.eq(true)),
                )
                .order(task_templates::name.asc())
                .select(TaskTemplateRow::as_select())
                .load::<TaskTemplateRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_template)
                .collect()
        })
        .await
    }

    async fn delete_template(&self, id: TaskTemplateId) -> TaskRepositoryResult<()> {
        run_blocking(&self.pool, TaskRepositoryError::persistence, move |connection| {
            diesel::delete(task_templates::table.filter(task_templates::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn hours_column(hours: Hours) -> i32 {
    i32::try_from(hours.hundredths()).unwrap_or(i32::MAX)
}

pub(super) fn hours_from_column(value: i32) -> TaskRepositoryResult<Hours> {
    u32::try_from(value)
        .ok()
        .and_then(Hours::from_hundredths)
        .ok_or_else(|| TaskRepositoryError::persistence(InvalidHours(value)))
}

fn position_column(position: u32) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

fn size_column(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

pub(super) fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        project_id: task.project().map(ProjectId::into_inner),
        idea_id: task.idea().map(IdeaId::into_inner),
        task_list_id: task.task_list().map(TaskListId::into_inner),
        assignee_id: task.assignee().map(UserId::into_inner),
        created_by: task.created_by().into_inner(),
        parent_task_id: task.parent_task().map(TaskId::into_inner),
        due_date: task.due_date(),
        start_date: task.start_date(),
        completed_at: task.completed_at(),
        estimated_hundredths: task.estimated_hours().map(hours_column),
        actual_hundredths: task.actual_hours().map(hours_column),
        position: position_column(task.position()),
        tags: task.tags().to_csv(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn dependency_rows(task: &Task) -> Vec<TaskDependencyRow> {
    task.dependencies()
        .iter()
        .map(|dependency| TaskDependencyRow {
            task_id: task.id().into_inner(),
            depends_on_id: dependency.into_inner(),
        })
        .collect()
}

pub(super) fn row_to_task(row: TaskRow, dependencies: Vec<TaskId>) -> TaskRepositoryResult<Task> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority =
        TaskPriority::try_from(row.priority.as_str()).map_err(TaskRepositoryError::persistence)?;
    let position = u32::try_from(row.position).map_err(TaskRepositoryError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        status,
        priority,
        project: row.project_id.map(ProjectId::from_uuid),
        idea: row.idea_id.map(IdeaId::from_uuid),
        task_list: row.task_list_id.map(TaskListId::from_uuid),
        assignee: row.assignee_id.map(UserId::from_uuid),
        created_by: UserId::from_uuid(row.created_by),
        parent_task: row.parent_task_id.map(TaskId::from_uuid),
        dependencies,
        due_date: row.due_date,
        start_date: row.start_date,
        completed_at: row.completed_at,
        estimated_hours: row.estimated_hundredths.map(hours_from_column).transpose()?,
        actual_hours: row.actual_hundredths.map(hours_from_column).transpose()?,
        position,
        tags: Tags::from_persisted(&row.tags),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn list_to_row(list: &TaskList) -> TaskListRow {
    TaskListRow {
        id: list.id.into_inner(),
        project_id: list.project.map(ProjectId::into_inner),
        name: list.name.clone(),
        description: list.description.clone(),
        position: position_column(list.position),
        created_by: list.created_by.into_inner(),
        created_at: list.created_at,
        updated_at: list.updated_at,
    }
}

fn row_to_list(row: TaskListRow) -> TaskRepositoryResult<TaskList> {
    let position = u32::try_from(row.position).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskList {
        id: TaskListId::from_uuid(row.id),
        project: row.project_id.map(ProjectId::from_uuid),
        name: row.name,
        description: row.description,
        position,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(super) fn activity_to_row(activity: &TaskActivity) -> TaskActivityRow {
    TaskActivityRow {
        id: activity.id.into_inner(),
        task_id: activity.task_id.into_inner(),
        user_id: activity.user.into_inner(),
        action: activity.action.as_str().to_owned(),
        description: activity.description.clone(),
        old_value: activity.old_value.clone(),
        new_value: activity.new_value.clone(),
        created_at: activity.created_at,
    }
}

pub(super) fn row_to_activity(row: TaskActivityRow) -> TaskRepositoryResult<TaskActivity> {
    let action =
        ActivityAction::try_from(row.action.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskActivity {
        id: TaskActivityId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        action,
        description: row.description,
        old_value: row.old_value,
        new_value: row.new_value,
        user: UserId::from_uuid(row.user_id),
        created_at: row.created_at,
    })
}

fn comment_to_row(comment: &TaskComment) -> TaskCommentRow {
    TaskCommentRow {
        id: comment.id.into_inner(),
        task_id: comment.task_id.into_inner(),
        author_id: comment.author.into_inner(),
        content: comment.content.clone(),
        parent_id: comment.parent.map(TaskCommentId::into_inner),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn row_to_comment(row: TaskCommentRow) -> TaskComment {
    TaskComment {
        id: TaskCommentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        author: UserId::from_uuid(row.author_id),
        content: row.content,
        parent: row.parent_id.map(TaskCommentId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn attachment_to_row(attachment: &TaskAttachment) -> TaskAttachmentRow {
    TaskAttachmentRow {
        id: attachment.id.into_inner(),
        task_id: attachment.task_id.into_inner(),
        file_name: attachment.file.file_name.clone(),
        content_type: attachment.file.content_type.clone(),
        file_size: size_column(attachment.file.size),
        storage_key: attachment.file.storage_key.clone(),
        sha256: attachment.file.sha256.clone(),
        uploaded_by: attachment.uploaded_by.into_inner(),
        uploaded_at: attachment.uploaded_at,
    }
}

fn row_to_attachment(row: TaskAttachmentRow) -> TaskRepositoryResult<TaskAttachment> {
    let size = u64::try_from(row.file_size).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskAttachment {
        id: TaskAttachmentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
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

pub(super) fn time_log_to_row(log: &TaskTimeLog) -> TaskTimeLogRow {
    TaskTimeLogRow {
        id: log.id.into_inner(),
        task_id: log.task_id.into_inner(),
        user_id: log.user.into_inner(),
        description: log.description.clone(),
        hundredths: hours_column(log.hours),
        work_date: log.date,
        created_at: log.created_at,
    }
}

pub(super) fn row_to_time_log(row: TaskTimeLogRow) -> TaskRepositoryResult<TaskTimeLog> {
    Ok(TaskTimeLog {
        id: TimeLogId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        user: UserId::from_uuid(row.user_id),
        description: row.description,
        hours: hours_from_column(row.hundredths)?,
        date: row.work_date,
        created_at: row.created_at,
    })
}

pub(super) fn template_to_row(template: &TaskTemplate) -> TaskTemplateRow {
    TaskTemplateRow {
        id: template.id.into_inner(),
        name: template.name.clone(),
        description: template.description.clone(),
        title_template: template.title_template.clone(),
        description_template: template.description_template.clone(),
        priority: template.priority.as_str().to_owned(),
        estimated_hundredths: template.estimated_hours.map(hours_column),
        tags: template.tags.to_csv(),
        created_by: template.created_by.into_inner(),
        is_public: template.is_public,
        created_at: template.created_at,
    }
}

pub(super) fn row_to_template(row: TaskTemplateRow) -> TaskRepositoryResult<TaskTemplate> {
    let priority =
        TaskPriority::try_from(row.priority.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskTemplate {
        id: TaskTemplateId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        title_template: row.title_template,
        description_template: row.description_template,
        priority,
        estimated_hours: row.estimated_hundredths.map(hours_from_column).transpose()?,
        tags: Tags::from_persisted(&row.tags),
        created_by: UserId::from_uuid(row.created_by),
        is_public: row.is_public,
        created_at: row.created_at,
    })
}
