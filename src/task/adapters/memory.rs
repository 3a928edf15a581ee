//! In-memory task repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::account::domain::UserId;
use crate::idea::domain::IdeaId;
use crate::project::domain::ProjectId;
use crate::task::{
    domain::{
        ListScope, Task, TaskActivity, TaskAttachment, TaskAttachmentId, TaskComment,
        TaskCommentId, TaskCounts, TaskId, TaskList, TaskListCounts, TaskListId, TaskScope,
        TaskStatus, TaskTemplate, TaskTemplateId, TaskTimeLog, TimeLogId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    lists: HashMap<TaskListId, TaskList>,
    activities: Vec<TaskActivity>,
    comments: HashMap<TaskCommentId, TaskComment>,
    attachments: HashMap<TaskAttachmentId, TaskAttachment>,
    time_logs: HashMap<TimeLogId, TaskTimeLog>,
    templates: HashMap<TaskTemplateId, TaskTemplate>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryTaskState {
    /// Expands `roots` with every task below them in the parent hierarchy.
    fn with_descendants(&self, roots: impl IntoIterator<Item = TaskId>) -> HashSet<TaskId> {
        let mut found: HashSet<TaskId> = HashSet::new();
        let mut pending: Vec<TaskId> = roots.into_iter().collect();
        while let Some(next) = pending.pop() {
            if !found.insert(next) {
                continue;
            }
            pending.extend(
                self.tasks
                    .values()
                    .filter(|task| task.parent_task() == Some(next))
                    .map(Task::id),
            );
        }
        found
    }

    /// Removes tasks and everything hanging off them, returning the
    /// attachment storage keys.
    fn remove_tasks(&mut self, doomed: &HashSet<TaskId>) -> Vec<String> {
        self.tasks.retain(|id, _| !doomed.contains(id));
        for task in self.tasks.values_mut() {
            for gone in doomed {
                task.forget_dependency(*gone);
            }
        }
        self.activities
            .retain(|activity| !doomed.contains(&activity.task_id));
        self.comments
            .retain(|_, comment| !doomed.contains(&comment.task_id));
        self.time_logs.retain(|_, log| !doomed.contains(&log.task_id));
        let mut keys = Vec::new();
        self.attachments.retain(|_, attachment| {
            let keep = !doomed.contains(&attachment.task_id);
            if !keep {
                keys.push(attachment.file.storage_key.clone());
            }
            keep
        });
        keys
    }
}

fn poisoned<T>(err: PoisonError<T>) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn in_list_order(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| (task.position(), task.created_at()));
    tasks
}

fn in_scope(task: &Task, scope: TaskScope) -> bool {
    match scope {
        TaskScope::Personal(user) => task.created_by() == user || task.assignee() == Some(user),
        TaskScope::Project(project) => task.project() == Some(project),
        TaskScope::Idea(idea) => task.idea() == Some(idea),
        TaskScope::List(list) => task.task_list() == Some(list),
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let slot = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn update_batch(
        &self,
        tasks: &[Task],
        activities: &[TaskActivity],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if let Some(missing) = tasks.iter().find(|task| !state.tasks.contains_key(&task.id())) {
            return Err(TaskRepositoryError::NotFound(missing.id()));
        }
        for task in tasks {
            state.tasks.insert(task.id(), task.clone());
        }
        state.activities.extend(activities.iter().cloned());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    async fn list(&self, scope: TaskScope) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| in_scope(task, scope))
            .cloned()
            .collect();
        Ok(in_list_order(tasks))
    }

    async fn subtasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.parent_task() == Some(parent))
            .cloned()
            .collect();
        Ok(in_list_order(tasks))
    }

    async fn dependents(&self, task: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let tasks = state
            .tasks
            .values()
            .filter(|other| other.dependencies().contains(&task))
            .cloned()
            .collect();
        Ok(in_list_order(tasks))
    }

    async fn counts(&self, id: TaskId) -> TaskRepositoryResult<TaskCounts> {
        let state = self.state.read().map_err(poisoned)?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        let children: Vec<&Task> = state
            .tasks
            .values()
            .filter(|task| task.parent_task() == Some(id))
            .collect();
        Ok(TaskCounts {
            subtasks: children.len(),
            completed_subtasks: children
                .iter()
                .filter(|task| task.status() == TaskStatus::Done)
                .count(),
            comments: state
                .comments
                .values()
                .filter(|comment| comment.task_id == id)
                .count(),
            attachments: state
                .attachments
                .values()
                .filter(|attachment| attachment.task_id == id)
                .count(),
        })
    }

    async fn delete_tasks(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(poisoned)?;
        let doomed = state.with_descendants(ids.iter().copied());
        Ok(state.remove_tasks(&doomed))
    }

    async fn purge_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(poisoned)?;
        let roots: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.project() == Some(project))
            .map(Task::id)
            .collect();
        let doomed = state.with_descendants(roots);
        let keys = state.remove_tasks(&doomed);
        state.lists.retain(|_, list| list.project != Some(project));
        Ok(keys)
    }

    async fn purge_idea(&self, idea: IdeaId) -> TaskRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(poisoned)?;
        let roots: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.idea() == Some(idea))
            .map(Task::id)
            .collect();
        let doomed = state.with_descendants(roots);
        Ok(state.remove_tasks(&doomed))
    }

    async fn save_list(&self, list: &TaskList) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn find_list(&self, id: TaskListId) -> TaskRepositoryResult<Option<TaskList>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.lists.get(&id).cloned())
    }

    async fn list_lists(&self, scope: ListScope) -> TaskRepositoryResult<Vec<TaskList>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut lists: Vec<TaskList> = state
            .lists
            .values()
            .filter(|list| match scope {
                ListScope::Project(project) => list.project == Some(project),
                ListScope::Personal(user) => list.is_personal() && list.created_by == user,
            })
            .cloned()
            .collect();
        lists.sort_by_key(|list| (list.position, list.created_at));
        Ok(lists)
    }

    async fn list_counts(&self, id: TaskListId) -> TaskRepositoryResult<TaskListCounts> {
        let state = self.state.read().map_err(poisoned)?;
        let inside: Vec<&Task> = state
            .tasks
            .values()
            .filter(|task| task.task_list() == Some(id))
            .collect();
        Ok(TaskListCounts {
            tasks: inside.len(),
            completed_tasks: inside
                .iter()
                .filter(|task| task.status() == TaskStatus::Done)
                .count(),
        })
    }

    async fn delete_list(&self, id: TaskListId) -> TaskRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(poisoned)?;
        let roots: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.task_list() == Some(id))
            .map(Task::id)
            .collect();
        let doomed = state.with_descendants(roots);
        let keys = state.remove_tasks(&doomed);
        state.lists.remove(&id);
        Ok(keys)
    }

    async fn reorder(&self, list: TaskListId, order: &[TaskId]) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        for (index, id) in order.iter().enumerate() {
            let position = u32::try_from(index).map_err(TaskRepositoryError::persistence)?;
            if let Some(task) = state
                .tasks
                .get_mut(id)
                .filter(|task| task.task_list() == Some(list))
            {
                task.set_position(position);
            }
        }
        Ok(())
    }

    async fn record_activity(&self, activity: &TaskActivity) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.activities.push(activity.clone());
        Ok(())
    }

    async fn list_activities(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskActivity>> {
        let state = self.state.read().map_err(poisoned)?;
        // Insertion order breaks ties between entries written in one batch.
        let mut entries: Vec<(usize, TaskActivity)> = state
            .activities
            .iter()
            .enumerate()
            .filter(|(_, activity)| activity.task_id == task)
            .map(|(index, activity)| (index, activity.clone()))
            .collect();
        entries.sort_by(|left, right| {
            (right.1.created_at, right.0).cmp(&(left.1.created_at, left.0))
        });
        Ok(entries.into_iter().map(|(_, activity)| activity).collect())
    }

    async fn save_comment(&self, comment: &TaskComment) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: TaskCommentId) -> TaskRepositoryResult<Option<TaskComment>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.comments.get(&id).cloned())
    }

    async fn list_comments(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskComment>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut comments: Vec<TaskComment> = state
            .comments
            .values()
            .filter(|comment| comment.task_id == task)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);
        Ok(comments)
    }

    async fn delete_comment(&self, id: TaskCommentId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let mut doomed: HashSet<TaskCommentId> = HashSet::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if doomed.insert(next) {
                pending.extend(
                    state
                        .comments
                        .values()
                        .filter(|comment| comment.parent == Some(next))
                        .map(|comment| comment.id),
                );
            }
        }
        state.comments.retain(|key, _| !doomed.contains(key));
        Ok(())
    }

    async fn save_attachment(&self, attachment: &TaskAttachment) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.attachments.insert(attachment.id, attachment.clone());
        Ok(())
    }

    async fn find_attachment(
        &self,
        id: TaskAttachmentId,
    ) -> TaskRepositoryResult<Option<TaskAttachment>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.attachments.get(&id).cloned())
    }

    async fn list_attachments(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskAttachment>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut attachments: Vec<TaskAttachment> = state
            .attachments
            .values()
            .filter(|attachment| attachment.task_id == task)
            .cloned()
            .collect();
        attachments.sort_by(|left, right| right.uploaded_at.cmp(&left.uploaded_at));
        Ok(attachments)
    }

    async fn delete_attachment(&self, id: TaskAttachmentId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.attachments.remove(&id);
        Ok(())
    }

    async fn save_time_log(&self, log: &TaskTimeLog) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.time_logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn find_time_log(&self, id: TimeLogId) -> TaskRepositoryResult<Option<TaskTimeLog>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.time_logs.get(&id).cloned())
    }

    async fn list_time_logs(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskTimeLog>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut logs: Vec<TaskTimeLog> = state
            .time_logs
            .values()
            .filter(|log| log.task_id == task)
            .cloned()
            .collect();
        logs.sort_by(|left, right| {
            (right.date, right.created_at).cmp(&(left.date, left.created_at))
        });
        Ok(logs)
    }

    async fn delete_time_log(&self, id: TimeLogId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.time_logs.remove(&id);
        Ok(())
    }

    async fn save_template(&self, template: &TaskTemplate) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn find_template(
        &self,
        id: TaskTemplateId,
    ) -> TaskRepositoryResult<Option<TaskTemplate>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.templates.get(&id).cloned())
    }

    async fn list_templates(&self, user: UserId) -> TaskRepositoryResult<Vec<TaskTemplate>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut templates: Vec<TaskTemplate> = state
            .templates
            .values()
            .filter(|template| template.is_visible_to(user))
            .cloned()
            .collect();
        templates.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(templates)
    }

    async fn delete_template(&self, id: TaskTemplateId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.templates.remove(&id);
        Ok(())
    }
}
