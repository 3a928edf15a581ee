//! Append-only task history.

use super::{Task, TaskActivityId, TaskId};
use crate::account::domain::UserId;
use crate::shared::choice_enum;
use chrono::{DateTime, Utc};
use mockable::Clock;

choice_enum! {
    /// Kind of change recorded in a task's history.
    ActivityAction, field = "action" {
        /// Task created.
        Created => "created",
        /// Details other than the tracked fields changed.
        Updated => "updated",
        /// Status changed.
        StatusChanged => "status_changed",
        /// Assignee set or replaced.
        Assigned => "assigned",
        /// Assignee removed.
        Unassigned => "unassigned",
        /// Comment posted.
        CommentAdded => "comment_added",
        /// File attached.
        AttachmentAdded => "attachment_added",
        /// Due date changed.
        DueDateChanged => "due_date_changed",
        /// Priority changed.
        PriorityChanged => "priority_changed",
        /// Moved to another list.
        Moved => "moved",
        /// Dependencies added.
        DependencyAdded => "dependency_added",
        /// Dependencies removed.
        DependencyRemoved => "dependency_removed",
    }
}

/// One change awaiting an author and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Kind of change.
    pub action: ActivityAction,
    /// Human-readable summary.
    pub description: String,
    /// Previous value, empty when not applicable.
    pub old_value: String,
    /// New value, empty when not applicable.
    pub new_value: String,
}

impl ActivityEntry {
    /// Creates an entry without before/after values.
    #[must_use]
    pub fn note(action: ActivityAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            old_value: String::new(),
            new_value: String::new(),
        }
    }

    /// Creates an entry with before and after values.
    #[must_use]
    pub fn change(
        action: ActivityAction,
        description: String,
        old_value: String,
        new_value: String,
    ) -> Self {
        Self {
            action,
            description,
            old_value,
            new_value,
        }
    }
}

/// Recorded task history entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskActivity {
    /// Entry identifier.
    pub id: TaskActivityId,
    /// Task the entry belongs to.
    pub task_id: TaskId,
    /// Kind of change.
    pub action: ActivityAction,
    /// Human-readable summary.
    pub description: String,
    /// Previous value.
    pub old_value: String,
    /// New value.
    pub new_value: String,
    /// Acting user.
    pub user: UserId,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskActivity {
    /// Stamps `entry` with its task, author and the current time.
    #[must_use]
    pub fn record(task_id: TaskId, entry: ActivityEntry, user: UserId, clock: &impl Clock) -> Self {
        Self {
            id: TaskActivityId::new(),
            task_id,
            action: entry.action,
            description: entry.description,
            old_value: entry.old_value,
            new_value: entry.new_value,
            user,
            created_at: clock.utc(),
        }
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|held| held.to_string()).unwrap_or_default()
}

/// Describes how `after` differs from `before`.
///
/// Status, priority, assignee, due date and list changes get their own
/// entries; remaining field changes are folded into one `updated` entry.
/// Dependency changes are described separately because they need the
/// titles of the other tasks.
#[must_use]
pub fn describe_changes(before: &Task, after: &Task) -> Vec<ActivityEntry> {
    let mut entries = Vec::new();
    if before.status() != after.status() {
        entries.push(ActivityEntry::change(
            ActivityAction::StatusChanged,
            format!("Status changed from {} to {}", before.status(), after.status()),
            before.status().to_string(),
            after.status().to_string(),
        ));
    }
    if before.priority() != after.priority() {
        entries.push(ActivityEntry::change(
            ActivityAction::PriorityChanged,
            format!("Priority changed from {} to {}", before.priority(), after.priority()),
            before.priority().to_string(),
            after.priority().to_string(),
        ));
    }
    if before.assignee() != after.assignee() {
        let (action, description) = if after.assignee().is_some() {
            (ActivityAction::Assigned, "Task assigned")
        } else {
            (ActivityAction::Unassigned, "Task unassigned")
        };
        entries.push(ActivityEntry::change(
            action,
            description.to_owned(),
            optional(before.assignee()),
            optional(after.assignee()),
        ));
    }
    if before.due_date() != after.due_date() {
        entries.push(ActivityEntry::change(
            ActivityAction::DueDateChanged,
            "Due date changed".to_owned(),
            optional(before.due_date().map(|due| due.to_rfc3339())),
            optional(after.due_date().map(|due| due.to_rfc3339())),
        ));
    }
    if before.task_list() != after.task_list() {
        entries.push(ActivityEntry::change(
            ActivityAction::Moved,
            "Task moved to another list".to_owned(),
            optional(before.task_list()),
            optional(after.task_list()),
        ));
    }
    let changed_fields = detail_changes(before, after);
    if !changed_fields.is_empty() {
        entries.push(ActivityEntry::change(
            ActivityAction::Updated,
            format!("Updated {}", changed_fields.join(", ")),
            String::new(),
            String::new(),
        ));
    }
    entries
}

fn detail_changes(before: &Task, after: &Task) -> Vec<&'static str> {
    let checks = [
        ("title", before.title() != after.title()),
        ("description", before.description() != after.description()),
        ("start date", before.start_date() != after.start_date()),
        ("estimate", before.estimated_hours() != after.estimated_hours()),
        ("tags", before.tags() != after.tags()),
        ("project", before.project() != after.project()),
        ("idea", before.idea() != after.idea()),
        ("parent task", before.parent_task() != after.parent_task()),
    ];
    checks
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
}
