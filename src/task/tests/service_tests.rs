//! Service tests for task access, relations, bulk changes and reporting.

use super::support::{Harness, in_project};
use crate::access::{AccessError, AccessRole, Action, MemberRole};
use crate::account::domain::UserId;
use crate::shared::Tags;
use crate::task::{
    domain::{
        ActivityAction, ListScope, NewTask, RelationChanges, TaskChanges, TaskFilter,
        TaskPriority, TaskScope, TaskStatus,
    },
    services::{BulkAction, CompleteOutcome, NewTaskList, TaskServiceError},
};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn is_validation(result: &Result<impl std::fmt::Debug, TaskServiceError>, field: &str) -> bool {
    matches!(result, Err(TaskServiceError::Validation(err)) if err.field == field)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn standalone_tasks_are_hidden_from_strangers(harness: Harness) {
    let task = harness.standalone(harness.owner, "Private errand").await;

    let result = harness.tasks.detail(UserId::new(), task).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Access(AccessError::NotVisible))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_viewers_see_but_cannot_change_tasks(harness: Harness) {
    let project = harness.project("Apollo").await;
    let task = harness.project_task(project, "Design lander").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;

    let detail = harness.tasks.detail(viewer, task).await.expect("visible");
    let update = harness
        .tasks
        .update(
            viewer,
            task,
            TaskChanges {
                status: Some(TaskStatus::InProgress),
                ..TaskChanges::default()
            },
            RelationChanges::default(),
        )
        .await;

    assert_eq!(detail.overview.grant.role, AccessRole::Viewer);
    assert!(!detail.overview.grant.permissions().can_contribute);
    assert!(matches!(
        update,
        Err(TaskServiceError::Access(AccessError::Forbidden {
            action: Action::Contribute,
            ..
        }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn contributors_create_tasks_in_their_project(harness: Harness) {
    let project = harness.project("Apollo").await;
    let contributor = harness
        .project_member(project, MemberRole::Contributor)
        .await;

    let grant = harness
        .tasks
        .create(contributor, NewTask::titled("Calibrate"), in_project(project))
        .await
        .expect("created");

    assert_eq!(grant.role, AccessRole::Contributor);
    assert_eq!(grant.context.display(), "Project: Apollo");
    assert_eq!(grant.task.created_by(), contributor);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hidden_projects_read_as_missing_references(harness: Harness) {
    let project = harness.project("Apollo").await;

    let result = harness
        .tasks
        .create(UserId::new(), NewTask::titled("Sneak in"), in_project(project))
        .await;

    assert!(is_validation(&result, "project_id"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_cannot_create_tasks_in_a_project(harness: Harness) {
    let project = harness.project("Apollo").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;

    let result = harness
        .tasks
        .create(viewer, NewTask::titled("Watch only"), in_project(project))
        .await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Access(AccessError::Forbidden { .. }))
    ));
}

fn is_forbidden_contribute(result: &Result<impl std::fmt::Debug, TaskServiceError>) -> bool {
    matches!(
        result,
        Err(TaskServiceError::Access(AccessError::Forbidden {
            action: Action::Contribute,
            ..
        }))
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn self_assignment_does_not_let_viewers_create_project_tasks(harness: Harness) {
    let project = harness.project("Apollo").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;
    let input = NewTask {
        assignee: Some(viewer),
        ..NewTask::titled("Watch closely")
    };

    let result = harness
        .tasks
        .create(viewer, input, in_project(project))
        .await;
    let listed = harness
        .tasks
        .list(harness.owner, TaskScope::Project(project), &TaskFilter::default())
        .await
        .expect("visible");

    assert!(is_forbidden_contribute(&result));
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_tasks_cannot_be_assigned_to_outsiders(harness: Harness) {
    let project = harness.project("Apollo").await;
    let contributor = harness
        .project_member(project, MemberRole::Contributor)
        .await;
    let outsider = UserId::new();
    let input = NewTask {
        assignee: Some(outsider),
        ..NewTask::titled("Leak the plans")
    };

    let result = harness
        .tasks
        .create(contributor, input, in_project(project))
        .await;

    assert!(is_validation(&result, "assignee_id"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_viewers_may_be_assigned_and_then_update(harness: Harness) {
    let project = harness.project("Apollo").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;
    let input = NewTask {
        assignee: Some(viewer),
        ..NewTask::titled("Check telemetry")
    };
    let task = harness
        .tasks
        .create(harness.owner, input, in_project(project))
        .await
        .expect("members may be assigned")
        .task
        .id();

    let updated = harness
        .tasks
        .update(
            viewer,
            task,
            TaskChanges {
                status: Some(TaskStatus::InProgress),
                ..TaskChanges::default()
            },
            RelationChanges::default(),
        )
        .await
        .expect("assignee may update");

    assert_eq!(updated.task.status(), TaskStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_cannot_move_their_tasks_into_a_project(harness: Harness) {
    let project = harness.project("Apollo").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;
    let task = harness.standalone(viewer, "Side quest").await;

    let result = harness
        .tasks
        .update(viewer, task, TaskChanges::default(), in_project(project))
        .await;
    let unchanged = harness.tasks.detail(viewer, task).await.expect("visible");

    assert!(is_forbidden_contribute(&result));
    assert_eq!(unchanged.overview.grant.task.project(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigning_a_project_task_keeps_outsiders_out(harness: Harness) {
    let project = harness.project("Apollo").await;
    let task = harness.project_task(project, "Design lander").await;
    let outsider = UserId::new();

    let result = harness
        .tasks
        .update(
            harness.owner,
            task,
            TaskChanges {
                assignee: Some(Some(outsider)),
                ..TaskChanges::default()
            },
            RelationChanges::default(),
        )
        .await;
    let hidden = harness.tasks.detail(outsider, task).await;

    assert!(is_validation(&result, "assignee_id"));
    assert!(matches!(
        hidden,
        Err(TaskServiceError::Access(AccessError::NotVisible))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_take_the_stronger_of_project_and_idea_roles(harness: Harness) {
    let project = harness.project("Apollo").await;
    let idea = harness.idea("Lander").await;
    let user = harness.project_member(project, MemberRole::Viewer).await;
    harness
        .ideas
        .add_member(
            harness.owner,
            idea,
            &super::support::summary(user),
            MemberRole::Editor,
        )
        .await
        .expect("member is added");
    let relations = RelationChanges {
        project: Some(Some(project)),
        idea: Some(Some(idea)),
        ..RelationChanges::default()
    };
    let task = harness
        .tasks
        .create(harness.owner, NewTask::titled("Shared"), relations)
        .await
        .expect("created")
        .task
        .id();

    let grant = harness
        .tasks
        .authorize(user, task, Action::Edit)
        .await
        .expect("editor through the idea");

    assert_eq!(grant.role, AccessRole::Editor);
    assert_eq!(grant.context.display(), "Project: Apollo | Idea: Lander");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignees_update_but_cannot_delete(harness: Harness) {
    let assignee = UserId::new();
    let input = NewTask {
        assignee: Some(assignee),
        ..NewTask::titled("Pick up parcel")
    };
    let task = harness
        .tasks
        .create(harness.owner, input, RelationChanges::default())
        .await
        .expect("created")
        .task
        .id();

    let updated = harness
        .tasks
        .update(
            assignee,
            task,
            TaskChanges {
                status: Some(TaskStatus::Done),
                ..TaskChanges::default()
            },
            RelationChanges::default(),
        )
        .await
        .expect("assignee may update");
    let deleted = harness.tasks.delete(assignee, task).await;

    assert!(updated.task.completed_at().is_some());
    assert!(matches!(
        deleted,
        Err(TaskServiceError::Access(AccessError::Forbidden {
            action: Action::Delete,
            ..
        }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creators_may_delete_their_project_tasks(harness: Harness) {
    let project = harness.project("Apollo").await;
    let contributor = harness
        .project_member(project, MemberRole::Contributor)
        .await;
    let own = harness
        .tasks
        .create(contributor, NewTask::titled("Mine"), in_project(project))
        .await
        .expect("created")
        .task
        .id();
    let foreign = harness.project_task(project, "Theirs").await;

    harness
        .tasks
        .delete(contributor, own)
        .await
        .expect("creator may delete");
    let refused = harness.tasks.delete(contributor, foreign).await;

    assert!(refused.is_err());
    assert!(harness.tasks.detail(harness.owner, own).await.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parent_cycles_are_rejected(harness: Harness) {
    let top = harness.standalone(harness.owner, "Top").await;
    let child = harness
        .tasks
        .create(
            harness.owner,
            NewTask::titled("Child"),
            RelationChanges {
                parent_task: Some(Some(top)),
                ..RelationChanges::default()
            },
        )
        .await
        .expect("created")
        .task
        .id();

    let result = harness
        .tasks
        .update(
            harness.owner,
            top,
            TaskChanges::default(),
            RelationChanges {
                parent_task: Some(Some(child)),
                ..RelationChanges::default()
            },
        )
        .await;

    assert!(is_validation(&result, "parent_task_id"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_cycles_are_rejected(harness: Harness) {
    let first = harness.standalone(harness.owner, "First").await;
    let second = harness.standalone(harness.owner, "Second").await;
    let depends_on = |ids| RelationChanges {
        dependencies: Some(ids),
        ..RelationChanges::default()
    };
    harness
        .tasks
        .update(harness.owner, second, TaskChanges::default(), depends_on(vec![first]))
        .await
        .expect("no cycle yet");

    let result = harness
        .tasks
        .update(harness.owner, first, TaskChanges::default(), depends_on(vec![second]))
        .await;

    assert!(is_validation(&result, "dependency_ids"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hidden_tasks_cannot_become_dependencies(harness: Harness) {
    let foreign = harness.standalone(UserId::new(), "Someone else's").await;

    let result = harness
        .tasks
        .create(
            harness.owner,
            NewTask::titled("Mine"),
            RelationChanges {
                dependencies: Some(vec![foreign]),
                ..RelationChanges::default()
            },
        )
        .await;

    assert!(is_validation(&result, "dependency_ids"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_dependencies_block_a_task(harness: Harness) {
    let blocker = harness.standalone(harness.owner, "Blocker").await;
    let grant = harness
        .tasks
        .create(
            harness.owner,
            NewTask::titled("Waiting"),
            RelationChanges {
                dependencies: Some(vec![blocker]),
                ..RelationChanges::default()
            },
        )
        .await
        .expect("created");

    let waiting = harness
        .tasks
        .detail(harness.owner, grant.task.id())
        .await
        .expect("visible");
    harness
        .tasks
        .complete(harness.owner, blocker)
        .await
        .expect("completed");
    let released = harness
        .tasks
        .detail(harness.owner, grant.task.id())
        .await
        .expect("visible");
    let blocker_detail = harness
        .tasks
        .detail(harness.owner, blocker)
        .await
        .expect("visible");

    assert!(!waiting.can_start);
    assert_eq!(waiting.blocked_dependencies.len(), 1);
    assert!(released.can_start);
    assert!(released.blocked_dependencies.is_empty());
    assert_eq!(blocker_detail.dependents.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_records_creation_and_changes(harness: Harness) {
    let project = harness.project("Apollo").await;
    let task = harness.project_task(project, "Design lander").await;
    harness
        .tasks
        .update(
            harness.owner,
            task,
            TaskChanges {
                priority: Some(TaskPriority::Urgent),
                ..TaskChanges::default()
            },
            RelationChanges::default(),
        )
        .await
        .expect("updated");

    let history = harness
        .tasks
        .activities(harness.owner, task)
        .await
        .expect("visible");

    let actions: Vec<ActivityAction> = history.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        [ActivityAction::PriorityChanged, ActivityAction::Created]
    );
    assert_eq!(
        history.last().map(|entry| entry.description.as_str()),
        Some("Task \"Design lander\" was created in Project: Apollo")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_twice_reports_already_done(harness: Harness) {
    let task = harness.standalone(harness.owner, "Ship it").await;

    let first = harness
        .tasks
        .complete(harness.owner, task)
        .await
        .expect("completed");
    let second = harness
        .tasks
        .complete(harness.owner, task)
        .await
        .expect("no-op");

    assert!(matches!(
        first,
        CompleteOutcome::Completed(grant) if grant.task.status() == TaskStatus::Done
    ));
    assert_eq!(second, CompleteOutcome::AlreadyDone);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_requires_at_least_one_task(harness: Harness) {
    let result = harness
        .tasks
        .bulk(harness.owner, Vec::new(), BulkAction::Delete)
        .await;

    assert!(is_validation(&result, "task_ids"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_changes_nothing_when_one_task_is_hidden(harness: Harness) {
    let mine = harness.standalone(harness.owner, "Mine").await;
    let foreign = harness.standalone(UserId::new(), "Theirs").await;

    let result = harness
        .tasks
        .bulk(
            harness.owner,
            vec![mine, foreign],
            BulkAction::UpdatePriority(TaskPriority::High),
        )
        .await;
    let untouched = harness
        .tasks
        .detail(harness.owner, mine)
        .await
        .expect("visible");

    assert!(matches!(
        result,
        Err(TaskServiceError::Access(AccessError::NotVisible))
    ));
    assert_eq!(
        untouched.overview.grant.task.priority(),
        TaskPriority::Medium
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_list_moves_need_contribute_on_the_destination(harness: Harness) {
    let project = harness.project("Apollo").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;
    let mine = harness.standalone(viewer, "Side quest").await;
    let list = harness
        .tasks
        .create_list(
            harness.owner,
            NewTaskList {
                project: Some(project),
                name: "Sprint 1".to_owned(),
                ..NewTaskList::default()
            },
        )
        .await
        .expect("owner may create")
        .list;

    let result = harness
        .tasks
        .bulk(viewer, vec![mine], BulkAction::UpdateTaskList(list.id))
        .await;
    let unchanged = harness.tasks.detail(viewer, mine).await.expect("visible");

    assert!(is_forbidden_contribute(&result));
    assert_eq!(unchanged.overview.grant.task.project(), None);
    assert_eq!(unchanged.overview.grant.task.task_list(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_assignment_rejects_users_outside_the_project(harness: Harness) {
    let project = harness.project("Apollo").await;
    let task = harness.project_task(project, "Design lander").await;
    let member = harness.project_member(project, MemberRole::Viewer).await;

    let refused = harness
        .tasks
        .bulk(
            harness.owner,
            vec![task],
            BulkAction::UpdateAssignee(UserId::new()),
        )
        .await;
    let accepted = harness
        .tasks
        .bulk(harness.owner, vec![task], BulkAction::UpdateAssignee(member))
        .await;

    assert!(is_validation(&refused, "assignee_id"));
    assert_eq!(accepted.expect("members may be assigned"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_tag_changes_merge_and_remove(harness: Harness) {
    let first = harness.standalone(harness.owner, "First").await;
    let second = harness.standalone(harness.owner, "Second").await;
    let tags = |raw: &str| Tags::parse("tags", raw).expect("valid tags");

    let added = harness
        .tasks
        .bulk(
            harness.owner,
            vec![first, second, first],
            BulkAction::AddTags(tags("ops, review")),
        )
        .await
        .expect("applied");
    harness
        .tasks
        .bulk(harness.owner, vec![second], BulkAction::RemoveTags(tags("review")))
        .await
        .expect("applied");

    let first_tags = harness
        .tasks
        .detail(harness.owner, first)
        .await
        .expect("visible")
        .overview
        .grant
        .task
        .tags()
        .to_csv();
    let second_tags = harness
        .tasks
        .detail(harness.owner, second)
        .await
        .expect("visible")
        .overview
        .grant
        .task
        .tags()
        .to_csv();

    assert_eq!(added, 2);
    assert!(first_tags.contains("review"));
    assert!(!second_tags.contains("review"));
    assert!(second_tags.contains("ops"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_delete_removes_subtasks(harness: Harness) {
    let parent = harness.standalone(harness.owner, "Parent").await;
    let child = harness
        .tasks
        .create(
            harness.owner,
            NewTask::titled("Child"),
            RelationChanges {
                parent_task: Some(Some(parent)),
                ..RelationChanges::default()
            },
        )
        .await
        .expect("created")
        .task
        .id();

    let removed = harness
        .tasks
        .bulk(harness.owner, vec![parent], BulkAction::Delete)
        .await
        .expect("deleted");

    assert_eq!(removed, 1);
    assert!(harness.tasks.detail(harness.owner, child).await.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_apply_filters_and_visibility(harness: Harness) {
    let project = harness.project("Apollo").await;
    harness.project_task(project, "Fix telemetry").await;
    harness.project_task(project, "Paint hull").await;

    let filter = TaskFilter {
        search: Some("telemetry".to_owned()),
        ..TaskFilter::default()
    };
    let found = harness
        .tasks
        .list(harness.owner, TaskScope::Project(project), &filter)
        .await
        .expect("visible");
    let hidden = harness
        .tasks
        .list(UserId::new(), TaskScope::Project(project), &TaskFilter::default())
        .await;

    assert_eq!(found.len(), 1);
    assert!(hidden.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn personal_lists_belong_to_their_creator(harness: Harness) {
    let list = harness
        .tasks
        .create_list(
            harness.owner,
            NewTaskList {
                name: "Errands".to_owned(),
                ..NewTaskList::default()
            },
        )
        .await
        .expect("created")
        .list;

    let own = harness
        .tasks
        .lists(harness.owner, ListScope::Personal(harness.owner))
        .await
        .expect("visible");
    let foreign = harness.tasks.get_list(UserId::new(), list.id).await;

    assert_eq!(own.len(), 1);
    assert!(matches!(
        foreign,
        Err(TaskServiceError::Access(AccessError::NotVisible))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_lists_need_edit_to_change(harness: Harness) {
    let project = harness.project("Apollo").await;
    let contributor = harness
        .project_member(project, MemberRole::Contributor)
        .await;
    let input = NewTaskList {
        project: Some(project),
        name: "Sprint 1".to_owned(),
        ..NewTaskList::default()
    };

    let refused = harness.tasks.create_list(contributor, input.clone()).await;
    let created = harness
        .tasks
        .create_list(harness.owner, input)
        .await
        .expect("owner may create");
    let listed = harness
        .tasks
        .lists(contributor, ListScope::Project(project))
        .await
        .expect("contributors read lists");

    assert!(matches!(
        refused,
        Err(TaskServiceError::Access(AccessError::Forbidden { .. }))
    ));
    assert_eq!(listed, [created]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reordering_positions_tasks_in_the_list(harness: Harness) {
    let project = harness.project("Apollo").await;
    let list = harness
        .tasks
        .create_list(
            harness.owner,
            NewTaskList {
                project: Some(project),
                name: "Sprint".to_owned(),
                ..NewTaskList::default()
            },
        )
        .await
        .expect("created")
        .list;
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let grant = harness
            .tasks
            .create(
                harness.owner,
                NewTask::titled(title),
                RelationChanges {
                    task_list: Some(Some(list.id)),
                    ..RelationChanges::default()
                },
            )
            .await
            .expect("created");
        assert_eq!(grant.task.project(), Some(project));
        ids.push(grant.task.id());
    }
    ids.reverse();

    harness
        .tasks
        .reorder(harness.owner, list.id, &ids)
        .await
        .expect("reordered");
    let listed: Vec<_> = harness
        .tasks
        .list(harness.owner, TaskScope::List(list.id), &TaskFilter::default())
        .await
        .expect("visible")
        .into_iter()
        .map(|overview| overview.grant.task.id())
        .collect();

    assert_eq!(listed, ids);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dashboard_and_stats_count_visible_tasks(harness: Harness) {
    let project = harness.project("Apollo").await;
    harness.project_task(project, "In project").await;
    let solo = harness.standalone(harness.owner, "Solo").await;
    harness
        .tasks
        .complete(harness.owner, solo)
        .await
        .expect("completed");

    let dashboard = harness.tasks.dashboard(harness.owner).await.expect("built");
    let stats = harness
        .tasks
        .stats(harness.owner, TaskScope::Project(project))
        .await
        .expect("visible");

    assert_eq!(dashboard.my_tasks_summary.total, 2);
    assert_eq!(dashboard.my_tasks_summary.done, 1);
    assert_eq!(dashboard.by_context.project_tasks, 1);
    assert_eq!(dashboard.by_context.standalone_tasks, 1);
    assert_eq!(dashboard.recent_tasks.len(), 2);
    assert_eq!(stats.context, "Project: Apollo");
    assert_eq!(stats.total_tasks, 1);
    assert_eq!(stats.by_status.get("todo"), Some(&1));
    assert_eq!(stats.by_status.get("blocked"), Some(&0));
    assert_eq!(stats.total_time_logged, "0.00");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn purging_a_project_removes_its_tasks_and_can_be_repeated(harness: Harness) {
    let project = harness.project("Apollo").await;
    let task = harness.project_task(project, "Doomed").await;

    harness
        .tasks
        .purge_project(project)
        .await
        .expect("purged");
    let repeated = harness.tasks.purge_project(project).await;
    let listed = harness
        .tasks
        .list(harness.owner, TaskScope::Project(project), &TaskFilter::default())
        .await
        .expect("project still visible");

    assert!(repeated.is_ok());
    assert!(listed.is_empty());
    assert!(harness.tasks.detail(harness.owner, task).await.is_err());
}
