//! Service tests for task comments, attachments and time logs.

use super::support::{Harness, in_project};
use crate::access::{AccessError, MemberRole};
use crate::account::domain::UserId;
use crate::blob::Upload;
use crate::task::{
    domain::{ActivityAction, Hours, NewTask, TimeLogChanges},
    services::{NewTimeLog, TaskServiceError},
};
use chrono::NaiveDate;
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn hours(hundredths: u32) -> Hours {
    Hours::from_hundredths(hundredths).expect("in range")
}

fn entry(hundredths: u32) -> NewTimeLog {
    NewTimeLog {
        description: "Pairing".to_owned(),
        hours: hours(hundredths),
        date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replies_nest_under_their_parent(harness: Harness) {
    let task = harness.standalone(harness.owner, "Discuss").await;
    let root = harness
        .tasks
        .create_comment(harness.owner, task, "First".to_owned(), None)
        .await
        .expect("posted");
    harness
        .tasks
        .create_comment(harness.owner, task, "Reply".to_owned(), Some(root.id))
        .await
        .expect("posted");

    let threads = harness
        .tasks
        .comments(harness.owner, task)
        .await
        .expect("visible");
    let history = harness
        .tasks
        .activities(harness.owner, task)
        .await
        .expect("visible");

    assert_eq!(threads.len(), 1);
    assert_eq!(threads.first().map(|thread| thread.replies.len()), Some(1));
    assert_eq!(
        history
            .iter()
            .filter(|activity| activity.action == ActivityAction::CommentAdded)
            .count(),
        2
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_authors_edit_but_editors_delete_comments(harness: Harness) {
    let project = harness.project("Apollo").await;
    let task = harness.project_task(project, "Discuss").await;
    let viewer = harness.project_member(project, MemberRole::Viewer).await;
    let editor = harness.project_member(project, MemberRole::Editor).await;
    let comment = harness
        .tasks
        .create_comment(viewer, task, "Viewers may comment".to_owned(), None)
        .await
        .expect("posted");

    let edited = harness
        .tasks
        .update_comment(editor, task, comment.id, "Rewritten".to_owned())
        .await;
    harness
        .tasks
        .delete_comment(editor, task, comment.id)
        .await
        .expect("editors may delete");

    assert!(matches!(edited, Err(TaskServiceError::NotAuthor)));
    assert!(
        harness
            .tasks
            .comments(harness.owner, task)
            .await
            .expect("visible")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attachments_round_trip_through_the_blob_store(harness: Harness) {
    let task = harness.standalone(harness.owner, "Review").await;
    let upload = Upload {
        file_name: "notes.txt".to_owned(),
        content_type: Some("text/plain".to_owned()),
        bytes: b"checklist".to_vec(),
    };

    let attachment = harness
        .tasks
        .upload_attachment(harness.owner, task, upload)
        .await
        .expect("stored");
    let (_, bytes) = harness
        .tasks
        .download_attachment(harness.owner, task, attachment.id)
        .await
        .expect("readable");
    harness
        .tasks
        .delete_attachment(harness.owner, task, attachment.id)
        .await
        .expect("deleted");

    assert_eq!(attachment.file.size, 9);
    assert_eq!(bytes, b"checklist");
    assert!(harness.blobs.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_releases_its_attachments(harness: Harness) {
    let task = harness.standalone(harness.owner, "Review").await;
    let upload = Upload {
        file_name: "plan.pdf".to_owned(),
        content_type: None,
        bytes: vec![1, 2, 3],
    };
    harness
        .tasks
        .upload_attachment(harness.owner, task, upload)
        .await
        .expect("stored");

    harness
        .tasks
        .delete(harness.owner, task)
        .await
        .expect("deleted");

    assert!(harness.blobs.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn time_logs_keep_actual_hours_in_sync(harness: Harness) {
    let task = harness.standalone(harness.owner, "Build").await;
    let first = harness
        .tasks
        .log_time(harness.owner, task, entry(150))
        .await
        .expect("logged");
    harness
        .tasks
        .log_time(harness.owner, task, entry(75))
        .await
        .expect("logged");
    let after_logging = harness
        .tasks
        .detail(harness.owner, task)
        .await
        .expect("visible");

    harness
        .tasks
        .update_time_log(
            harness.owner,
            task,
            first.id,
            TimeLogChanges {
                hours: Some(hours(50)),
                ..TimeLogChanges::default()
            },
        )
        .await
        .expect("updated");
    harness
        .tasks
        .delete_time_log(harness.owner, task, first.id)
        .await
        .expect("deleted");
    let after_delete = harness
        .tasks
        .detail(harness.owner, task)
        .await
        .expect("visible");

    assert_eq!(after_logging.overview.grant.task.actual_hours(), Some(hours(225)));
    assert_eq!(after_logging.total_time_logged, "2.25");
    assert_eq!(after_delete.overview.grant.task.actual_hours(), Some(hours(75)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn totals_beyond_the_storable_range_are_rejected(harness: Harness) {
    let task = harness.standalone(harness.owner, "Marathon").await;
    harness
        .tasks
        .log_time(harness.owner, task, entry(99_000))
        .await
        .expect("logged");

    let result = harness
        .tasks
        .log_time(harness.owner, task, entry(1_000))
        .await;

    assert!(matches!(result, Err(TaskServiceError::Validation(err)) if err.field == "hours"));
    assert_eq!(
        harness
            .tasks
            .time_logs(harness.owner, task)
            .await
            .expect("visible")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_peoples_logs_need_edit(harness: Harness) {
    let project = harness.project("Apollo").await;
    let first = harness
        .project_member(project, MemberRole::Contributor)
        .await;
    let second = harness
        .project_member(project, MemberRole::Contributor)
        .await;
    let task = harness
        .tasks
        .create(first, NewTask::titled("Wiring"), in_project(project))
        .await
        .expect("created")
        .task
        .id();
    let log = harness
        .tasks
        .log_time(first, task, entry(100))
        .await
        .expect("logged");

    let refused = harness.tasks.delete_time_log(second, task, log.id).await;
    let stranger = harness.tasks.time_logs(UserId::new(), task).await;

    assert!(matches!(
        refused,
        Err(TaskServiceError::Access(AccessError::Forbidden { .. }))
    ));
    assert!(matches!(
        stranger,
        Err(TaskServiceError::Access(AccessError::NotVisible))
    ));
}
