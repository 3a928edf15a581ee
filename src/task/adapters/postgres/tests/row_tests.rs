//! Conversion tests between task domain values and diesel rows.

use super::super::models::TaskActivityRow;
use super::super::repository::{
    activity_to_row, hours_from_column, row_to_activity, row_to_task, row_to_template,
    row_to_time_log, task_to_row, template_to_row, time_log_to_row,
};
use crate::account::domain::UserId;
use crate::project::domain::ProjectId;
use crate::task::domain::{
    ActivityAction, ActivityEntry, Hours, NewTask, NewTemplate, Task,
    TaskActivity, TaskId, TaskPriority, TaskStatus, TaskTemplate, TaskTimeLog,
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

fn hours(raw: &str) -> Hours {
    Hours::parse(raw).expect("valid hours")
}

#[fixture]
fn task() -> Task {
    let mut task = Task::create(
        NewTask {
            description: "Write the migration".to_owned(),
            status: TaskStatus::InReview,
            priority: TaskPriority::Urgent,
            estimated_hours: Some(hours("2.5")),
            tags: "db, backend".to_owned(),
            assignee: Some(UserId::new()),
            ..NewTask::titled("Schema")
        },
        UserId::new(),
        &DefaultClock,
    )
    .expect("valid task");
    task.set_context(Some(ProjectId::new()), None, &DefaultClock);
    task.set_dependencies(vec![TaskId::new(), TaskId::new()], &DefaultClock)
        .expect("no self dependency");
    task.set_actual_hours(Some(hours("1.25")), &DefaultClock);
    task
}

#[rstest]
fn task_row_round_trip_preserves_fields_and_dependencies(task: Task) {
    let dependencies = task.dependencies().to_vec();
    let row = task_to_row(&task);
    assert_eq!(row.estimated_hundredths, Some(250));
    assert_eq!(row.actual_hundredths, Some(125));
    assert_eq!(row.status, "in_review");
    let restored = row_to_task(row, dependencies).expect("row converts back");
    assert_eq!(restored, task);
}

#[rstest]
fn unknown_status_is_rejected(task: Task) {
    let mut row = task_to_row(&task);
    row.status = "archived".to_owned();
    assert!(row_to_task(row, Vec::new()).is_err());
}

#[rstest]
#[case(-1)]
#[case(100_000)]
fn hour_columns_outside_the_range_are_rejected(#[case] value: i32) {
    assert!(hours_from_column(value).is_err());
}

#[rstest]
fn negative_positions_are_rejected(task: Task) {
    let mut row = task_to_row(&task);
    row.position = -3;
    assert!(row_to_task(row, Vec::new()).is_err());
}

#[rstest]
fn activity_row_keeps_its_action(task: Task) {
    let activity = TaskActivity::record(
        task.id(),
        ActivityEntry::note(ActivityAction::DependencyAdded, "Dependencies added: Schema"),
        task.created_by(),
        &DefaultClock,
    );
    let row = activity_to_row(&activity);
    assert_eq!(row.action, "dependency_added");
    assert_eq!(row_to_activity(row).expect("converts"), activity);
}

#[rstest]
fn unknown_activity_action_is_rejected(task: Task) {
    let row = TaskActivityRow {
        id: uuid::Uuid::new_v4(),
        task_id: task.id().into_inner(),
        user_id: task.created_by().into_inner(),
        action: "archived".to_owned(),
        description: String::new(),
        old_value: String::new(),
        new_value: String::new(),
        created_at: task.created_at(),
    };
    assert!(row_to_activity(row).is_err());
}

#[rstest]
fn time_log_row_stores_hundredths(task: Task) {
    let date = NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date");
    let log = TaskTimeLog::new(
        task.id(),
        task.created_by(),
        "Pairing".to_owned(),
        hours("0.75"),
        date,
        &DefaultClock,
    )
    .expect("valid log");
    let row = time_log_to_row(&log);
    assert_eq!(row.hundredths, 75);
    assert_eq!(row.work_date, date);
    assert_eq!(row_to_time_log(row).expect("converts"), log);
}

#[rstest]
fn template_row_round_trip() {
    let template = TaskTemplate::new(
        NewTemplate {
            name: "Release".to_owned(),
            title_template: "Release {{ project }}".to_owned(),
            priority: TaskPriority::High,
            estimated_hours: Some(hours("3")),
            tags: "release".to_owned(),
            is_public: true,
            ..NewTemplate::default()
        },
        UserId::new(),
        &DefaultClock,
    )
    .expect("valid template");
    let row = template_to_row(&template);
    assert_eq!(row.estimated_hundredths, Some(300));
    assert_eq!(row_to_template(row).expect("converts"), template);
}
