//! Domain tests for tasks, hours, filters and history entries.

use crate::access::AccessRole;
use crate::account::domain::UserId;
use crate::project::domain::ProjectId;
use crate::task::domain::{
    ActivityAction, AssigneeFilter, ContextType, DueFilter, Hours, NewTask, Task, TaskChanges,
    TaskCounts, TaskDomainError, TaskFilter, TaskList, TaskStatus, TaskTimeLog,
    context_display, describe_changes,
};
use chrono::{Duration, NaiveDate, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn task(clock: &DefaultClock) -> Task {
    Task::create(NewTask::titled("Write report"), UserId::new(), clock).expect("valid task")
}

fn list(project: Option<ProjectId>, clock: &DefaultClock) -> TaskList {
    TaskList::new(
        project,
        "Sprint".to_owned(),
        String::new(),
        0,
        UserId::new(),
        clock,
    )
    .expect("valid list")
}

#[rstest]
fn tasks_created_done_are_stamped_complete(clock: DefaultClock) {
    let input = NewTask {
        status: TaskStatus::Done,
        ..NewTask::titled("Already finished")
    };
    let created = Task::create(input, UserId::new(), &clock).expect("valid");
    assert!(created.completed_at().is_some());
}

#[rstest]
fn leaving_done_clears_completion(clock: DefaultClock) {
    let mut subject = task(&clock);
    subject.set_status(TaskStatus::Done, &clock);
    assert!(subject.completed_at().is_some());

    subject.set_status(TaskStatus::InProgress, &clock);
    assert_eq!(subject.completed_at(), None);
}

#[rstest]
fn blank_titles_are_rejected(clock: DefaultClock) {
    let result = Task::create(NewTask::titled("   "), UserId::new(), &clock);
    assert!(matches!(result, Err(TaskDomainError::Field(err)) if err.field == "title"));
}

#[rstest]
fn tasks_inherit_the_project_of_their_list(clock: DefaultClock) {
    let project = ProjectId::new();
    let mut subject = task(&clock);
    subject
        .place_in(Some(&list(Some(project), &clock)), &clock)
        .expect("list accepted");
    assert_eq!(subject.project(), Some(project));
    assert_eq!(subject.context_type(), ContextType::Project);
}

#[rstest]
fn lists_of_another_project_are_rejected(clock: DefaultClock) {
    let mut subject = task(&clock);
    subject.set_context(Some(ProjectId::new()), None, &clock);
    let result = subject.place_in(Some(&list(Some(ProjectId::new()), &clock)), &clock);
    assert!(matches!(result, Err(TaskDomainError::Field(err)) if err.field == "task_list_id"));
}

#[rstest]
fn changing_project_drops_the_list(clock: DefaultClock) {
    let mut subject = task(&clock);
    subject
        .place_in(Some(&list(Some(ProjectId::new()), &clock)), &clock)
        .expect("list accepted");
    subject.set_context(Some(ProjectId::new()), None, &clock);
    assert_eq!(subject.task_list(), None);
}

#[rstest]
fn tasks_cannot_relate_to_themselves(clock: DefaultClock) {
    let mut subject = task(&clock);
    let own = subject.id();
    assert!(subject.set_parent(Some(own), &clock).is_err());
    assert!(subject.set_dependencies(vec![own], &clock).is_err());
}

#[rstest]
fn dependencies_are_deduplicated(clock: DefaultClock) {
    let mut subject = task(&clock);
    let other = task(&clock).id();
    subject
        .set_dependencies(vec![other, other], &clock)
        .expect("accepted");
    assert_eq!(subject.dependencies(), [other]);
}

#[rstest]
fn standalone_creators_own_and_assignees_contribute(clock: DefaultClock) {
    let creator = UserId::new();
    let assignee = UserId::new();
    let input = NewTask {
        assignee: Some(assignee),
        ..NewTask::titled("Errand")
    };
    let mut subject = Task::create(input, creator, &clock).expect("valid");

    assert_eq!(subject.personal_role(creator), Some(AccessRole::Owner));
    assert_eq!(subject.personal_role(assignee), Some(AccessRole::Contributor));
    assert_eq!(subject.personal_role(UserId::new()), None);

    subject.set_context(Some(ProjectId::new()), None, &clock);
    assert_eq!(subject.personal_role(creator), None);
}

#[rstest]
#[case(0, 0, TaskStatus::Done, 100)]
#[case(0, 0, TaskStatus::InProgress, 0)]
#[case(4, 1, TaskStatus::Todo, 25)]
#[case(3, 3, TaskStatus::Todo, 100)]
fn progress_follows_subtasks_or_status(
    clock: DefaultClock,
    #[case] subtasks: usize,
    #[case] completed_subtasks: usize,
    #[case] status: TaskStatus,
    #[case] expected: u8,
) {
    let mut subject = task(&clock);
    subject.set_status(status, &clock);
    let counts = TaskCounts {
        subtasks,
        completed_subtasks,
        ..TaskCounts::default()
    };
    assert_eq!(subject.progress_percentage(&counts), expected);
}

#[rstest]
fn closed_tasks_are_never_overdue(clock: DefaultClock) {
    let now = Utc::now();
    let input = NewTask {
        due_date: Some(now - Duration::days(1)),
        ..NewTask::titled("Late")
    };
    let mut subject = Task::create(input, UserId::new(), &clock).expect("valid");
    assert!(subject.is_overdue(now));

    subject.set_status(TaskStatus::Cancelled, &clock);
    assert!(!subject.is_overdue(now));
}

#[rstest]
#[case(Some("Apollo"), Some("Lander"), "Project: Apollo | Idea: Lander")]
#[case(Some("Apollo"), None, "Project: Apollo")]
#[case(None, Some("Lander"), "Idea: Lander")]
#[case(None, None, "Personal Task")]
fn context_labels(#[case] project: Option<&str>, #[case] idea: Option<&str>, #[case] label: &str) {
    assert_eq!(context_display(project, idea), label);
}

#[rstest]
fn status_and_assignment_changes_are_described(clock: DefaultClock) {
    let before = task(&clock);
    let mut after = before.clone();
    after
        .apply(
            TaskChanges {
                status: Some(TaskStatus::InReview),
                assignee: Some(Some(UserId::new())),
                title: Some("Write the report".to_owned()),
                ..TaskChanges::default()
            },
            &clock,
        )
        .expect("valid changes");

    let actions: Vec<ActivityAction> = describe_changes(&before, &after)
        .into_iter()
        .map(|entry| entry.action)
        .collect();

    assert_eq!(
        actions,
        [
            ActivityAction::StatusChanged,
            ActivityAction::Assigned,
            ActivityAction::Updated
        ]
    );
}

#[rstest]
fn filters_combine_criteria(clock: DefaultClock) {
    let caller = UserId::new();
    let now = Utc::now();
    let input = NewTask {
        assignee: Some(caller),
        due_date: Some(now + Duration::days(3)),
        tags: "backend, urgent".to_owned(),
        ..NewTask::titled("Fix login")
    };
    let subject = Task::create(input, UserId::new(), &clock).expect("valid");

    let matching = TaskFilter {
        assignee: Some(AssigneeFilter::Me),
        search: Some("BACKEND".to_owned()),
        due: Some(DueFilter::Week),
        ..TaskFilter::default()
    };
    let overdue = TaskFilter {
        due: Some(DueFilter::Overdue),
        ..TaskFilter::default()
    };

    assert!(matching.matches(&subject, caller, now));
    assert!(!matching.matches(&subject, UserId::new(), now));
    assert!(!overdue.matches(&subject, caller, now));
}

#[rstest]
#[case("3", 300)]
#[case("0.5", 50)]
#[case("12.75", 1275)]
#[case("999.99", 99_999)]
fn hours_parse_decimal_text(#[case] raw: &str, #[case] hundredths: u32) {
    assert_eq!(Hours::parse(raw).map(Hours::hundredths), Ok(hundredths));
}

#[rstest]
#[case("1.234")]
#[case("-1")]
#[case("1e2")]
#[case("1000")]
#[case(".")]
fn hours_reject_malformed_text(#[case] raw: &str) {
    assert!(Hours::parse(raw).is_err());
}

#[rstest]
fn hours_render_with_two_decimals() {
    let amount = Hours::from_hundredths(1205).expect("in range");
    assert_eq!(amount.to_string(), "12.05");
    assert_eq!(Hours::checked_sum([amount, amount]).map(Hours::hundredths), Some(2410));
    assert_eq!(
        Hours::checked_sum([Hours::from_hundredths(99_999).expect("in range"), amount]),
        None
    );
}

#[rstest]
fn time_logs_need_at_least_a_tenth_of_an_hour(clock: DefaultClock) {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
    let tiny = Hours::from_hundredths(5).expect("in range");
    let result = TaskTimeLog::new(
        task(&clock).id(),
        UserId::new(),
        String::new(),
        tiny,
        date,
        &clock,
    );
    assert!(matches!(result, Err(TaskDomainError::Field(err)) if err.field == "hours"));
}
