//! Template rendering and ownership tests.

use super::support::Harness;
use crate::access::AccessError;
use crate::account::domain::UserId;
use crate::task::{
    domain::{NewTemplate, TaskPriority, TaskTemplate, TemplateChanges, TemplateVars},
    services::{TaskServiceError, TemplateTarget},
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn standup(is_public: bool) -> NewTemplate {
    NewTemplate {
        name: "Standup".to_owned(),
        title_template: "Standup for {{ project }} on {{ today }}".to_owned(),
        description_template: "Run by {{ user }}".to_owned(),
        priority: TaskPriority::High,
        tags: "ritual".to_owned(),
        is_public,
        ..NewTemplate::default()
    }
}

#[rstest]
fn templates_render_every_variable() {
    let template =
        TaskTemplate::new(standup(false), UserId::new(), &DefaultClock).expect("valid template");
    let vars = TemplateVars {
        project: "Apollo".to_owned(),
        idea: String::new(),
        user: "Ada Lovelace".to_owned(),
        today: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
    };

    let input = template.instantiate(&vars).expect("renders");

    assert_eq!(input.title, "Standup for Apollo on 2026-03-02");
    assert_eq!(input.description, "Run by Ada Lovelace");
    assert_eq!(input.priority, TaskPriority::High);
    assert_eq!(input.tags, "ritual");
}

#[rstest]
fn malformed_sources_are_rejected() {
    let input = NewTemplate {
        title_template: "{{ project ".to_owned(),
        ..standup(false)
    };
    let result = TaskTemplate::new(input, UserId::new(), &DefaultClock);
    assert!(matches!(
        result,
        Err(crate::task::domain::TaskDomainError::Field(err)) if err.field == "title_template"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_created_from_templates_in_context(harness: Harness) {
    let project = harness.project("Apollo").await;
    let template = harness
        .tasks
        .create_template(harness.owner, standup(false))
        .await
        .expect("created");

    let grant = harness
        .tasks
        .create_from_template(
            harness.owner,
            "Ada Lovelace",
            template.id,
            TemplateTarget {
                project: Some(project),
                ..TemplateTarget::default()
            },
        )
        .await
        .expect("instantiated");

    assert!(grant.task.title().starts_with("Standup for Apollo on "));
    assert_eq!(grant.task.description(), "Run by Ada Lovelace");
    assert_eq!(grant.task.project(), Some(project));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn private_templates_are_hidden_and_public_ones_read_only(harness: Harness) {
    let private = harness
        .tasks
        .create_template(harness.owner, standup(false))
        .await
        .expect("created");
    let public = harness
        .tasks
        .create_template(harness.owner, standup(true))
        .await
        .expect("created");
    let other = UserId::new();

    let hidden = harness.tasks.template(other, private.id).await;
    let listed = harness.tasks.templates(other).await.expect("listed");
    let changed = harness
        .tasks
        .update_template(
            other,
            public.id,
            TemplateChanges {
                name: Some("Mine now".to_owned()),
                ..TemplateChanges::default()
            },
        )
        .await;

    assert!(matches!(
        hidden,
        Err(TaskServiceError::Access(AccessError::NotVisible))
    ));
    assert_eq!(listed, [public]);
    assert!(matches!(changed, Err(TaskServiceError::NotCreator)));
}
