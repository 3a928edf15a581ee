//! Validation and filtering rules of the idea aggregate.

use crate::account::domain::UserId;
use crate::idea::domain::{
    Idea, IdeaBrief, IdeaChanges, IdeaDomainError, IdeaFilter, IdeaPriority, IdeaStatus, NewIdea,
    ResourceType,
};
use crate::project::domain::ProjectId;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn idea() -> Idea {
    Idea::create(
        NewIdea {
            brief: IdeaBrief {
                problem_statement: "Meetings run long".to_owned(),
                ..IdeaBrief::default()
            },
            tags: "Meetings, timer, meetings".to_owned(),
            ..NewIdea::described("Standup timer", "Keeps standups short")
        },
        UserId::new(),
        &DefaultClock,
    )
    .expect("valid idea")
}

#[rstest]
fn new_ideas_are_medium_priority_drafts(idea: Idea) {
    assert_eq!(idea.status(), IdeaStatus::Draft);
    assert_eq!(idea.priority(), IdeaPriority::Medium);
    assert_eq!(ResourceType::default(), ResourceType::Reference);
    assert_eq!(idea.tags().items(), ["Meetings", "timer"]);
}

#[rstest]
#[case("", "Has a description", "title")]
#[case("Has a title", "   ", "description")]
fn title_and_description_are_required(
    #[case] title: &str,
    #[case] description: &str,
    #[case] field: &str,
) {
    let result = Idea::create(
        NewIdea::described(title, description),
        UserId::new(),
        &DefaultClock,
    );
    assert!(matches!(result, Err(IdeaDomainError::Field(err)) if err.field == field));
}

#[rstest]
fn oversized_effort_estimate_leaves_the_idea_unchanged(mut idea: Idea) {
    let before = idea.clone();
    let result = idea.apply(
        IdeaChanges {
            title: Some("Renamed".to_owned()),
            estimated_effort: Some("x".repeat(101)),
            ..IdeaChanges::default()
        },
        &DefaultClock,
    );

    assert!(matches!(result, Err(IdeaDomainError::Field(err)) if err.field == "estimated_effort"));
    assert_eq!(idea, before);
}

#[rstest]
fn partial_update_keeps_untouched_brief_fields(mut idea: Idea) {
    idea.apply(
        IdeaChanges {
            revenue_model: Some("Subscriptions".to_owned()),
            status: Some(IdeaStatus::Concept),
            ..IdeaChanges::default()
        },
        &DefaultClock,
    )
    .expect("valid change");

    assert_eq!(idea.brief().revenue_model, "Subscriptions");
    assert_eq!(idea.brief().problem_statement, "Meetings run long");
    assert_eq!(idea.status(), IdeaStatus::Concept);
}

#[rstest]
fn project_links_are_deduplicated_and_removable(mut idea: Idea) {
    let project = ProjectId::new();
    idea.link_projects(vec![project, project], &DefaultClock);

    assert_eq!(idea.project_ids(), [project]);
    assert!(idea.unlink_project(project));
    assert!(!idea.unlink_project(project));
}

#[rstest]
#[case(IdeaFilter { search: Some("STANDUP".to_owned()), ..IdeaFilter::default() }, true)]
#[case(IdeaFilter { search: Some("run long".to_owned()), ..IdeaFilter::default() }, true)]
#[case(IdeaFilter { search: Some("timer".to_owned()), ..IdeaFilter::default() }, true)]
#[case(IdeaFilter { search: Some("payroll".to_owned()), ..IdeaFilter::default() }, false)]
#[case(IdeaFilter { status: Some(IdeaStatus::Implemented), ..IdeaFilter::default() }, false)]
#[case(IdeaFilter { priority: Some(IdeaPriority::Medium), ..IdeaFilter::default() }, true)]
#[case(IdeaFilter { project: Some(ProjectId::new()), ..IdeaFilter::default() }, false)]
#[case(IdeaFilter { search: Some("  ".to_owned()), ..IdeaFilter::default() }, true)]
fn filter_matches_status_priority_project_and_text(
    idea: Idea,
    #[case] filter: IdeaFilter,
    #[case] expected: bool,
) {
    assert_eq!(filter.matches(&idea), expected);
}
