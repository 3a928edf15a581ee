//! Conversion tests between idea domain values and diesel rows.

use super::super::models::IdeaMembershipRow;
use super::super::repository::{
    idea_to_row, resource_to_row, row_to_idea, row_to_membership, row_to_resource,
};
use crate::account::domain::UserId;
use crate::idea::domain::{
    Idea, IdeaBrief, IdeaPriority, IdeaResource, IdeaStatus, NewIdea, ResourceType,
};
use crate::project::domain::ProjectId;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn idea() -> Idea {
    let mut idea = Idea::create(
        NewIdea {
            brief: IdeaBrief {
                problem_statement: "Too many tabs".to_owned(),
                estimated_effort: "2 weeks".to_owned(),
                ..IdeaBrief::default()
            },
            priority: IdeaPriority::Critical,
            status: IdeaStatus::Concept,
            tags: "browser, focus".to_owned(),
            ..NewIdea::described("Tab tamer", "Groups tabs automatically")
        },
        UserId::new(),
        &DefaultClock,
    )
    .expect("valid idea");
    idea.link_projects(vec![ProjectId::new(), ProjectId::new()], &DefaultClock);
    idea
}

#[rstest]
fn idea_row_round_trip_preserves_fields_and_links(idea: Idea) {
    let links = idea.project_ids().to_vec();
    let restored = row_to_idea(idea_to_row(&idea), links).expect("row converts back");
    assert_eq!(restored, idea);
    assert_eq!(idea_to_row(&idea).tags, "browser, focus");
}

#[rstest]
fn unknown_priority_is_rejected(idea: Idea) {
    let mut row = idea_to_row(&idea);
    row.priority = "urgent".to_owned();
    assert!(row_to_idea(row, Vec::new()).is_err());
}

#[rstest]
fn owner_role_cannot_be_loaded_for_a_collaborator(idea: Idea) {
    let row = IdeaMembershipRow {
        id: uuid::Uuid::new_v4(),
        idea_id: idea.id().into_inner(),
        user_id: uuid::Uuid::new_v4(),
        role: "owner".to_owned(),
        added_by: idea.owner().into_inner(),
        created_at: idea.created_at(),
    };
    assert!(row_to_membership(row).is_err());
}

#[rstest]
fn resource_row_keeps_its_kind(idea: Idea) {
    let resource = IdeaResource::new(
        idea.id(),
        "Rival".to_owned(),
        "https://rival.example.com".to_owned(),
        String::new(),
        ResourceType::Competitor,
        idea.owner(),
        &DefaultClock,
    )
    .expect("valid resource");
    let row = resource_to_row(&resource);
    assert_eq!(row.resource_type, "competitor");
    assert_eq!(row_to_resource(row).expect("converts"), resource);
}
