//! Domain tests for projects, topics and their content.

use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::project::domain::{
    DEFAULT_TAG_COLOR, DEFAULT_TOPIC_COLOR, MediaType, NewProject, NewTopicMedia, Project,
    ProjectChanges, ProjectDomainError, ProjectId, ProjectLink, ProjectStatus, Topic,
    TopicComment, TopicId, TopicMedia, TopicTag,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn topic(clock: &DefaultClock) -> Topic {
    Topic::create(
        ProjectId::new(),
        "Research".to_owned(),
        String::new(),
        None,
        UserId::new(),
        clock,
    )
    .expect("valid topic")
}

#[rstest]
fn new_projects_default_to_planning_and_medium(clock: DefaultClock) {
    let project =
        Project::create(NewProject::titled("  Roadmap  "), UserId::new(), &clock).expect("valid");
    assert_eq!(project.title(), "Roadmap");
    assert_eq!(project.status(), ProjectStatus::Planning);
    assert_eq!(project.priority().as_str(), "medium");
    assert_eq!(project.progress(), 0);
}

#[rstest]
#[case(-1)]
#[case(101)]
fn progress_outside_percentage_range_is_rejected(clock: DefaultClock, #[case] progress: i64) {
    let input = NewProject {
        progress,
        ..NewProject::titled("Roadmap")
    };
    let result = Project::create(input, UserId::new(), &clock);
    assert!(matches!(result, Err(ProjectDomainError::Field(err)) if err.field == "progress"));
}

#[rstest]
fn invalid_changes_leave_the_project_untouched(clock: DefaultClock) {
    let mut project =
        Project::create(NewProject::titled("Roadmap"), UserId::new(), &clock).expect("valid");
    let before = project.clone();
    let result = project.apply(
        ProjectChanges {
            status: Some(ProjectStatus::Completed),
            title: Some("   ".to_owned()),
            ..ProjectChanges::default()
        },
        &clock,
    );
    assert!(result.is_err());
    assert_eq!(project, before);
}

#[rstest]
fn due_date_can_be_cleared(clock: DefaultClock) {
    let mut project = Project::create(
        NewProject {
            due_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 1),
            ..NewProject::titled("Roadmap")
        },
        UserId::new(),
        &clock,
    )
    .expect("valid");
    project
        .apply(
            ProjectChanges {
                due_date: Some(None),
                ..ProjectChanges::default()
            },
            &clock,
        )
        .expect("valid change");
    assert_eq!(project.due_date(), None);
}

#[rstest]
#[case("ftp://example.com")]
#[case("https://")]
#[case("https://exa mple.com")]
fn links_require_web_urls(clock: DefaultClock, #[case] url: &str) {
    let result = ProjectLink::new(
        ProjectId::new(),
        "Docs".to_owned(),
        url.to_owned(),
        String::new(),
        UserId::new(),
        &clock,
    );
    assert!(matches!(result, Err(ProjectDomainError::Field(err)) if err.field == "url"));
}

#[rstest]
fn topics_and_tags_use_default_colours(clock: DefaultClock) {
    let topic = topic(&clock);
    assert_eq!(topic.color().as_str(), DEFAULT_TOPIC_COLOR);
    let tag = TopicTag::new(topic.id(), "ux".to_owned(), None, &clock).expect("valid tag");
    assert_eq!(tag.color.as_str(), DEFAULT_TAG_COLOR);
}

#[rstest]
fn malformed_colours_are_rejected(clock: DefaultClock) {
    let result = Topic::create(
        ProjectId::new(),
        "Research".to_owned(),
        String::new(),
        Some("blue"),
        UserId::new(),
        &clock,
    );
    assert!(matches!(result, Err(ProjectDomainError::Field(err)) if err.field == "color"));
}

#[rstest]
#[case("image/png", MediaType::Image)]
#[case("video/mp4", MediaType::Video)]
#[case("audio/mpeg", MediaType::Audio)]
#[case("application/pdf", MediaType::Document)]
#[case("text/plain; charset=utf-8", MediaType::Document)]
#[case("application/msword", MediaType::Document)]
#[case("application/zip", MediaType::Other)]
fn media_type_follows_content_type(#[case] content_type: &str, #[case] expected: MediaType) {
    assert_eq!(MediaType::from_content_type(content_type), expected);
}

#[rstest]
fn media_title_falls_back_to_file_name(clock: DefaultClock) {
    let file = StoredFile {
        file_name: "diagram.png".to_owned(),
        content_type: "image/png".to_owned(),
        size: 3,
        storage_key: "topic_media/key".to_owned(),
        sha256: String::new(),
    };
    let media = TopicMedia::new(
        TopicId::new(),
        NewTopicMedia::default(),
        file,
        UserId::new(),
        &clock,
    )
    .expect("valid media");
    assert_eq!(media.title, "diagram.png");
    assert_eq!(media.media_type, MediaType::Image);
}

#[rstest]
fn replies_must_stay_within_their_topic(clock: DefaultClock) {
    let author = UserId::new();
    let parent =
        TopicComment::new(TopicId::new(), author, "first".to_owned(), None, &clock).expect("valid");
    let other_topic = TopicId::new();

    let result = TopicComment::new(other_topic, author, "reply".to_owned(), Some(&parent), &clock);

    assert_eq!(
        result,
        Err(ProjectDomainError::ForeignParentComment {
            parent: parent.id,
            topic: other_topic,
        })
    );
}
