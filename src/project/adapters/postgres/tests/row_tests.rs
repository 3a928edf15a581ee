//! Round-trip and corruption tests for project and topic row conversion.

use super::super::repository::{
    file_to_row, project_to_row, row_to_file, row_to_membership, row_to_project,
};
use super::super::topics::{media_to_row, row_to_media, row_to_topic, topic_to_row};
use super::super::models::MembershipRow;
use crate::account::domain::UserId;
use crate::blob::{StoredFile, Upload};
use crate::project::domain::{
    MediaType, NewProject, NewTopicMedia, Project, ProjectFile, ProjectStatus, Topic, TopicMedia,
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn project() -> Project {
    Project::create(
        NewProject {
            status: ProjectStatus::OnHold,
            due_date: NaiveDate::from_ymd_opt(2026, 12, 24),
            progress: 40,
            ..NewProject::titled("Launch")
        },
        UserId::new(),
        &DefaultClock,
    )
    .expect("valid project")
}

fn stored(file_name: &str, content_type: &str) -> StoredFile {
    let upload = Upload {
        file_name: file_name.to_owned(),
        content_type: Some(content_type.to_owned()),
        bytes: b"content".to_vec(),
    };
    StoredFile::describe(&upload, format!("test/{file_name}"))
}

#[rstest]
fn project_row_round_trip_preserves_fields(project: Project) {
    let restored = row_to_project(project_to_row(&project)).expect("row converts back");
    assert_eq!(restored, project);
}

#[rstest]
fn unknown_status_is_reported_as_persistence_error(project: Project) {
    let mut row = project_to_row(&project);
    row.status = "archived".to_owned();
    assert!(row_to_project(row).is_err());
}

#[rstest]
fn out_of_range_progress_is_rejected(project: Project) {
    let mut row = project_to_row(&project);
    row.progress = -1;
    assert!(row_to_project(row).is_err());
}

#[rstest]
fn owner_role_cannot_be_loaded_from_a_membership_row(project: Project) {
    let row = MembershipRow {
        id: uuid::Uuid::new_v4(),
        project_id: project.id().into_inner(),
        user_id: uuid::Uuid::new_v4(),
        role: "owner".to_owned(),
        created_at: project.created_at(),
        updated_at: project.created_at(),
    };
    assert!(row_to_membership(row).is_err());
}

#[rstest]
fn file_row_keeps_stored_metadata(project: Project) {
    let file = ProjectFile::new(
        project.id(),
        "",
        String::new(),
        stored("brief.pdf", "application/pdf"),
        project.owner(),
        &DefaultClock,
    )
    .expect("valid file");
    let restored = row_to_file(file_to_row(&file)).expect("row converts back");
    assert_eq!(restored, file);
    assert_eq!(restored.title, "brief.pdf");
}

#[rstest]
fn topic_and_media_rows_round_trip(project: Project) {
    let topic = Topic::create(
        project.id(),
        "Research".to_owned(),
        String::new(),
        Some("#abcdef"),
        project.owner(),
        &DefaultClock,
    )
    .expect("valid topic");
    assert_eq!(row_to_topic(topic_to_row(&topic)).expect("topic"), topic);

    let media = TopicMedia::new(
        topic.id(),
        NewTopicMedia {
            duration_seconds: Some(95),
            ..NewTopicMedia::default()
        },
        stored("clip.mp4", "video/mp4"),
        project.owner(),
        &DefaultClock,
    )
    .expect("valid media");
    let restored = row_to_media(media_to_row(&media)).expect("media");
    assert_eq!(restored.media_type, MediaType::Video);
    assert_eq!(restored, media);
}
