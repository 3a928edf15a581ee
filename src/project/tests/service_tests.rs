//! Service tests for project access, membership, files and the activity log.

use std::sync::Arc;

use super::support::{Harness, summary, upload};
use crate::access::{AccessError, AccessRole, Action, MemberRole};
use crate::account::domain::UserId;
use crate::blob::adapters::memory::InMemoryBlobStore;
use crate::project::{
    domain::{NewProject, ProjectChanges, ProjectId, ProjectStatus},
    ports::{MockProjectRepository, ProjectRepositoryError},
    services::{ProjectService, ProjectServiceError},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_owns_the_project_and_the_creation_is_logged(harness: Harness) {
    let grant = harness
        .projects
        .create(harness.owner, NewProject::titled("Launch"))
        .await
        .expect("created");

    assert_eq!(grant.role, AccessRole::Owner);
    assert!(grant.permissions().can_delete);
    let log = harness
        .projects
        .activities(harness.owner, grant.project.id())
        .await
        .expect("log is visible");
    assert_eq!(log.len(), 1);
    assert_eq!(log.first().map(|entry| entry.action.as_str()), Some("Created project"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_are_told_the_project_does_not_exist(harness: Harness) {
    let project = harness.project("Launch").await;

    let result = harness.projects.get(UserId::new(), project).await;
    let missing = harness.projects.get(harness.owner, ProjectId::new()).await;

    assert!(matches!(
        result,
        Err(ProjectServiceError::Access(AccessError::NotVisible))
    ));
    assert!(matches!(
        missing,
        Err(ProjectServiceError::Access(AccessError::NotVisible))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_may_read_but_not_edit(harness: Harness) {
    let project = harness.project("Launch").await;
    let viewer = harness.member(project, MemberRole::Viewer).await;

    let grant = harness.projects.get(viewer, project).await.expect("visible");
    let result = harness
        .projects
        .update(
            viewer,
            project,
            ProjectChanges {
                status: Some(ProjectStatus::InProgress),
                ..ProjectChanges::default()
            },
        )
        .await;

    assert_eq!(grant.role, AccessRole::Viewer);
    assert!(!grant.permissions().can_edit);
    assert!(matches!(
        result,
        Err(ProjectServiceError::Access(AccessError::Forbidden {
            action: Action::Edit,
            required: AccessRole::Editor,
        }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_owner_manages_members(harness: Harness) {
    let project = harness.project("Launch").await;
    let editor = harness.member(project, MemberRole::Editor).await;

    let result = harness
        .projects
        .add_member(
            editor,
            project,
            &summary(UserId::new(), "new@example.com"),
            MemberRole::Viewer,
        )
        .await;

    assert!(matches!(
        result,
        Err(ProjectServiceError::Access(AccessError::Forbidden {
            action: Action::ManageMembers,
            ..
        }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn owners_and_existing_members_cannot_be_added_again(harness: Harness) {
    let project = harness.project("Launch").await;
    let member = harness.member(project, MemberRole::Viewer).await;

    let owner_again = harness
        .projects
        .add_member(
            harness.owner,
            project,
            &summary(harness.owner, "owner@example.com"),
            MemberRole::Editor,
        )
        .await;
    let member_again = harness
        .projects
        .add_member(
            harness.owner,
            project,
            &summary(member, "member@example.com"),
            MemberRole::Editor,
        )
        .await;

    assert!(matches!(
        owner_again,
        Err(ProjectServiceError::Validation(err)) if err.field == "email"
    ));
    assert!(matches!(
        member_again,
        Err(ProjectServiceError::Validation(err)) if err.field == "email"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn role_changes_take_effect_and_are_logged(harness: Harness) {
    let project = harness.project("Launch").await;
    let member = harness.member(project, MemberRole::Viewer).await;
    let membership = harness
        .projects
        .members(harness.owner, project)
        .await
        .expect("members")
        .into_iter()
        .find(|row| row.user_id == member)
        .expect("membership exists");

    harness
        .projects
        .change_member_role(harness.owner, project, membership.id, MemberRole::Editor)
        .await
        .expect("role changes");

    let grant = harness.projects.get(member, project).await.expect("visible");
    assert_eq!(grant.role, AccessRole::Editor);
    let log = harness
        .projects
        .activities(harness.owner, project)
        .await
        .expect("log");
    assert_eq!(
        log.first().map(|entry| entry.description.as_str()),
        Some("Changed role from viewer to editor")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_includes_owned_and_joined_projects_once(harness: Harness) {
    let first = harness.project("First").await;
    let second = harness.project("Second").await;
    let member = harness.member(first, MemberRole::Contributor).await;
    harness.project("Hidden").await;

    let owned = harness.projects.list(harness.owner).await.expect("list");
    let joined = harness.projects.list(member).await.expect("list");

    assert_eq!(owned.len(), 3);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined.first().map(|grant| grant.project.id()), Some(first));
    assert_eq!(joined.first().map(|grant| grant.role), Some(AccessRole::Contributor));
    assert_ne!(first, second);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_count_accessible_projects_by_status(harness: Harness) {
    let active = harness.project("Active").await;
    harness.project("Planned").await;
    harness
        .projects
        .update(
            harness.owner,
            active,
            ProjectChanges {
                status: Some(ProjectStatus::InProgress),
                ..ProjectChanges::default()
            },
        )
        .await
        .expect("updated");

    let stats = harness.projects.stats(harness.owner).await.expect("stats");

    assert_eq!(stats.total_projects, 2);
    assert_eq!(stats.active_projects, 1);
    assert_eq!(stats.planning_projects, 1);
    assert_eq!(stats.completed_projects, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn contributors_upload_files_but_only_editors_delete_them(harness: Harness) {
    let project = harness.project("Launch").await;
    let contributor = harness.member(project, MemberRole::Contributor).await;

    let file = harness
        .projects
        .upload_file(
            contributor,
            project,
            "",
            String::new(),
            upload("plan.txt", "text/plain", b"step one"),
        )
        .await
        .expect("uploaded");
    let (_, bytes) = harness
        .projects
        .download_file(harness.owner, project, file.id)
        .await
        .expect("downloaded");
    let denied = harness
        .projects
        .delete_file(contributor, project, file.id)
        .await;

    assert_eq!(file.title, "plan.txt");
    assert_eq!(file.file.size, 8);
    assert_eq!(bytes, b"step one");
    assert!(matches!(
        denied,
        Err(ProjectServiceError::Access(AccessError::Forbidden { .. }))
    ));

    harness
        .projects
        .delete_file(harness.owner, project, file.id)
        .await
        .expect("owner deletes");
    assert!(harness.blobs.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_releases_its_content(harness: Harness) {
    let project = harness.project("Launch").await;
    let editor = harness.member(project, MemberRole::Editor).await;
    harness
        .projects
        .upload_file(
            harness.owner,
            project,
            "Brief",
            String::new(),
            upload("brief.pdf", "application/pdf", b"%PDF"),
        )
        .await
        .expect("uploaded");

    let denied = harness.projects.delete(editor, project).await;
    harness
        .projects
        .delete(harness.owner, project)
        .await
        .expect("owner deletes");

    assert!(matches!(
        denied,
        Err(ProjectServiceError::Access(AccessError::Forbidden {
            action: Action::Delete,
            required: AccessRole::Owner,
        }))
    ));
    assert!(harness.blobs.is_empty());
    assert!(matches!(
        harness.projects.get(harness.owner, project).await,
        Err(ProjectServiceError::Access(AccessError::NotVisible))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn links_of_other_projects_are_not_found(harness: Harness) {
    let first = harness.project("First").await;
    let second = harness.project("Second").await;
    let link = harness
        .projects
        .create_link(
            harness.owner,
            first,
            "Docs".to_owned(),
            "https://docs.example.com".to_owned(),
            String::new(),
        )
        .await
        .expect("created");

    let result = harness.projects.link(harness.owner, second, link.id).await;

    assert!(matches!(result, Err(ProjectServiceError::NotFound("link"))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repository_failures_surface_as_repository_errors() {
    let mut repository = MockProjectRepository::new();
    repository.expect_find_by_id().returning(|_| {
        Err(ProjectRepositoryError::persistence(std::io::Error::other(
            "connection reset",
        )))
    });
    let service = ProjectService::new(
        Arc::new(repository),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(DefaultClock),
    );

    let result = service.get(UserId::new(), ProjectId::new()).await;

    assert!(matches!(
        result,
        Err(ProjectServiceError::Repository(
            ProjectRepositoryError::Persistence(_)
        ))
    ));
}
