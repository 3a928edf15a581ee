//! Service tests for topics, their content and threaded comments.

use super::support::{Harness, upload};
use crate::access::{AccessError, MemberRole};
use crate::project::{
    domain::{LinkType, NewTopicMedia, ProjectDomainError, TopicChanges},
    services::{TopicPath, TopicServiceError},
};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

async fn topic_path(harness: &Harness, title: &str) -> TopicPath {
    let project = harness.project("Knowledge").await;
    let topic = harness
        .topics
        .create(harness.owner, project, title.to_owned(), String::new(), None)
        .await
        .expect("topic is created");
    TopicPath {
        project,
        topic: topic.id(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn topic_titles_are_unique_per_project(harness: Harness) {
    let at = topic_path(&harness, "Research").await;

    let duplicate = harness
        .topics
        .create(
            harness.owner,
            at.project,
            "Research".to_owned(),
            String::new(),
            None,
        )
        .await;
    let elsewhere = harness.project("Other").await;
    let allowed = harness
        .topics
        .create(harness.owner, elsewhere, "Research".to_owned(), String::new(), None)
        .await;

    assert!(matches!(duplicate, Err(TopicServiceError::Validation(err)) if err.field == "title"));
    assert!(allowed.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_read_and_comment_but_cannot_add_notes(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    let viewer = harness.member(at.project, MemberRole::Viewer).await;

    let note = harness
        .topics
        .create_note(viewer, at, "Idea".to_owned(), "text".to_owned())
        .await;
    let comment = harness
        .topics
        .create_comment(viewer, at, "Looks good".to_owned(), None)
        .await;
    let listing = harness.topics.list(viewer, at.project).await.expect("listing");

    assert!(matches!(
        note,
        Err(TopicServiceError::Access(AccessError::Forbidden { .. }))
    ));
    assert!(comment.is_ok());
    assert_eq!(listing.first().map(|entry| entry.counts.comments), Some(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn note_edits_record_the_last_editor(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    let editor = harness.member(at.project, MemberRole::Editor).await;
    let note = harness
        .topics
        .create_note(harness.owner, at, "Draft".to_owned(), "v1".to_owned())
        .await
        .expect("note");

    let edited = harness
        .topics
        .update_note(editor, at, note.id, None, Some("v2".to_owned()))
        .await
        .expect("edited");

    assert_eq!(edited.content, "v2");
    assert_eq!(edited.title, "Draft");
    assert_eq!(edited.last_edited_by, Some(editor));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replies_nest_under_their_parent(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    let root = harness
        .topics
        .create_comment(harness.owner, at, "Question".to_owned(), None)
        .await
        .expect("root");
    harness
        .topics
        .create_comment(harness.owner, at, "Answer".to_owned(), Some(root.id))
        .await
        .expect("reply");

    let threads = harness.topics.comments(harness.owner, at).await.expect("threads");

    assert_eq!(threads.len(), 1);
    let first = threads.first().expect("one thread");
    assert_eq!(first.comment.id, root.id);
    assert_eq!(
        first.replies.first().map(|reply| reply.comment.content.as_str()),
        Some("Answer")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replies_to_comments_of_other_topics_are_rejected(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    let other = harness
        .topics
        .create(harness.owner, at.project, "Other".to_owned(), String::new(), None)
        .await
        .expect("topic");
    let foreign = harness
        .topics
        .create_comment(
            harness.owner,
            TopicPath {
                project: at.project,
                topic: other.id(),
            },
            "Elsewhere".to_owned(),
            None,
        )
        .await
        .expect("comment");

    let result = harness
        .topics
        .create_comment(harness.owner, at, "Reply".to_owned(), Some(foreign.id))
        .await;

    assert!(matches!(
        result,
        Err(TopicServiceError::Domain(
            ProjectDomainError::ForeignParentComment { .. }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_authors_edit_comments_but_editors_may_delete_them(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    let viewer = harness.member(at.project, MemberRole::Viewer).await;
    let comment = harness
        .topics
        .create_comment(viewer, at, "Mine".to_owned(), None)
        .await
        .expect("comment");

    let edit = harness
        .topics
        .update_comment(harness.owner, at, comment.id, "Theirs".to_owned())
        .await;
    harness
        .topics
        .delete_comment(harness.owner, at, comment.id)
        .await
        .expect("owner deletes");

    assert!(matches!(edit, Err(TopicServiceError::NotAuthor)));
    assert!(
        harness
            .topics
            .comments(harness.owner, at)
            .await
            .expect("threads")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tags_are_sorted_and_unique(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    for name in ["ux", "backend"] {
        harness
            .topics
            .create_tag(harness.owner, at, name.to_owned(), None)
            .await
            .expect("tag");
    }

    let duplicate = harness
        .topics
        .create_tag(harness.owner, at, "ux".to_owned(), Some("#000000"))
        .await;
    let names: Vec<String> = harness
        .topics
        .tags(harness.owner, at)
        .await
        .expect("tags")
        .into_iter()
        .map(|tag| tag.name)
        .collect();

    assert!(matches!(duplicate, Err(TopicServiceError::Validation(err)) if err.field == "name"));
    assert_eq!(names, ["backend", "ux"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_topic_removes_its_media(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    let media = harness
        .topics
        .upload_media(
            harness.owner,
            at,
            NewTopicMedia::default(),
            upload("sketch.png", "image/png", b"\x89PNG"),
        )
        .await
        .expect("media");
    harness
        .topics
        .create_link(
            harness.owner,
            at,
            "Figma".to_owned(),
            "https://figma.com/file/1".to_owned(),
            String::new(),
            LinkType::Tool,
        )
        .await
        .expect("link");

    harness.topics.delete(harness.owner, at).await.expect("deleted");

    assert_eq!(media.file.size, 4);
    assert!(harness.blobs.is_empty());
    assert!(matches!(
        harness.topics.detail(harness.owner, at).await,
        Err(TopicServiceError::NotFound("topic"))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn topic_detail_gathers_all_content(harness: Harness) {
    let at = topic_path(&harness, "Research").await;
    harness
        .topics
        .update(
            harness.owner,
            at,
            TopicChanges {
                color: Some("#10b981".to_owned()),
                ..TopicChanges::default()
            },
        )
        .await
        .expect("updated");
    harness
        .topics
        .create_note(harness.owner, at, "Summary".to_owned(), String::new())
        .await
        .expect("note");

    let detail = harness.topics.detail(harness.owner, at).await.expect("detail");

    assert_eq!(detail.topic.color().as_str(), "#10B981");
    assert_eq!(detail.notes.len(), 1);
    assert!(detail.grant.permissions().can_manage_members);
}
