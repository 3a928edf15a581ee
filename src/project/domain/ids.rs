//! Identifier types for the project domain.

use crate::shared::uuid_id;

uuid_id! {
    /// Unique identifier for a project.
    ProjectId
}

uuid_id! {
    /// Unique identifier for a project membership row.
    MembershipId
}

uuid_id! {
    /// Unique identifier for an uploaded project file.
    ProjectFileId
}

uuid_id! {
    /// Unique identifier for a project link.
    ProjectLinkId
}

uuid_id! {
    /// Unique identifier for an activity log entry.
    ActivityId
}

uuid_id! {
    /// Unique identifier for a knowledge topic.
    TopicId
}

uuid_id! {
    /// Unique identifier for a topic note.
    TopicNoteId
}

uuid_id! {
    /// Unique identifier for a topic link.
    TopicLinkId
}

uuid_id! {
    /// Unique identifier for a topic media item.
    TopicMediaId
}

uuid_id! {
    /// Unique identifier for a topic tag.
    TopicTagId
}

uuid_id! {
    /// Unique identifier for a topic comment.
    TopicCommentId
}
