//! Domain model for projects and topics.

mod error;
mod ids;
mod membership;
mod project;
mod resources;
mod topic;

pub use error::ProjectDomainError;
pub use ids::{
    ActivityId, MembershipId, ProjectFileId, ProjectId, ProjectLinkId, TopicCommentId, TopicId,
    TopicLinkId, TopicMediaId, TopicNoteId, TopicTagId,
};
pub use membership::ProjectMembership;
pub use project::{
    NewProject, PersistedProjectData, Project, ProjectChanges, ProjectPriority, ProjectStatus,
};
pub use resources::{LinkChanges, ProjectActivity, ProjectFile, ProjectLink};
pub use topic::{
    DEFAULT_TAG_COLOR, DEFAULT_TOPIC_COLOR, LinkType, MediaType, NewTopicMedia,
    PersistedTopicData, Topic, TopicChanges, TopicComment, TopicCounts, TopicLink,
    TopicLinkChanges, TopicMedia, TopicNote, TopicTag,
};
