//! Project and topic orchestration services.

mod access;
mod projects;
mod topics;

pub use access::{ProjectGrant, project_role, resolve_project_grant};
pub use projects::{ProjectService, ProjectServiceError, ProjectServiceResult, ProjectStats};
pub use topics::{
    CommentThread, TopicDetail, TopicOverview, TopicPath, TopicService, TopicServiceError,
    TopicServiceResult,
};
