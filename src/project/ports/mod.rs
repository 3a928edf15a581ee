//! Port contracts for project and topic persistence.

mod projects;
mod topics;

pub use projects::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult};
pub use topics::{TopicRepository, TopicRepositoryError, TopicRepositoryResult};

#[cfg(test)]
pub use projects::MockProjectRepository;
