//! Shared fixtures for project and topic service tests.

use std::sync::Arc;

use crate::access::MemberRole;
use crate::account::domain::{UserId, UserSummary};
use crate::blob::{Upload, adapters::memory::InMemoryBlobStore};
use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{NewProject, ProjectId},
    services::{ProjectService, TopicService},
};
use mockable::DefaultClock;

pub type Projects = ProjectService<InMemoryProjectRepository, InMemoryBlobStore, DefaultClock>;
pub type Topics = TopicService<
    InMemoryProjectRepository,
    InMemoryProjectRepository,
    InMemoryBlobStore,
    DefaultClock,
>;

/// Services wired over one shared in-memory store.
pub struct Harness {
    pub blobs: Arc<InMemoryBlobStore>,
    pub projects: Projects,
    pub topics: Topics,
    pub owner: UserId,
}

impl Harness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryProjectRepository::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            projects: ProjectService::new(
                Arc::clone(&repository),
                Arc::clone(&blobs),
                Arc::clone(&clock),
            ),
            topics: TopicService::new(
                Arc::clone(&repository),
                repository,
                Arc::clone(&blobs),
                clock,
            ),
            blobs,
            owner: UserId::new(),
        }
    }

    pub async fn project(&self, title: &str) -> ProjectId {
        self.projects
            .create(self.owner, NewProject::titled(title))
            .await
            .expect("project is created")
            .project
            .id()
    }

    /// Adds a fresh user with `role` and returns their identifier.
    pub async fn member(&self, project: ProjectId, role: MemberRole) -> UserId {
        let user = UserId::new();
        self.projects
            .add_member(self.owner, project, &summary(user, "member@example.com"), role)
            .await
            .expect("member is added");
        user
    }
}

pub fn summary(id: UserId, email: &str) -> UserSummary {
    UserSummary {
        id,
        email: email.to_owned(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
    }
}

pub fn upload(file_name: &str, content_type: &str, bytes: &[u8]) -> Upload {
    Upload {
        file_name: file_name.to_owned(),
        content_type: Some(content_type.to_owned()),
        bytes: bytes.to_vec(),
    }
}
