//! Shared fixtures for task service tests.

use std::sync::Arc;

use crate::access::MemberRole;
use crate::account::domain::{UserId, UserSummary};
use crate::blob::adapters::memory::InMemoryBlobStore;
use crate::idea::{
    adapters::memory::InMemoryIdeaRepository,
    domain::{IdeaId, NewIdea},
    services::IdeaService,
};
use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{NewProject, ProjectId},
    services::ProjectService,
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, RelationChanges, TaskId},
    services::TaskService,
};
use mockable::DefaultClock;

pub type Tasks = TaskService<
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    InMemoryIdeaRepository,
    InMemoryBlobStore,
    DefaultClock,
>;
pub type Projects = ProjectService<InMemoryProjectRepository, InMemoryBlobStore, DefaultClock>;
pub type Ideas = IdeaService<InMemoryIdeaRepository, InMemoryProjectRepository, DefaultClock>;

/// Task, project and idea services over shared in-memory stores.
pub struct Harness {
    pub blobs: Arc<InMemoryBlobStore>,
    pub tasks: Tasks,
    pub projects: Projects,
    pub ideas: Ideas,
    pub owner: UserId,
}

impl Harness {
    pub fn new() -> Self {
        let projects = Arc::new(InMemoryProjectRepository::new());
        let ideas = Arc::new(InMemoryIdeaRepository::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            tasks: TaskService::new(
                Arc::new(InMemoryTaskRepository::new()),
                Arc::clone(&projects),
                Arc::clone(&ideas),
                Arc::clone(&blobs),
                Arc::clone(&clock),
            ),
            projects: ProjectService::new(
                Arc::clone(&projects),
                Arc::clone(&blobs),
                Arc::clone(&clock),
            ),
            ideas: IdeaService::new(ideas, projects, clock),
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

    pub async fn idea(&self, title: &str) -> IdeaId {
        self.ideas
            .create(self.owner, NewIdea::described(title, "A thought"), Vec::new())
            .await
            .expect("idea is created")
            .idea
            .id()
    }

    /// Adds a fresh project member with `role` and returns their identifier.
    pub async fn project_member(&self, project: ProjectId, role: MemberRole) -> UserId {
        let user = UserId::new();
        self.projects
            .add_member(self.owner, project, &summary(user), role)
            .await
            .expect("member is added");
        user
    }

    /// Adds a fresh idea collaborator with `role` and returns their
    /// identifier.
    pub async fn idea_member(&self, idea: IdeaId, role: MemberRole) -> UserId {
        let user = UserId::new();
        self.ideas
            .add_member(self.owner, idea, &summary(user), role)
            .await
            .expect("member is added");
        user
    }

    /// Creates a standalone task owned by `creator`.
    pub async fn standalone(&self, creator: UserId, title: &str) -> TaskId {
        self.tasks
            .create(creator, NewTask::titled(title), RelationChanges::default())
            .await
            .expect("task is created")
            .task
            .id()
    }

    /// Creates a task inside `project` as the project owner.
    pub async fn project_task(&self, project: ProjectId, title: &str) -> TaskId {
        self.tasks
            .create(self.owner, NewTask::titled(title), in_project(project))
            .await
            .expect("task is created")
            .task
            .id()
    }
}

pub fn in_project(project: ProjectId) -> RelationChanges {
    RelationChanges {
        project: Some(Some(project)),
        ..RelationChanges::default()
    }
}

pub fn summary(id: UserId) -> UserSummary {
    UserSummary {
        id,
        email: format!("{id}@example.com"),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
    }
}
