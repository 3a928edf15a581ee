//! Shared world state for project access scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use planboard::account::domain::{UserId, UserSummary};
use planboard::blob::adapters::memory::InMemoryBlobStore;
use planboard::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::ProjectId,
    services::{ProjectService, ProjectServiceError},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestProjectService =
    ProjectService<InMemoryProjectRepository, InMemoryBlobStore, DefaultClock>;

/// Scenario world for project access behaviour tests.
pub struct ProjectAccessWorld {
    pub service: TestProjectService,
    pub people: HashMap<String, UserId>,
    pub owner: Option<UserId>,
    pub project: Option<ProjectId>,
    pub last_result: Option<Result<(), ProjectServiceError>>,
}

impl ProjectAccessWorld {
    /// Creates a world with no people and no project.
    #[must_use]
    pub fn new() -> Self {
        let service = ProjectService::new(
            Arc::new(InMemoryProjectRepository::new()),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            people: HashMap::new(),
            owner: None,
            project: None,
            last_result: None,
        }
    }

    /// Returns the identifier for `name`, creating one on first use.
    pub fn person(&mut self, name: &str) -> UserId {
        *self.people.entry(name.to_owned()).or_insert_with(UserId::new)
    }

    /// Public identity for `name`.
    pub fn summary(&mut self, name: &str) -> UserSummary {
        UserSummary {
            id: self.person(name),
            email: format!("{name}@example.com"),
            first_name: name.to_owned(),
            last_name: String::new(),
        }
    }

    /// The project created in the background step.
    pub fn project(&self) -> Result<ProjectId, eyre::Report> {
        self.project
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// The owner of the background project.
    pub fn owner(&self) -> Result<UserId, eyre::Report> {
        self.owner
            .ok_or_else(|| eyre::eyre!("missing project owner in scenario world"))
    }
}

impl Default for ProjectAccessWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ProjectAccessWorld {
    ProjectAccessWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
