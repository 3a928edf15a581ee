//! Shared world state for bulk task scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use planboard::account::domain::UserId;
use planboard::blob::adapters::memory::InMemoryBlobStore;
use planboard::idea::adapters::memory::InMemoryIdeaRepository;
use planboard::project::adapters::memory::InMemoryProjectRepository;
use planboard::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId},
    services::{TaskService, TaskServiceError},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    InMemoryIdeaRepository,
    InMemoryBlobStore,
    DefaultClock,
>;

/// Scenario world for bulk task behaviour tests.
pub struct TaskBulkWorld {
    pub service: TestTaskService,
    pub people: HashMap<String, UserId>,
    /// Tasks in creation order with their creators.
    pub tasks: Vec<(UserId, TaskId, String)>,
    pub last_result: Option<Result<usize, TaskServiceError>>,
}

impl TaskBulkWorld {
    /// Creates a world with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let service = TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryProjectRepository::new()),
            Arc::new(InMemoryIdeaRepository::new()),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            people: HashMap::new(),
            tasks: Vec::new(),
            last_result: None,
        }
    }

    /// Returns the identifier for `name`, creating one on first use.
    pub fn person(&mut self, name: &str) -> UserId {
        *self.people.entry(name.to_owned()).or_insert_with(UserId::new)
    }

    /// Identifiers of the tasks created by `user`.
    pub fn tasks_of(&self, user: UserId) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|(creator, _, _)| *creator == user)
            .map(|(_, id, _)| *id)
            .collect()
    }

    /// Loads the task titled `title` as its creator sees it.
    pub fn load(&self, title: &str) -> Result<Task, eyre::Report> {
        let (creator, id, _) = self
            .tasks
            .iter()
            .find(|(_, _, known)| known == title)
            .ok_or_else(|| eyre::eyre!("no task titled {title} in scenario world"))?;
        let detail = run_async(self.service.detail(*creator, *id))
            .map_err(|err| eyre::eyre!("load task {title}: {err}"))?;
        Ok(detail.overview.grant.task)
    }
}

impl Default for TaskBulkWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskBulkWorld {
    TaskBulkWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
