//! Shared application state handed to every handler.

use crate::account::{
    adapters::{
        jwt::JwtTokenService, memory::InMemoryUserRepository, password::Argon2PasswordHasher,
        postgres::PostgresUserRepository,
    },
    ports::{PasswordHasher, UserRepository},
    services::AccountService,
};
use crate::blob::ports::BlobStore;
use crate::idea::{
    adapters::{memory::InMemoryIdeaRepository, postgres::PostgresIdeaRepository},
    ports::IdeaRepository,
    services::IdeaService,
};
use crate::project::{
    adapters::{memory::InMemoryProjectRepository, postgres::PostgresProjectRepository},
    ports::{ProjectRepository, TopicRepository},
    services::{ProjectService, TopicService},
};
use crate::storage::PgPool;
use crate::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskRepository,
    services::TaskService,
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Account service over the configured user store.
pub type Accounts = AccountService<dyn UserRepository, dyn PasswordHasher, DefaultClock>;
/// Project service over the configured stores.
pub type Projects = ProjectService<dyn ProjectRepository, dyn BlobStore, DefaultClock>;
/// Topic service over the configured stores.
pub type Topics =
    TopicService<dyn TopicRepository, dyn ProjectRepository, dyn BlobStore, DefaultClock>;
/// Idea service over the configured stores.
pub type Ideas = IdeaService<dyn IdeaRepository, dyn ProjectRepository, DefaultClock>;
/// Task service over the configured stores.
pub type Tasks = TaskService<
    dyn TaskRepository,
    dyn ProjectRepository,
    dyn IdeaRepository,
    dyn BlobStore,
    DefaultClock,
>;

/// One repository per bounded context.
#[derive(Clone)]
pub struct Repositories {
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Projects and their child records.
    pub projects: Arc<dyn ProjectRepository>,
    /// Topics; usually the same store as `projects`.
    pub topics: Arc<dyn TopicRepository>,
    /// Ideas.
    pub ideas: Arc<dyn IdeaRepository>,
    /// Tasks, lists and templates.
    pub tasks: Arc<dyn TaskRepository>,
}

impl Repositories {
    /// Process-local stores.
    #[must_use]
    pub fn in_memory() -> Self {
        let projects = Arc::new(InMemoryProjectRepository::new());
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            topics: Arc::clone(&projects) as Arc<dyn TopicRepository>,
            projects,
            ideas: Arc::new(InMemoryIdeaRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
        }
    }

    /// Diesel-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        let projects = Arc::new(PostgresProjectRepository::new(pool.clone()));
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            topics: Arc::clone(&projects) as Arc<dyn TopicRepository>,
            projects,
            ideas: Arc::new(PostgresIdeaRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
        }
    }
}

/// Services and token issuer shared by all routes.
#[derive(Clone)]
pub struct AppState {
    /// Registration, sign-in and profiles.
    pub accounts: Accounts,
    /// Projects, members, files, links and activity.
    pub projects: Projects,
    /// Project topics.
    pub topics: Topics,
    /// Ideas.
    pub ideas: Ideas,
    /// Tasks.
    pub tasks: Tasks,
    /// Bearer token issuer.
    pub tokens: Arc<JwtTokenService>,
    /// Wall clock used for token issue and overdue checks.
    pub clock: Arc<DefaultClock>,
}

impl AppState {
    /// Wires every service over `repositories` and `blobs`.
    #[must_use]
    pub fn new(
        repositories: Repositories,
        blobs: Arc<dyn BlobStore>,
        tokens: JwtTokenService,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        let Repositories {
            users,
            projects,
            topics,
            ideas,
            tasks,
        } = repositories;
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
        Self {
            accounts: AccountService::new(users, hasher, Arc::clone(&clock)),
            projects: ProjectService::new(
                Arc::clone(&projects),
                Arc::clone(&blobs),
                Arc::clone(&clock),
            ),
            topics: TopicService::new(
                topics,
                Arc::clone(&projects),
                Arc::clone(&blobs),
                Arc::clone(&clock),
            ),
            ideas: IdeaService::new(Arc::clone(&ideas), Arc::clone(&projects), Arc::clone(&clock)),
            tasks: TaskService::new(tasks, projects, ideas, blobs, Arc::clone(&clock)),
            tokens: Arc::new(tokens),
            clock,
        }
    }

    /// Current time from the shared clock.
    #[must_use]
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.utc()
    }
}
