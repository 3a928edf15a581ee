//! Repository failure propagation through the task service.

use std::sync::Arc;

use crate::account::domain::UserId;
use crate::blob::adapters::memory::InMemoryBlobStore;
use crate::idea::adapters::memory::InMemoryIdeaRepository;
use crate::project::adapters::memory::InMemoryProjectRepository;
use crate::task::{
    domain::{TaskId, TaskScope},
    ports::{MockTaskRepository, TaskRepositoryError},
    services::{BulkAction, TaskService, TaskServiceError},
};
use mockable::DefaultClock;
use rstest::rstest;

fn service(
    repository: MockTaskRepository,
) -> TaskService<
    MockTaskRepository,
    InMemoryProjectRepository,
    InMemoryIdeaRepository,
    InMemoryBlobStore,
    DefaultClock,
> {
    TaskService::new(
        Arc::new(repository),
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(InMemoryIdeaRepository::new()),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(DefaultClock),
    )
}

fn outage() -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other("connection reset"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_failures_surface_as_repository_errors() {
    let mut repository = MockTaskRepository::new();
    repository.expect_find_by_id().returning(|_| Err(outage()));

    let result = service(repository).detail(UserId::new(), TaskId::new()).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Repository(
            TaskRepositoryError::Persistence(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_failures_surface_as_repository_errors() {
    let caller = UserId::new();
    let mut repository = MockTaskRepository::new();
    repository.expect_list().returning(|_| Err(outage()));

    let result = service(repository).dashboard(caller).await;
    let stats_repository = {
        let mut mock = MockTaskRepository::new();
        mock.expect_list().returning(|_| Err(outage()));
        mock
    };
    let stats = service(stats_repository)
        .stats(caller, TaskScope::Personal(caller))
        .await;

    assert!(matches!(result, Err(TaskServiceError::Repository(_))));
    assert!(matches!(stats, Err(TaskServiceError::Repository(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_writes_nothing_when_lookup_fails() {
    let mut repository = MockTaskRepository::new();
    repository.expect_find_many().returning(|_| Err(outage()));
    repository.expect_update_batch().never();
    repository.expect_delete_tasks().never();

    let result = service(repository)
        .bulk(UserId::new(), vec![TaskId::new()], BulkAction::Delete)
        .await;

    assert!(matches!(result, Err(TaskServiceError::Repository(_))));
}
