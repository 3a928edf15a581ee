//! Behaviour tests for all-or-nothing bulk task changes.

#[path = "task_bulk_steps/mod.rs"]
mod task_bulk_steps_defs;

use rstest_bdd_macros::scenario;
use task_bulk_steps_defs::world::{TaskBulkWorld, world};

#[scenario(
    path = "tests/features/task_bulk.feature",
    name = "Completing several personal tasks at once"
)]
#[tokio::test(flavor = "multi_thread")]
async fn complete_personal_tasks(world: TaskBulkWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_bulk.feature",
    name = "A hidden task aborts the whole request"
)]
#[tokio::test(flavor = "multi_thread")]
async fn hidden_task_aborts_request(world: TaskBulkWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_bulk.feature",
    name = "Tags are merged into existing tags"
)]
#[tokio::test(flavor = "multi_thread")]
async fn tags_are_merged(world: TaskBulkWorld) {
    let _ = world;
}
