//! Behaviour tests for role-based project access.

#[path = "project_access_steps/mod.rs"]
mod project_access_steps_defs;

use project_access_steps_defs::world::{ProjectAccessWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/project_access.feature",
    name = "A viewer cannot edit the project"
)]
#[tokio::test(flavor = "multi_thread")]
async fn viewer_cannot_edit(world: ProjectAccessWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/project_access.feature",
    name = "An editor may edit the project"
)]
#[tokio::test(flavor = "multi_thread")]
async fn editor_may_edit(world: ProjectAccessWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/project_access.feature",
    name = "A stranger cannot see the project"
)]
#[tokio::test(flavor = "multi_thread")]
async fn stranger_cannot_see(world: ProjectAccessWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/project_access.feature",
    name = "A contributor cannot manage members"
)]
#[tokio::test(flavor = "multi_thread")]
async fn contributor_cannot_manage_members(world: ProjectAccessWorld) {
    let _ = world;
}
