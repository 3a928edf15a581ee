//! Then steps for bulk task scenarios.

use super::world::TaskBulkWorld;
use planboard::access::AccessError;
use planboard::task::{domain::TaskStatus, services::TaskServiceError};
use rstest_bdd_macros::then;

#[then("{count:usize} tasks were updated")]
fn tasks_were_updated(world: &TaskBulkWorld, count: usize) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(updated)) if *updated == count => Ok(()),
        other => Err(eyre::eyre!("expected {count} updated tasks, got {other:?}")),
    }
}

#[then("the bulk request is rejected as not visible")]
fn rejected_as_not_visible(world: &TaskBulkWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(TaskServiceError::Access(AccessError::NotVisible))) => Ok(()),
        other => Err(eyre::eyre!("expected a not-visible error, got {other:?}")),
    }
}

#[then(r#"every task of "{owner}" has status "{status}""#)]
fn every_task_has_status(
    world: &TaskBulkWorld,
    owner: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let owner_id = world
        .people
        .get(&owner)
        .copied()
        .ok_or_else(|| eyre::eyre!("unknown person {owner}"))?;
    for (creator, _, title) in &world.tasks {
        if *creator != owner_id {
            continue;
        }
        let task = world.load(title)?;
        if task.status() != expected {
            return Err(eyre::eyre!(
                "task {title} has status {}, expected {}",
                task.status().as_str(),
                expected.as_str()
            ));
        }
    }
    Ok(())
}

#[then(r#"task "{title}" has tags "{tags}""#)]
fn task_has_tags(world: &TaskBulkWorld, title: String, tags: String) -> Result<(), eyre::Report> {
    let task = world.load(&title)?;
    let found = task.tags().to_csv();
    if found != tags {
        return Err(eyre::eyre!("task {title} has tags {found}, expected {tags}"));
    }
    Ok(())
}
