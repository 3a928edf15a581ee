//! When steps for bulk task scenarios.

use super::world::{TaskBulkWorld, run_async};
use planboard::shared::Tags;
use planboard::task::{domain::TaskStatus, services::BulkAction};
use rstest_bdd_macros::when;

fn parse_status(raw: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

#[when(r#""{caller}" sets the status of all their tasks to "{status}""#)]
fn update_own_status(
    world: &mut TaskBulkWorld,
    caller: String,
    status: String,
) -> Result<(), eyre::Report> {
    let caller_id = world.person(&caller);
    let ids = world.tasks_of(caller_id);
    let action = BulkAction::UpdateStatus(parse_status(&status)?);
    world.last_result = Some(run_async(world.service.bulk(caller_id, ids, action)));
    Ok(())
}

#[when(r#""{caller}" sets the status of every task to "{status}""#)]
fn update_every_status(
    world: &mut TaskBulkWorld,
    caller: String,
    status: String,
) -> Result<(), eyre::Report> {
    let caller_id = world.person(&caller);
    let ids = world.tasks.iter().map(|(_, id, _)| *id).collect();
    let action = BulkAction::UpdateStatus(parse_status(&status)?);
    world.last_result = Some(run_async(world.service.bulk(caller_id, ids, action)));
    Ok(())
}

#[when(r#""{caller}" adds the tags "{tags}" to all their tasks"#)]
fn add_tags(world: &mut TaskBulkWorld, caller: String, tags: String) -> Result<(), eyre::Report> {
    let caller_id = world.person(&caller);
    let ids = world.tasks_of(caller_id);
    let parsed =
        Tags::parse("value", &tags).map_err(|err| eyre::eyre!("invalid tags in scenario: {err}"))?;
    let action = BulkAction::AddTags(parsed);
    world.last_result = Some(run_async(world.service.bulk(caller_id, ids, action)));
    Ok(())
}
