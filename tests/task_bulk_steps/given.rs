//! Given steps for bulk task scenarios.

use super::world::{TaskBulkWorld, run_async};
use eyre::WrapErr;
use planboard::task::domain::{NewTask, RelationChanges};
use rstest_bdd_macros::given;

fn create_task(
    world: &mut TaskBulkWorld,
    owner: &str,
    input: NewTask,
) -> Result<(), eyre::Report> {
    let creator = world.person(owner);
    let title = input.title.clone();
    let grant = run_async(
        world
            .service
            .create(creator, input, RelationChanges::default()),
    )
    .wrap_err("create scenario task")?;
    world.tasks.push((creator, grant.task.id(), title));
    Ok(())
}

#[given(r#""{owner}" has a task titled "{title}""#)]
fn has_task(world: &mut TaskBulkWorld, owner: String, title: String) -> Result<(), eyre::Report> {
    create_task(world, &owner, NewTask::titled(title))
}

#[given(r#""{owner}" has a tagged task "{title}" with tags "{tags}""#)]
fn has_tagged_task(
    world: &mut TaskBulkWorld,
    owner: String,
    title: String,
    tags: String,
) -> Result<(), eyre::Report> {
    let input = NewTask {
        tags,
        ..NewTask::titled(title)
    };
    create_task(world, &owner, input)
}
