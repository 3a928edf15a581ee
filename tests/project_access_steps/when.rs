//! When steps for project access scenarios.

use super::world::{ProjectAccessWorld, run_async};
use planboard::access::MemberRole;
use planboard::project::domain::ProjectChanges;
use rstest_bdd_macros::when;

#[when(r#""{caller}" renames the project to "{title}""#)]
fn rename_project(
    world: &mut ProjectAccessWorld,
    caller: String,
    title: String,
) -> Result<(), eyre::Report> {
    let caller_id = world.person(&caller);
    let project = world.project()?;
    let changes = ProjectChanges {
        title: Some(title),
        ..ProjectChanges::default()
    };
    let result = run_async(world.service.update(caller_id, project, changes));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{caller}" adds "{member}" as a "{role}""#)]
fn add_member(
    world: &mut ProjectAccessWorld,
    caller: String,
    member: String,
    role: String,
) -> Result<(), eyre::Report> {
    let member_role = MemberRole::try_from(role.as_str())
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;
    let caller_id = world.person(&caller);
    let summary = world.summary(&member);
    let project = world.project()?;
    let result = run_async(
        world
            .service
            .add_member(caller_id, project, &summary, member_role),
    );
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}
