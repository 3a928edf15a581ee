//! Given steps for project access scenarios.

use super::world::{ProjectAccessWorld, run_async};
use eyre::WrapErr;
use planboard::access::MemberRole;
use planboard::project::domain::NewProject;
use rstest_bdd_macros::given;

#[given(r#""{owner}" owns a project titled "{title}""#)]
fn owns_project(
    world: &mut ProjectAccessWorld,
    owner: String,
    title: String,
) -> Result<(), eyre::Report> {
    let owner_id = world.person(&owner);
    let grant = run_async(world.service.create(owner_id, NewProject::titled(title)))
        .wrap_err("create background project")?;
    world.owner = Some(owner_id);
    world.project = Some(grant.project.id());
    Ok(())
}

#[given(r#""{member}" is a "{role}" of the project"#)]
fn is_member(
    world: &mut ProjectAccessWorld,
    member: String,
    role: String,
) -> Result<(), eyre::Report> {
    add_member(world, &member, &role)
}

#[given(r#""{member}" is an "{role}" of the project"#)]
fn is_member_an(
    world: &mut ProjectAccessWorld,
    member: String,
    role: String,
) -> Result<(), eyre::Report> {
    add_member(world, &member, &role)
}

fn add_member(
    world: &mut ProjectAccessWorld,
    member: &str,
    role: &str,
) -> Result<(), eyre::Report> {
    let member_role = MemberRole::try_from(role)
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;
    let summary = world.summary(member);
    let owner = world.owner()?;
    let project = world.project()?;
    run_async(
        world
            .service
            .add_member(owner, project, &summary, member_role),
    )
    .wrap_err("add project member")?;
    Ok(())
}
