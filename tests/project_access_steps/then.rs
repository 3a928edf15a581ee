//! Then steps for project access scenarios.

use super::world::{ProjectAccessWorld, run_async};
use eyre::WrapErr;
use planboard::access::AccessError;
use planboard::project::services::ProjectServiceError;
use rstest_bdd_macros::then;

#[then("the request is forbidden")]
fn request_is_forbidden(world: &ProjectAccessWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;
    if !matches!(
        result,
        Err(ProjectServiceError::Access(AccessError::Forbidden { .. }))
    ) {
        return Err(eyre::eyre!("expected a forbidden error, got {result:?}"));
    }
    Ok(())
}

#[then("the project is not visible")]
fn project_is_not_visible(world: &ProjectAccessWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;
    if !matches!(
        result,
        Err(ProjectServiceError::Access(AccessError::NotVisible))
    ) {
        return Err(eyre::eyre!("expected a not-visible error, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the project title is "{title}""#)]
fn project_title_is(world: &ProjectAccessWorld, title: String) -> Result<(), eyre::Report> {
    let owner = world.owner()?;
    let project = world.project()?;
    let grant = run_async(world.service.get(owner, project)).wrap_err("reload project")?;
    if grant.project.title() != title {
        return Err(eyre::eyre!(
            "expected title {title}, found {}",
            grant.project.title()
        ));
    }
    Ok(())
}
