use crate::core::context::FamilyContext;
use crate::core::error::{CascadeError, CascadeResult, ProjectError};
use crate::graph::project_graph::{ManifestSource, ModuleCoordinate};
use crate::release::plan::ReleasePlan;

/// Resolve `artifact` (optionally qualified by `group`) to a module this family builds
pub fn resolve_target(ctx: &FamilyContext, artifact: &str, group: Option<&str>) -> CascadeResult<ModuleCoordinate> {
  let family_id = ctx.workspace.family_id();

  if let Some(group) = group {
    let module = ModuleCoordinate::new(group, artifact);
    return match ctx.workspace.resolve_member_project(family_id, &module) {
      Some(_) => Ok(module),
      None => Err(CascadeError::Project(ProjectError::ModuleNotFound {
        module: module.to_string(),
      })),
    };
  }

  let mut candidates: Vec<ModuleCoordinate> = ctx
    .workspace
    .members()
    .map(|m| m.manifest.coordinate())
    .filter(|c| c.artifact == artifact)
    .filter(|c| ctx.workspace.resolve_member_project(family_id, c).is_some())
    .collect();
  candidates.sort();
  candidates.dedup();

  match candidates.len() {
    0 => Err(CascadeError::Project(ProjectError::ModuleNotFound {
      module: artifact.to_string(),
    })),
    1 => Ok(candidates.remove(0)),
    _ => Err(CascadeError::with_help(
      format!(
        "Artifact '{}' is ambiguous: {}",
        artifact,
        candidates.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
      ),
      "Pass --group to pick one",
    )),
  }
}

/// Run the plan command
pub fn run_plan(ctx: &FamilyContext, artifact: &str, group: Option<&str>, json: bool) -> CascadeResult<()> {
  let target = resolve_target(ctx, artifact, group)?;
  let plan = ReleasePlan::for_module(&ctx.project_graph(), &target)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&plan)?);
  } else {
    print!("{}", plan.to_human_readable());
  }

  Ok(())
}
