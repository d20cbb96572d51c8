use crate::core::context::FamilyContext;
use crate::core::error::{CascadeError, CascadeResult};
use crate::core::identity::ProjectIdentity;
use crate::host::manifest::{ManifestDocument, manifest_path};

/// Copy member `project` to `new_project` with a regenerated project ID.
///
/// Role and family are kept, so the copy is still a member of the family;
/// only the project ID changes. Returns the copy's identity.
pub fn duplicate_member(ctx: &FamilyContext, project: &str, new_project: &str) -> CascadeResult<ProjectIdentity> {
  let source = ctx.workspace.require_member(project)?;
  let destination = manifest_path(&ctx.root, new_project);
  if destination.exists() || ctx.workspace.member(new_project).is_some() {
    return Err(CascadeError::with_help(
      format!("Project '{}' already exists", new_project),
      "Pick a project name that is not used under members/",
    ));
  }

  let identity = source.manifest.identity.regenerated();
  let mut doc = ManifestDocument::open(&source.path)?;
  doc.set_identity(&identity);
  doc.save_to(&destination)?;

  tracing::info!(from = project, to = new_project, identity = %identity, "duplicated member");
  Ok(identity)
}

/// Run the duplicate command
pub fn run_duplicate(ctx: &FamilyContext, project: &str, new_project: &str) -> CascadeResult<()> {
  let identity = duplicate_member(ctx, project, new_project)?;

  println!("✅ Copied {} to {}", project, new_project);
  println!("   identity: {}", identity);
  if identity.is_valid() {
    println!();
    println!("⚠️  Both projects build the same module until the copy's [module] is changed;");
    println!("   '{}' keeps answering for it.", project.min(new_project));
  }

  Ok(())
}
