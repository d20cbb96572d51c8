use serde::Serialize;

use crate::core::context::FamilyContext;
use crate::core::error::CascadeResult;
use crate::core::identity::Role;
use crate::graph::version::{Classification, VersionClassifier};
use crate::host::workspace::MemberProject;

/// Status information for a single member project
#[derive(Debug, Clone, Serialize)]
pub struct MemberStatus {
  /// Project directory name
  pub project: String,

  /// `group:artifact`
  pub module: String,

  pub version: String,
  pub classification: Classification,

  /// Latest released version, if any
  pub last_release: Option<String>,

  /// Member of this family (valid identity, member role, matching family ID)
  pub in_family: bool,

  /// Parent declared at a snapshot version
  pub unreleased_parent: Option<String>,

  /// Dependencies declared at snapshot versions
  pub unreleased_dependencies: Vec<String>,
}

/// Family-level status report
#[derive(Debug, Clone, Serialize)]
pub struct FamilyStatus {
  pub family: String,
  pub family_id: String,
  pub layout: String,
  pub cascade: String,
  pub members: Vec<MemberStatus>,
}

fn member_status(member: &MemberProject, family_id: &str) -> MemberStatus {
  let classifier = VersionClassifier;
  let manifest = &member.manifest;
  let identity = &manifest.identity;

  MemberStatus {
    project: member.name.clone(),
    module: manifest.coordinate().to_string(),
    version: manifest.module.version.clone(),
    classification: classifier.classify(&manifest.module.version),
    last_release: manifest.release.last.clone(),
    in_family: identity.is_valid() && identity.role == Role::Member && identity.family_id == family_id,
    unreleased_parent: manifest
      .parent
      .as_ref()
      .filter(|p| classifier.is_unreleased(&p.version))
      .map(|p| format!("{} ({})", p.coordinate, p.version)),
    unreleased_dependencies: manifest
      .dependencies
      .iter()
      .filter(|d| classifier.is_unreleased(&d.version))
      .map(|d| format!("{} ({})", d.coordinate, d.version))
      .collect(),
  }
}

/// Collect the status of every member project
pub fn collect_status(ctx: &FamilyContext) -> FamilyStatus {
  let config = ctx.config();
  FamilyStatus {
    family: config.family.name.clone(),
    family_id: config.family.id.clone(),
    layout: config.layout.project.clone(),
    cascade: config.cascade.project.clone(),
    members: ctx
      .workspace
      .members()
      .map(|m| member_status(m, &config.family.id))
      .collect(),
  }
}

/// Run the status command
pub fn run_status(ctx: &FamilyContext, json: bool) -> CascadeResult<()> {
  let status = collect_status(ctx);

  if json {
    println!("{}", serde_json::to_string_pretty(&status)?);
    return Ok(());
  }

  println!("📦 Family '{}' ({})", status.family, &status.family_id[..12.min(status.family_id.len())]);
  println!("   layout: {}   cascade: {}", status.layout, status.cascade);
  println!();

  if status.members.is_empty() {
    println!("⚠️  No member projects found under members/");
    return Ok(());
  }

  for member in &status.members {
    let marker = match (member.in_family, member.classification) {
      (false, _) => "⚪",
      (true, Classification::Released) => "✅",
      (true, Classification::Unreleased) => "🔄",
    };
    println!("{} {} [{}] {}", marker, member.module, member.project, member.version);
    if let Some(last) = &member.last_release {
      println!("     last release: {}", last);
    }
    if !member.in_family {
      println!("     not a member of this family");
    }
    if let Some(parent) = &member.unreleased_parent {
      println!("     parent:     {}", parent);
    }
    for dependency in &member.unreleased_dependencies {
      println!("     dependency: {}", dependency);
    }
  }

  let unreleased = status
    .members
    .iter()
    .filter(|m| m.in_family && m.classification == Classification::Unreleased)
    .count();
  println!();
  println!("{} member(s), {} unreleased", status.members.len(), unreleased);

  Ok(())
}
