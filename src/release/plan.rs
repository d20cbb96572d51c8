//! Dry-run release planning: what would a cascade release, and in what order?
//!
//! Built from the family's current manifests via `FamilyGraph`. The plan is a
//! prediction: it assumes every update build picks up the releases made
//! before it, which is exactly what the resolver re-verifies at runtime.

use crate::core::error::CascadeResult;
use crate::graph::family_graph::FamilyGraph;
use crate::graph::project_graph::{ModuleCoordinate, ProjectGraph, ProjectHandle};
use crate::release::outcome::ReleaseError;
use serde::Serialize;

/// One module the cascade is expected to release
#[derive(Debug, Clone, Serialize)]
pub struct PlannedRelease {
  pub module: ModuleCoordinate,
  pub project: ProjectHandle,
  pub from_version: String,
  pub to_version: String,
  pub updates_parent: bool,
  pub updates_dependencies: bool,
}

impl PlannedRelease {
  /// Upper bound of sub-builds for this module: its release plus up to two updates per phase
  pub fn max_builds(&self) -> usize {
    1 + 2 * usize::from(self.updates_parent) + 2 * usize::from(self.updates_dependencies)
  }
}

/// Predicted cascade for one target module
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub family_id: String,
  pub target: ModuleCoordinate,
  /// Dependencies first, target last
  pub steps: Vec<PlannedRelease>,
  /// Snapshot declarations no member project can release
  pub missing: Vec<ModuleCoordinate>,
}

impl ReleasePlan {
  /// Plan the release of `target`
  pub fn for_module(graph: &ProjectGraph<'_>, target: &ModuleCoordinate) -> CascadeResult<Self> {
    if graph.member_project_for(target).is_none() {
      return Err(ReleaseError::ProjectNotFound { module: target.clone() }.into());
    }

    let own = graph.own_version(target)?;
    if !own.is_unreleased() {
      return Err(
        ReleaseError::AlreadyReleased {
          module: target.clone(),
          version: own.version,
        }
        .into(),
      );
    }

    let walk = FamilyGraph::walk(graph, target)?;
    if let Some(chain) = walk.find_cycles().into_iter().next() {
      return Err(ReleaseError::CycleDetected { chain }.into());
    }

    let classifier = graph.classifier();
    let steps = walk
      .release_order()
      .into_iter()
      .filter_map(|node| {
        let project = node.project.clone()?;
        let from_version = node.version.clone()?;
        Some(PlannedRelease {
          module: node.module.clone(),
          project,
          to_version: classifier.release_version(&from_version).to_string(),
          from_version,
          updates_parent: node.has_unreleased_parent,
          updates_dependencies: node.has_unreleased_dependencies,
        })
      })
      .collect();

    Ok(Self {
      family_id: graph.family_id().to_string(),
      target: target.clone(),
      steps,
      missing: walk.missing_projects(),
    })
  }

  /// Every snapshot declaration has a member project to release it
  pub fn is_releasable(&self) -> bool {
    self.missing.is_empty()
  }

  /// Upper bound of builds the cascade will schedule
  pub fn max_builds(&self) -> usize {
    self.steps.iter().map(PlannedRelease::max_builds).sum()
  }

  /// Render the plan for terminal output
  pub fn to_human_readable(&self) -> String {
    let mut out = format!("📦 Release plan for {}\n\n", self.target);
    for (i, step) in self.steps.iter().enumerate() {
      let mut updates = Vec::new();
      if step.updates_parent {
        updates.push("parent");
      }
      if step.updates_dependencies {
        updates.push("dependencies");
      }
      let note = if updates.is_empty() {
        String::new()
      } else {
        format!("  (updates {})", updates.join(" + "))
      };
      out.push_str(&format!(
        "  {}. {} [{}]  {} → {}{}\n",
        i + 1,
        step.module,
        step.project,
        step.from_version,
        step.to_version,
        note
      ));
    }

    if !self.missing.is_empty() {
      out.push_str("\n⚠️  No member project releases:\n");
      for module in &self.missing {
        out.push_str(&format!("    {}\n", module));
      }
    }
    out.push_str(&format!("\n  {} module(s), at most {} build(s)\n", self.steps.len(), self.max_builds()));
    out
  }
}
