//! Family context - load once, pass everywhere
//!
//! ```text
//! main.rs:
//!   FamilyContext::build() -> &FamilyContext
//!   |
//!   v
//! commands/status.rs, plan.rs, release.rs, duplicate.rs:
//!   fn run_*(ctx: &FamilyContext, ...)
//! ```

use crate::core::config::CascadeConfig;
use crate::core::error::CascadeResult;
use crate::graph::project_graph::{ManifestSource, ProjectGraph};
use crate::host::workspace::FamilyWorkspace;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared family-level data for one CLI invocation.
///
/// The workspace sits behind an `Arc` because the queue, the executor and the
/// identity lookup of a release all hold it at once.
#[derive(Clone)]
pub struct FamilyContext {
  /// Family root directory
  pub root: PathBuf,

  /// Configuration plus member projects
  pub workspace: Arc<FamilyWorkspace>,
}

impl FamilyContext {
  /// Load `cascade.toml` and every member manifest under `family_root`
  pub fn build(family_root: &Path) -> CascadeResult<Self> {
    let workspace = Arc::new(FamilyWorkspace::load(family_root)?);
    Ok(Self {
      root: family_root.to_path_buf(),
      workspace,
    })
  }

  pub fn config(&self) -> &CascadeConfig {
    self.workspace.config()
  }

  /// Live project graph scoped to this family
  pub fn project_graph(&self) -> ProjectGraph<'_> {
    let source: &dyn ManifestSource = &*self.workspace;
    ProjectGraph::new(source, self.workspace.family_id())
  }
}
