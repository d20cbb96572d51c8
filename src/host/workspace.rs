//! On-disk family workspace
//!
//! ```text
//! <family root>/
//!   cascade.toml
//!   members/
//!     core/project.toml
//!     util/project.toml
//! ```
//!
//! The module index is keyed by (family ID, coordinate), so a member copied
//! in from another family never answers lookups for this one. Manifests are
//! re-read on every `current_manifest` call: update and release builds edit
//! them while a cascade is running.

use crate::core::config::CascadeConfig;
use crate::core::error::{CascadeError, CascadeResult, ProjectError, ResultExt};
use crate::core::identity::{ProjectIdentity, Role};
use crate::graph::project_graph::{Manifest, ManifestSource, ModuleCoordinate, ProjectHandle};
use crate::host::manifest::{MANIFEST_FILE, MEMBERS_DIR, ProjectManifest, manifest_path};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// A member project found under `members/`
#[derive(Debug, Clone)]
pub struct MemberProject {
  pub name: String,
  pub path: PathBuf,
  /// Manifest as it was when the workspace loaded
  pub manifest: ProjectManifest,
}

impl MemberProject {
  pub fn handle(&self) -> ProjectHandle {
    ProjectHandle::new(self.name.clone())
  }
}

/// Family configuration plus every member project
pub struct FamilyWorkspace {
  root: PathBuf,
  config: CascadeConfig,
  members: BTreeMap<String, MemberProject>,
  modules: HashMap<(String, ModuleCoordinate), String>,
}

impl FamilyWorkspace {
  /// Load `cascade.toml` and all member manifests under `root`
  pub fn load(root: &Path) -> CascadeResult<Self> {
    let config = CascadeConfig::load(root)?;
    let members = Self::load_members(root)?;
    let modules = Self::index_modules(&members);

    tracing::debug!(
      family = %config.family.name,
      members = members.len(),
      modules = modules.len(),
      "loaded family workspace"
    );

    Ok(Self {
      root: root.to_path_buf(),
      config,
      members,
      modules,
    })
  }

  fn load_members(root: &Path) -> CascadeResult<BTreeMap<String, MemberProject>> {
    let members_dir = root.join(MEMBERS_DIR);
    if !members_dir.is_dir() {
      return Ok(BTreeMap::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&members_dir).with_context(|| format!("Failed to read {}", members_dir.display()))? {
      let entry = entry?;
      if entry.path().join(MANIFEST_FILE).is_file() {
        names.push(entry.file_name().to_string_lossy().into_owned());
      }
    }

    let loaded: Vec<CascadeResult<MemberProject>> = names
      .into_par_iter()
      .map(|name| {
        let path = manifest_path(root, &name);
        let manifest = ProjectManifest::load(&path)?;
        Ok(MemberProject { name, path, manifest })
      })
      .collect();

    let mut members = BTreeMap::new();
    for member in loaded {
      let member = member?;
      members.insert(member.name.clone(), member);
    }
    Ok(members)
  }

  /// Index family members by module. When two members of one family build
  /// the same module (a fresh duplicate), the first by project name wins.
  fn index_modules(members: &BTreeMap<String, MemberProject>) -> HashMap<(String, ModuleCoordinate), String> {
    let mut modules = HashMap::new();
    for member in members.values() {
      let identity = &member.manifest.identity;
      if !identity.is_valid() || identity.role != Role::Member {
        continue;
      }
      let key = (identity.family_id.clone(), member.manifest.coordinate());
      match modules.get(&key) {
        Some(existing) => tracing::warn!(
          module = %key.1,
          project = %member.name,
          "module already built by '{}'; ignoring this member",
          existing
        ),
        None => {
          modules.insert(key, member.name.clone());
        }
      }
    }
    modules
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn config(&self) -> &CascadeConfig {
    &self.config
  }

  pub fn family_id(&self) -> &str {
    &self.config.family.id
  }

  /// Member projects sorted by name
  pub fn members(&self) -> impl Iterator<Item = &MemberProject> {
    self.members.values()
  }

  pub fn member(&self, project: &str) -> Option<&MemberProject> {
    self.members.get(project)
  }

  /// Look up a member or fail with `ProjectError::NotFound`
  pub fn require_member(&self, project: &str) -> CascadeResult<&MemberProject> {
    self.member(project).ok_or_else(|| {
      CascadeError::Project(ProjectError::NotFound {
        project: project.to_string(),
      })
    })
  }

  /// Identity of any project the family knows: layout, cascade or member
  pub fn identity_of(&self, project: &str) -> Option<ProjectIdentity> {
    if project == self.config.layout.project {
      return Some(self.config.layout_identity());
    }
    if project == self.config.cascade.project {
      return Some(self.config.cascade_identity());
    }
    self.members.get(project).map(|m| m.manifest.identity.clone())
  }

  /// Re-read a member's manifest from disk
  pub fn read_member(&self, project: &str) -> CascadeResult<ProjectManifest> {
    let member = self.require_member(project)?;
    ProjectManifest::load(&member.path)
  }

  /// Latest released version of the module built in this family, read fresh
  pub fn last_release_of(&self, module: &ModuleCoordinate) -> CascadeResult<Option<String>> {
    match self.resolve_member_project(self.family_id(), module) {
      Some(project) => Ok(self.read_member(project.as_str())?.release.last),
      None => Ok(None),
    }
  }
}

impl ManifestSource for FamilyWorkspace {
  fn current_manifest(&self, project: &ProjectHandle) -> CascadeResult<Manifest> {
    Ok(self.read_member(project.as_str())?.to_manifest())
  }

  fn resolve_member_project(&self, family_id: &str, module: &ModuleCoordinate) -> Option<ProjectHandle> {
    self
      .modules
      .get(&(family_id.to_string(), module.clone()))
      .map(|name| ProjectHandle::new(name.clone()))
  }
}
