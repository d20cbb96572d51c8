//! Read-only view over a family's declared parents and dependencies
//!
//! The build host owns manifests; the core only reads them through the
//! `ManifestSource` seam. `ProjectGraph` scopes every lookup to one family and
//! attaches a release classification to each declaration.

use crate::core::error::{CascadeResult, ProjectError};
use crate::graph::version::{Classification, VersionClassifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (group, artifact) pair identifying a module independent of its project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleCoordinate {
  pub group: String,
  pub artifact: String,
}

impl ModuleCoordinate {
  pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
    Self {
      group: group.into(),
      artifact: artifact.into(),
    }
  }
}

impl fmt::Display for ModuleCoordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.group, self.artifact)
  }
}

impl FromStr for ModuleCoordinate {
  type Err = String;

  /// Parse `group:artifact`
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.split_once(':') {
      Some((group, artifact)) if !group.is_empty() && !artifact.is_empty() && !artifact.contains(':') => {
        Ok(Self::new(group, artifact))
      }
      _ => Err(format!("expected `group:artifact`, got '{}'", s)),
    }
  }
}

/// Name of a concrete project known to the build host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectHandle(String);

impl ProjectHandle {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProjectHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A parent or dependency declaration as written in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
  #[serde(flatten)]
  pub coordinate: ModuleCoordinate,
  #[serde(default)]
  pub version: String,
}

impl Declaration {
  pub fn new(group: &str, artifact: &str, version: &str) -> Self {
    Self {
      coordinate: ModuleCoordinate::new(group, artifact),
      version: version.to_string(),
    }
  }
}

/// Declared coordinates and versions of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  pub coordinate: ModuleCoordinate,
  pub version: String,
  pub parent: Option<Declaration>,
  pub dependencies: Vec<Declaration>,
}

/// Host-side access to manifests and module ownership
pub trait ManifestSource: Send + Sync {
  /// Current (live) manifest of a project
  fn current_manifest(&self, project: &ProjectHandle) -> CascadeResult<Manifest>;

  /// Project building `module` within `family_id`; never crosses families
  fn resolve_member_project(&self, family_id: &str, module: &ModuleCoordinate) -> Option<ProjectHandle>;
}

/// A declaration plus its release classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
  pub coordinate: ModuleCoordinate,
  pub version: String,
  pub classification: Classification,
}

impl DependencyDescriptor {
  pub fn is_unreleased(&self) -> bool {
    self.classification == Classification::Unreleased
  }
}

impl fmt::Display for DependencyDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.coordinate, self.version)
  }
}

/// Family-scoped, classified view over a `ManifestSource`
pub struct ProjectGraph<'a> {
  source: &'a dyn ManifestSource,
  family_id: String,
  classifier: VersionClassifier,
}

impl<'a> ProjectGraph<'a> {
  pub fn new(source: &'a dyn ManifestSource, family_id: impl Into<String>) -> Self {
    Self {
      source,
      family_id: family_id.into(),
      classifier: VersionClassifier,
    }
  }

  pub fn family_id(&self) -> &str {
    &self.family_id
  }

  pub fn classifier(&self) -> VersionClassifier {
    self.classifier
  }

  /// Member project implementing `module` in this family
  pub fn member_project_for(&self, module: &ModuleCoordinate) -> Option<ProjectHandle> {
    self.source.resolve_member_project(&self.family_id, module)
  }

  /// Like `member_project_for`, failing with `ModuleNotFound`
  pub fn require_project(&self, module: &ModuleCoordinate) -> CascadeResult<ProjectHandle> {
    self.member_project_for(module).ok_or_else(|| {
      ProjectError::ModuleNotFound {
        module: module.to_string(),
      }
      .into()
    })
  }

  pub fn manifest_of(&self, module: &ModuleCoordinate) -> CascadeResult<Manifest> {
    let project = self.require_project(module)?;
    self.source.current_manifest(&project)
  }

  /// The module's own version, classified
  pub fn own_version(&self, module: &ModuleCoordinate) -> CascadeResult<DependencyDescriptor> {
    let manifest = self.manifest_of(module)?;
    Ok(self.describe(&Declaration {
      coordinate: manifest.coordinate,
      version: manifest.version,
    }))
  }

  pub fn parent_of(&self, module: &ModuleCoordinate) -> CascadeResult<Option<DependencyDescriptor>> {
    let manifest = self.manifest_of(module)?;
    Ok(manifest.parent.as_ref().map(|p| self.describe(p)))
  }

  /// Declared dependencies accepted by `matcher`, in declaration order (no de-duplication)
  pub fn dependencies_of<F>(&self, module: &ModuleCoordinate, matcher: F) -> CascadeResult<Vec<DependencyDescriptor>>
  where
    F: Fn(&DependencyDescriptor) -> bool,
  {
    let manifest = self.manifest_of(module)?;
    Ok(
      manifest
        .dependencies
        .iter()
        .map(|d| self.describe(d))
        .filter(|d| matcher(d))
        .collect(),
    )
  }

  /// Shorthand for `dependencies_of(module, is_unreleased)`
  pub fn unreleased_dependencies(&self, module: &ModuleCoordinate) -> CascadeResult<Vec<DependencyDescriptor>> {
    self.dependencies_of(module, DependencyDescriptor::is_unreleased)
  }

  fn describe(&self, declaration: &Declaration) -> DependencyDescriptor {
    DependencyDescriptor {
      coordinate: declaration.coordinate.clone(),
      version: declaration.version.clone(),
      classification: self.classifier.classify(&declaration.version),
    }
  }
}
