//! Member project manifests (`members/<project>/project.toml`)
//!
//! Reading goes through serde (`toml_edit::de`); writing goes through a
//! `DocumentMut` so that update and release builds only touch the version
//! strings they change and leave comments and layout alone.
//!
//! ```toml
//! [identity]
//! role = "member"
//! family = "3f1c..."
//! project = "77ab..."
//!
//! [module]
//! group = "org.acme"
//! artifact = "core"
//! version = "1.2-SNAPSHOT"
//!
//! [parent]
//! group = "org.acme"
//! artifact = "parent"
//! version = "4-SNAPSHOT"
//!
//! [[dependencies]]
//! group = "org.acme"
//! artifact = "util"
//! version = "0.9-SNAPSHOT"
//!
//! [release]
//! last = "1.1"
//! ```

use crate::core::error::{CascadeError, CascadeResult, ProjectError, ResultExt};
use crate::core::identity::ProjectIdentity;
use crate::graph::project_graph::{Declaration, Manifest, ModuleCoordinate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, Table, Value};

/// Directory under the family root holding one directory per member project
pub const MEMBERS_DIR: &str = "members";

/// Manifest file name inside a member project directory
pub const MANIFEST_FILE: &str = "project.toml";

/// `[module]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSection {
  pub group: String,
  pub artifact: String,
  pub version: String,
}

/// `[release]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSection {
  /// Latest released version of this module
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last: Option<String>,
}

/// Parsed `project.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
  #[serde(default)]
  pub identity: ProjectIdentity,
  pub module: ModuleSection,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent: Option<Declaration>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub dependencies: Vec<Declaration>,
  #[serde(default)]
  pub release: ReleaseSection,
}

impl ProjectManifest {
  /// Parse a manifest file
  pub fn load(path: &Path) -> CascadeResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml_edit::de::from_str(&content).map_err(|e| {
      CascadeError::Project(ProjectError::InvalidManifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })
  }

  /// Write a fresh manifest file, creating its directory
  pub fn save(&self, path: &Path) -> CascadeResult<()> {
    if let Some(dir) = path.parent() {
      fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize manifest")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
  }

  pub fn coordinate(&self) -> ModuleCoordinate {
    ModuleCoordinate::new(&self.module.group, &self.module.artifact)
  }

  /// Latest released version, if the module was ever released
  pub fn last_release(&self) -> Option<&str> {
    self.release.last.as_deref()
  }

  /// Declared coordinates and versions, as the project graph sees them
  pub fn to_manifest(&self) -> Manifest {
    Manifest {
      coordinate: self.coordinate(),
      version: self.module.version.clone(),
      parent: self.parent.clone(),
      dependencies: self.dependencies.clone(),
    }
  }
}

/// Path of a member's manifest under the family root
pub fn manifest_path(family_root: &Path, project: &str) -> PathBuf {
  family_root.join(MEMBERS_DIR).join(project).join(MANIFEST_FILE)
}

/// Format-preserving editor for one `project.toml`
pub struct ManifestDocument {
  path: PathBuf,
  doc: DocumentMut,
}

impl ManifestDocument {
  pub fn open(path: &Path) -> CascadeResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = content
      .parse::<DocumentMut>()
      .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Self {
      path: path.to_path_buf(),
      doc,
    })
  }

  fn table_mut(&mut self, name: &str) -> CascadeResult<&mut Table> {
    let path = self.path.clone();
    self
      .doc
      .get_mut(name)
      .and_then(Item::as_table_mut)
      .ok_or_else(|| {
        CascadeError::Project(ProjectError::InvalidManifest {
          path,
          reason: format!("missing [{}] section", name),
        })
      })
  }

  /// Set `[module] version`
  pub fn set_own_version(&mut self, version: &str) -> CascadeResult<()> {
    self.table_mut("module")?["version"] = toml_edit::value(version);
    Ok(())
  }

  /// Set `[parent] version` (also accepts an inline `parent = { ... }`)
  pub fn set_parent_version(&mut self, version: &str) -> CascadeResult<()> {
    let path = self.path.clone();
    let parent = self
      .doc
      .get_mut("parent")
      .and_then(Item::as_table_like_mut)
      .ok_or_else(|| {
        CascadeError::Project(ProjectError::InvalidManifest {
          path,
          reason: "missing [parent] section".to_string(),
        })
      })?;
    parent.insert("version", toml_edit::value(version));
    Ok(())
  }

  /// Set the version of every dependency entry declaring `module`, whether
  /// written as `[[dependencies]]` tables or an inline array of tables.
  /// Returns how many entries changed.
  pub fn set_dependency_version(&mut self, module: &ModuleCoordinate, version: &str) -> usize {
    let Some(item) = self.doc.get_mut("dependencies") else {
      return 0;
    };

    let mut changed = 0;
    if let Some(entries) = item.as_array_of_tables_mut() {
      for entry in entries.iter_mut() {
        let matches = entry.get("group").and_then(Item::as_str) == Some(module.group.as_str())
          && entry.get("artifact").and_then(Item::as_str) == Some(module.artifact.as_str());
        if matches && entry.get("version").and_then(Item::as_str) != Some(version) {
          entry["version"] = toml_edit::value(version);
          changed += 1;
        }
      }
    } else if let Some(entries) = item.as_array_mut() {
      for entry in entries.iter_mut().filter_map(Value::as_inline_table_mut) {
        let matches = entry.get("group").and_then(Value::as_str) == Some(module.group.as_str())
          && entry.get("artifact").and_then(Value::as_str) == Some(module.artifact.as_str());
        if matches && entry.get("version").and_then(Value::as_str) != Some(version) {
          entry.insert("version", Value::from(version));
          changed += 1;
        }
      }
    }
    changed
  }

  /// Record `[release] last`
  pub fn set_last_release(&mut self, version: &str) {
    if !self.doc.contains_table("release") {
      self.doc["release"] = Item::Table(Table::new());
    }
    self.doc["release"]["last"] = toml_edit::value(version);
  }

  /// Replace `[identity]` wholesale
  pub fn set_identity(&mut self, identity: &ProjectIdentity) {
    let mut table = Table::new();
    table["role"] = toml_edit::value(identity.role.to_string());
    table["family"] = toml_edit::value(identity.family_id.as_str());
    table["project"] = toml_edit::value(identity.project_id.as_str());
    self.doc["identity"] = Item::Table(table);
  }

  /// Write back to the file it was opened from
  pub fn save(&self) -> CascadeResult<()> {
    self.save_to(&self.path)
  }

  /// Write to another path, creating its directory
  pub fn save_to(&self, path: &Path) -> CascadeResult<()> {
    if let Some(dir) = path.parent() {
      fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(path, self.doc.to_string()).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
  }
}
