use crate::core::error::{CascadeError, CascadeResult, ConfigError, ResultExt};
use crate::core::identity::{ProjectIdentity, Role, generate_id};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a cascade family
/// Searched in order: cascade.toml, .cascade.toml, .config/cascade.toml
///
/// # Example
///
/// ```toml
/// [family]
/// name = "acme"
/// id = "3f1c..."
///
/// [layout]
/// project = "acme-layout"
/// id = "9ab0..."
///
/// [cascade]
/// project = "acme-cascade"
/// id = "c77e..."
///
/// [goals]
/// release = ["clean", "package"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
  pub family: FamilyConfig,
  pub layout: ProjectSlot,
  pub cascade: ProjectSlot,
  #[serde(default)]
  pub goals: GoalsConfig,
  #[serde(default)]
  pub queue: QueueConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyConfig {
  pub name: String,
  pub id: String,
}

/// A layout or cascade project of the family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSlot {
  pub project: String,
  pub id: String,
}

/// Goals passed to the build host for each sub-build kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
  /// Goals of a member's release build (default: ["clean", "package"])
  #[serde(default = "default_release_goals")]
  pub release: Vec<String>,

  /// Goals of a manifest update build (parent/dependency version substitution + commit)
  #[serde(default = "default_update_goals")]
  pub update: Vec<String>,
}

fn default_release_goals() -> Vec<String> {
  vec!["clean".to_string(), "package".to_string()]
}

fn default_update_goals() -> Vec<String> {
  vec![
    "versions:update-parent".to_string(),
    "versions:use-latest-releases".to_string(),
    "scm:checkin".to_string(),
  ]
}

impl Default for GoalsConfig {
  fn default() -> Self {
    Self {
      release: default_release_goals(),
      update: default_update_goals(),
    }
  }
}

/// Local queue behavior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueueConfig {
  /// Give up on a blocked item after this many seconds (0 = wait forever)
  #[serde(default)]
  pub admission_timeout_secs: u64,
}

impl QueueConfig {
  /// Admission timeout, if one is configured
  pub fn admission_timeout(&self) -> Option<Duration> {
    (self.admission_timeout_secs > 0).then(|| Duration::from_secs(self.admission_timeout_secs))
  }
}

impl CascadeConfig {
  /// Create a config for a brand-new family with freshly minted identities
  pub fn new(name: impl Into<String>, layout_project: impl Into<String>, cascade_project: impl Into<String>) -> Self {
    let layout = ProjectIdentity::for_layout();
    Self {
      family: FamilyConfig {
        name: name.into(),
        id: layout.family_id.clone(),
      },
      layout: ProjectSlot {
        project: layout_project.into(),
        id: layout.project_id,
      },
      cascade: ProjectSlot {
        project: cascade_project.into(),
        id: generate_id("project"),
      },
      goals: GoalsConfig::default(),
      queue: QueueConfig::default(),
    }
  }

  /// Find config file in search order: cascade.toml, .cascade.toml, .config/cascade.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("cascade.toml"),
      path.join(".cascade.toml"),
      path.join(".config").join("cascade.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from cascade.toml (searches multiple locations)
  pub fn load(path: &Path) -> CascadeResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      CascadeError::Config(ConfigError::NotFound {
        family_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: CascadeConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Save config to cascade.toml (default location)
  pub fn save(&self, path: &Path) -> CascadeResult<()> {
    let config_path = path.join("cascade.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Validate identities and goals
  pub fn validate(&self) -> CascadeResult<()> {
    let required = [
      ("family.name", &self.family.name),
      ("family.id", &self.family.id),
      ("layout.project", &self.layout.project),
      ("layout.id", &self.layout.id),
      ("cascade.project", &self.cascade.project),
      ("cascade.id", &self.cascade.id),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(CascadeError::Config(ConfigError::MissingField {
          field: field.to_string(),
        }));
      }
    }

    if self.layout.project == self.cascade.project {
      return Err(CascadeError::with_help(
        format!("Layout and cascade share the project name '{}'", self.layout.project),
        "Give the cascade project its own name under [cascade]",
      ));
    }

    if self.goals.release.is_empty() || self.goals.update.is_empty() {
      return Err(CascadeError::with_help(
        "Goal lists must not be empty",
        "Remove [goals] to use the defaults, or list at least one goal per kind",
      ));
    }

    Ok(())
  }

  /// Identity of the layout project
  pub fn layout_identity(&self) -> ProjectIdentity {
    ProjectIdentity::new(Role::Layout, self.family.id.clone(), self.layout.id.clone())
  }

  /// Identity of the cascade project
  pub fn cascade_identity(&self) -> ProjectIdentity {
    ProjectIdentity::new(Role::Cascade, self.family.id.clone(), self.cascade.id.clone())
  }
}
