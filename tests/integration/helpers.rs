//! Test helpers for integration tests

use anyhow::{Context, Result};
use cascade_rail::core::config::CascadeConfig;
use cascade_rail::host::manifest::{ProjectManifest, manifest_path};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const GROUP: &str = "org.acme";

/// A family root with cascade.toml and a members/ directory
pub struct TestFamily {
  _root: TempDir,
  pub path: PathBuf,
  pub config: CascadeConfig,
}

impl TestFamily {
  /// Create a new family named "acme"
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    let config = CascadeConfig::new("acme", "acme-layout", "acme-cascade");
    config.save(&path)?;
    std::fs::create_dir_all(path.join("members"))?;

    Ok(Self {
      _root: root,
      path,
      config,
    })
  }

  /// Add a member of this family building `org.acme:<artifact>`
  pub fn add_member(
    &self,
    artifact: &str,
    version: &str,
    parent: Option<(&str, &str)>,
    dependencies: &[(&str, &str)],
  ) -> Result<PathBuf> {
    let family_id = self.config.family.id.clone();
    self.write_member(artifact, &family_id, artifact, version, parent, dependencies)
  }

  /// Write `members/<project>/project.toml` by hand
  pub fn write_member(
    &self,
    project: &str,
    family_id: &str,
    artifact: &str,
    version: &str,
    parent: Option<(&str, &str)>,
    dependencies: &[(&str, &str)],
  ) -> Result<PathBuf> {
    let mut content = format!(
      r#"[identity]
role = "member"
family = "{family_id}"
project = "{project}-id"

[module]
group = "{GROUP}"
artifact = "{artifact}"
version = "{version}"
"#
    );

    if let Some((artifact, version)) = parent {
      content.push_str(&format!(
        "\n[parent]\ngroup = \"{GROUP}\"\nartifact = \"{artifact}\"\nversion = \"{version}\"\n"
      ));
    }
    for (artifact, version) in dependencies {
      content.push_str(&format!(
        "\n[[dependencies]]\ngroup = \"{GROUP}\"\nartifact = \"{artifact}\"\nversion = \"{version}\"\n"
      ));
    }

    let path = manifest_path(&self.path, project);
    std::fs::create_dir_all(path.parent().context("manifest has no parent dir")?)?;
    std::fs::write(&path, content)?;
    Ok(path)
  }

  /// Parse a member's manifest as it is on disk now
  pub fn member(&self, project: &str) -> Result<ProjectManifest> {
    Ok(ProjectManifest::load(&manifest_path(&self.path, project))?)
  }

  /// Read a file relative to the family root
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run the cascade CLI and return its output, whatever the exit status
pub fn cascade(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_cascade"))
    .current_dir(cwd)
    .args(args)
    .env_remove("CASCADE_LOG")
    .output()
    .context("Failed to run cascade")
}

/// Run the cascade CLI and fail unless it exits successfully
pub fn run_cascade(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = cascade(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cascade command failed: cascade {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Parse a command's stdout as JSON
pub fn stdout_json(output: &Output) -> Result<serde_json::Value> {
  serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}
