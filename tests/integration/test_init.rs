//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;
use cascade_rail::core::config::CascadeConfig;

#[test]
fn test_init_creates_config() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  run_cascade(temp.path(), &["init", "--name", "acme", "--cascade", "acme-release"])?;

  let config = CascadeConfig::load(temp.path())?;
  assert_eq!(config.family.name, "acme");
  assert_eq!(config.layout.project, "acme-layout");
  assert_eq!(config.cascade.project, "acme-release");
  assert!(config.layout_identity().is_valid());
  assert_eq!(config.cascade_identity().family_id, config.family.id);
  assert_ne!(config.layout.id, config.cascade.id);
  assert!(temp.path().join("members").is_dir());

  Ok(())
}

#[test]
fn test_init_honors_dir_flag() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let family = temp.path().join("family");
  std::fs::create_dir_all(&family)?;

  let dir = family.to_string_lossy().to_string();
  run_cascade(temp.path(), &["-C", dir.as_str(), "init", "--name", "acme"])?;

  assert!(family.join("cascade.toml").exists());
  assert!(!temp.path().join("cascade.toml").exists());

  Ok(())
}

#[test]
fn test_init_refuses_existing_config() -> Result<()> {
  let family = TestFamily::new()?;
  let before = family.read_file("cascade.toml")?;

  let output = cascade(&family.path, &["init", "--name", "other"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
  assert_eq!(family.read_file("cascade.toml")?, before);

  Ok(())
}

#[test]
fn test_commands_require_config() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  let output = cascade(temp.path(), &["status"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("cascade init"));

  Ok(())
}
