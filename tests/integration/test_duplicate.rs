//! Tests for the `duplicate` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_duplicate_regenerates_project_id() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1-SNAPSHOT", None, &[])?;

  run_cascade(&family.path, &["duplicate", "core", "core-copy"])?;

  let original = family.member("core")?;
  let copy = family.member("core-copy")?;
  assert_eq!(copy.identity.role, original.identity.role);
  assert_eq!(copy.identity.family_id, original.identity.family_id);
  assert_ne!(copy.identity.project_id, original.identity.project_id);
  assert_eq!(copy.module, original.module);

  // the original keeps answering for the shared module
  let output = run_cascade(&family.path, &["plan", "core", "--json"])?;
  assert_eq!(stdout_json(&output)?["steps"][0]["project"], "core");

  Ok(())
}

#[test]
fn test_duplicate_rejects_existing_target() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1-SNAPSHOT", None, &[])?;
  family.add_member("util", "1-SNAPSHOT", None, &[])?;

  let output = cascade(&family.path, &["duplicate", "core", "util"])?;
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(family.member("util")?.module.artifact, "util");

  let missing = cascade(&family.path, &["duplicate", "ghost", "ghost-2"])?;
  assert!(String::from_utf8_lossy(&missing.stderr).contains("Project 'ghost' not found"));

  Ok(())
}
