//! Tests for the `status` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_status_json_lists_members() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("parent", "4", None, &[])?;
  family.add_member("util", "0.9-SNAPSHOT", Some(("parent", "4")), &[])?;
  family.add_member("core", "1.2-SNAPSHOT", Some(("parent", "4")), &[("util", "0.9-SNAPSHOT")])?;

  let output = run_cascade(&family.path, &["status", "--json"])?;
  let status = stdout_json(&output)?;

  assert_eq!(status["family"], "acme");
  let members = status["members"].as_array().unwrap();
  assert_eq!(members.len(), 3);

  // sorted by project name
  assert_eq!(members[0]["project"], "core");
  assert_eq!(members[0]["classification"], "unreleased");
  assert_eq!(members[0]["unreleased_parent"], serde_json::Value::Null);
  assert_eq!(members[0]["unreleased_dependencies"][0], "org.acme:util (0.9-SNAPSHOT)");
  assert_eq!(members[1]["project"], "parent");
  assert_eq!(members[1]["classification"], "released");

  Ok(())
}

#[test]
fn test_status_flags_foreign_members() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1-SNAPSHOT", None, &[])?;
  family.write_member("stray", "some-other-family", "stray", "1-SNAPSHOT", None, &[])?;

  let output = run_cascade(&family.path, &["status", "--json"])?;
  let status = stdout_json(&output)?;
  let members = status["members"].as_array().unwrap();

  assert_eq!(members[0]["in_family"], true);
  assert_eq!(members[1]["project"], "stray");
  assert_eq!(members[1]["in_family"], false);

  let text = run_cascade(&family.path, &["status"])?;
  assert!(String::from_utf8_lossy(&text.stdout).contains("not a member of this family"));

  Ok(())
}
