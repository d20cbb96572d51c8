//! Tests for the `release` command

use crate::helpers::*;
use anyhow::Result;

/// parent ◀── util ◀── core ──▶ parent
fn chain_family() -> Result<TestFamily> {
  let family = TestFamily::new()?;
  family.add_member("parent", "4-SNAPSHOT", None, &[])?;
  family.add_member("util", "0.9-SNAPSHOT", Some(("parent", "4-SNAPSHOT")), &[])?;
  family.add_member(
    "core",
    "1.2-SNAPSHOT",
    Some(("parent", "4-SNAPSHOT")),
    &[("util", "0.9-SNAPSHOT"), ("released", "2.0")],
  )?;
  family.add_member("released", "2.0", None, &[])?;
  Ok(family)
}

#[test]
fn test_release_dry_run_changes_nothing() -> Result<()> {
  let family = chain_family()?;
  let before = family.read_file("members/core/project.toml")?;

  let output = run_cascade(&family.path, &["release", "core"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Dry-run"));
  assert!(stdout.contains("org.acme:util"));

  assert_eq!(family.read_file("members/core/project.toml")?, before);
  assert_eq!(family.member("parent")?.module.version, "4-SNAPSHOT");

  Ok(())
}

#[test]
fn test_release_apply_releases_whole_chain() -> Result<()> {
  let family = chain_family()?;

  let output = run_cascade(&family.path, &["release", "core", "--apply", "--json"])?;
  let report = stdout_json(&output)?;
  assert_eq!(report["status"], "SUCCESS");

  let parent = family.member("parent")?;
  assert_eq!(parent.module.version, "4");
  assert_eq!(parent.last_release(), Some("4"));

  let util = family.member("util")?;
  assert_eq!(util.module.version, "0.9");
  assert_eq!(util.parent.unwrap().version, "4");

  let core = family.member("core")?;
  assert_eq!(core.module.version, "1.2");
  assert_eq!(core.parent.unwrap().version, "4");
  assert_eq!(core.dependencies[0].version, "0.9");
  assert_eq!(core.dependencies[1].version, "2.0");

  let builds = report["builds"].as_array().unwrap();
  assert_eq!(builds[0]["project"], "acme-cascade");
  assert_eq!(builds[0]["goal"]["kind"], "cascade");
  assert_eq!(builds[0]["causes"][0]["type"], "user_requested");
  for build in &builds[1..] {
    assert_eq!(build["causes"][0]["type"], "cascade_member");
    assert_eq!(build["status"], "SUCCESS");
  }

  let releases: Vec<&str> = builds
    .iter()
    .filter(|b| b["goal"]["kind"] == "release")
    .map(|b| b["project"].as_str().unwrap())
    .collect();
  assert_eq!(releases, vec!["parent", "util", "core"]);

  Ok(())
}

#[test]
fn test_release_keeps_manifest_formatting() -> Result<()> {
  let family = chain_family()?;
  let path = family.path.join("members/util/project.toml");
  let content = std::fs::read_to_string(&path)?;
  std::fs::write(&path, format!("# util keeps this comment\n{}", content))?;

  run_cascade(&family.path, &["release", "util", "--apply"])?;

  let after = std::fs::read_to_string(&path)?;
  assert!(after.starts_with("# util keeps this comment\n"));
  assert!(after.contains("version = \"0.9\""));

  Ok(())
}

#[test]
fn test_release_pins_inline_dependency_array() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("util", "0.9-SNAPSHOT", None, &[])?;
  let core = family.add_member("core", "1.2-SNAPSHOT", None, &[])?;
  let content = std::fs::read_to_string(&core)?;
  std::fs::write(
    &core,
    format!(
      "dependencies = [{{ group = \"{GROUP}\", artifact = \"util\", version = \"0.9-SNAPSHOT\" }}]\n\n{}",
      content
    ),
  )?;

  let output = run_cascade(&family.path, &["release", "core", "--apply", "--json"])?;
  assert_eq!(stdout_json(&output)?["status"], "SUCCESS");

  let core = family.member("core")?;
  assert_eq!(core.module.version, "1.2");
  assert_eq!(core.dependencies[0].version, "0.9");
  assert!(family.read_file("members/core/project.toml")?.starts_with("dependencies = [{"));

  Ok(())
}

#[test]
fn test_release_fails_when_dependency_never_converges() -> Result<()> {
  let family = TestFamily::new()?;
  // util is already at a release but has never recorded one, so updates cannot pin it
  family.add_member("util", "0.9", None, &[])?;
  family.add_member("core", "1.2-SNAPSHOT", None, &[("util", "0.9-SNAPSHOT")])?;

  let output = cascade(&family.path, &["release", "core", "--apply"])?;
  assert_eq!(output.status.code(), Some(4));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("dependencies of org.acme:core are still unreleased: org.acme:util:0.9-SNAPSHOT"));
  assert_eq!(family.member("core")?.module.version, "1.2-SNAPSHOT");

  Ok(())
}

#[test]
fn test_release_refuses_missing_member() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1.2-SNAPSHOT", None, &[("ghost", "1-SNAPSHOT")])?;

  let output = cascade(&family.path, &["release", "core", "--apply"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("No member project releases: org.acme:ghost"));
  assert_eq!(family.member("core")?.module.version, "1.2-SNAPSHOT");

  Ok(())
}
