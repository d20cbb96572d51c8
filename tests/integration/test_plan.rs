//! Tests for the `plan` command

use crate::helpers::*;
use anyhow::Result;

fn artifacts(plan: &serde_json::Value) -> Vec<String> {
  plan["steps"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["module"]["artifact"].as_str().unwrap().to_string())
    .collect()
}

#[test]
fn test_plan_orders_parent_then_dependencies() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("parent", "4-SNAPSHOT", None, &[])?;
  family.add_member("util", "0.9-SNAPSHOT", Some(("parent", "4-SNAPSHOT")), &[])?;
  family.add_member("api", "2-SNAPSHOT", None, &[("util", "0.9-SNAPSHOT")])?;
  family.add_member(
    "core",
    "1.2-SNAPSHOT",
    Some(("parent", "4-SNAPSHOT")),
    &[("api", "2-SNAPSHOT"), ("util", "0.9-SNAPSHOT"), ("released", "1.0")],
  )?;
  family.add_member("released", "1.0", None, &[])?;

  let output = run_cascade(&family.path, &["plan", "core", "--json"])?;
  let plan = stdout_json(&output)?;

  assert_eq!(artifacts(&plan), vec!["parent", "util", "api", "core"]);
  assert_eq!(plan["steps"][3]["to_version"], "1.2");
  assert_eq!(plan["missing"].as_array().unwrap().len(), 0);

  let text = run_cascade(&family.path, &["plan", "core"])?;
  let stdout = String::from_utf8_lossy(&text.stdout);
  assert!(stdout.contains("Release plan for org.acme:core"));
  assert!(stdout.contains("1.2-SNAPSHOT → 1.2"));

  Ok(())
}

#[test]
fn test_plan_reports_cycle() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("a", "1-SNAPSHOT", None, &[("b", "1-SNAPSHOT")])?;
  family.add_member("b", "1-SNAPSHOT", None, &[("a", "1-SNAPSHOT")])?;

  let output = cascade(&family.path, &["plan", "a"])?;
  assert_eq!(output.status.code(), Some(4));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("cycle detected: org.acme:a → org.acme:b → org.acme:a"));

  Ok(())
}

#[test]
fn test_plan_rejects_unknown_and_released_modules() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("done", "3.0", None, &[])?;

  let unknown = cascade(&family.path, &["plan", "ghost"])?;
  assert_eq!(unknown.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&unknown.stderr).contains("No member project builds module 'ghost'"));

  let released = cascade(&family.path, &["plan", "done"])?;
  assert_eq!(released.status.code(), Some(4));
  assert!(String::from_utf8_lossy(&released.stderr).contains("already released at 3.0"));

  Ok(())
}

#[test]
fn test_plan_needs_group_for_ambiguous_artifact() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1-SNAPSHOT", None, &[])?;
  let other = family.write_member("other-core", &family.config.family.id, "core", "1-SNAPSHOT", None, &[])?;
  let content = std::fs::read_to_string(&other)?.replace("group = \"org.acme\"", "group = \"org.other\"");
  std::fs::write(&other, content)?;

  let output = cascade(&family.path, &["plan", "core"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("--group"));

  let output = run_cascade(&family.path, &["plan", "core", "--group", "org.other", "--json"])?;
  let plan = stdout_json(&output)?;
  assert_eq!(plan["target"]["group"], "org.other");
  assert_eq!(plan["steps"][0]["project"], "other-core");

  Ok(())
}
