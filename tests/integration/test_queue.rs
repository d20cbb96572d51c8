//! Library-level tests of cascades running on a shared `LocalQueue`

use crate::helpers::*;
use anyhow::Result;
use cascade_rail::core::cause::Cause;
use cascade_rail::core::identity::Role;
use cascade_rail::graph::project_graph::{ModuleCoordinate, ProjectHandle};
use cascade_rail::host::executor::WorkspaceExecutor;
use cascade_rail::host::queue::{BuildRecord, LocalQueue};
use cascade_rail::host::workspace::FamilyWorkspace;
use cascade_rail::release::scheduler::{BuildGoal, BuildRequest, BuildScheduler, BuildStatus, CancelToken};
use std::sync::Arc;
use std::thread;

fn queue_for(family: &TestFamily) -> Result<(Arc<FamilyWorkspace>, LocalQueue)> {
  let workspace = Arc::new(FamilyWorkspace::load(&family.path)?);
  let queue = LocalQueue::new(Arc::new(WorkspaceExecutor::new(workspace.clone())), workspace.clone());
  Ok((workspace, queue))
}

fn cascade_request(family: &TestFamily, artifact: &str) -> BuildRequest {
  BuildRequest::new(
    ProjectHandle::new(family.config.cascade.project.clone()),
    BuildGoal::Cascade {
      target: ModuleCoordinate::new(GROUP, artifact),
    },
    Cause::UserRequested {
      user: "tester".to_string(),
    },
  )
}

fn numbers_for(history: &[BuildRecord], project: &str) -> Vec<u64> {
  history
    .iter()
    .filter(|r| r.project.as_str() == project)
    .map(|r| r.number)
    .collect()
}

#[test]
fn test_cascades_of_one_family_never_overlap() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("base-x", "1-SNAPSHOT", None, &[])?;
  family.add_member("x", "1-SNAPSHOT", None, &[("base-x", "1-SNAPSHOT")])?;
  family.add_member("base-y", "1-SNAPSHOT", None, &[])?;
  family.add_member("y", "1-SNAPSHOT", None, &[("base-y", "1-SNAPSHOT")])?;
  let (_workspace, queue) = queue_for(&family)?;

  let (x, y) = thread::scope(|s| {
    let x = s.spawn(|| queue.schedule_and_await(cascade_request(&family, "x")));
    let y = s.spawn(|| queue.schedule_and_await(cascade_request(&family, "y")));
    (x.join().unwrap(), y.join().unwrap())
  });
  assert!(x?.is_success());
  assert!(y?.is_success());

  let history = queue.history();
  let mut x_builds = numbers_for(&history, "x");
  x_builds.extend(numbers_for(&history, "base-x"));
  let mut y_builds = numbers_for(&history, "y");
  y_builds.extend(numbers_for(&history, "base-y"));

  let x_range = (*x_builds.iter().min().unwrap(), *x_builds.iter().max().unwrap());
  let y_range = (*y_builds.iter().min().unwrap(), *y_builds.iter().max().unwrap());
  assert!(x_range.1 < y_range.0 || y_range.1 < x_range.0, "cascade sub-builds interleaved");

  assert_eq!(family.member("x")?.module.version, "1");
  assert_eq!(family.member("y")?.module.version, "1");
  assert_eq!(queue.registry().get(&family.config.family.id).unwrap().snapshot(), [0, 0, 0]);

  Ok(())
}

#[test]
fn test_sub_builds_carry_cascade_cause() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("util", "2-SNAPSHOT", None, &[])?;
  family.add_member("core", "1-SNAPSHOT", None, &[("util", "2-SNAPSHOT")])?;
  let (workspace, queue) = queue_for(&family)?;

  let result = queue.schedule_and_await(cascade_request(&family, "core"))?;
  assert!(result.is_success());

  let history = queue.history();
  assert_eq!(history[0].project.as_str(), "acme-cascade");
  let member_builds = &history[1..];
  assert!(!member_builds.is_empty());
  for record in member_builds {
    assert_eq!(
      record.causes,
      vec![Cause::cascade_member(workspace.family_id())],
      "build #{} lacks the cascade cause",
      record.number
    );
    assert_eq!(workspace.identity_of(record.project.as_str()).unwrap().role, Role::Member);
  }

  Ok(())
}

#[test]
fn test_user_member_build_outside_cascade_is_not_a_release() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1-SNAPSHOT", None, &[])?;
  let (_workspace, queue) = queue_for(&family)?;

  let request = BuildRequest::new(
    ProjectHandle::new("core"),
    BuildGoal::ReleaseModule {
      target: ModuleCoordinate::new(GROUP, "core"),
    },
    Cause::UserRequested {
      user: "tester".to_string(),
    },
  );
  let result = queue.schedule_and_await(request)?;

  assert!(result.is_success());
  assert!(result.log.iter().any(|l| l.contains("not applicable")));
  assert_eq!(queue.history().len(), 1);
  assert_eq!(family.member("core")?.module.version, "1-SNAPSHOT");

  Ok(())
}

#[test]
fn test_cancelled_cascade_releases_nothing() -> Result<()> {
  let family = TestFamily::new()?;
  family.add_member("core", "1-SNAPSHOT", None, &[])?;
  let (_workspace, queue) = queue_for(&family)?;

  let cancel = CancelToken::new();
  cancel.cancel();
  let result = queue.schedule_and_await(cascade_request(&family, "core").with_cancel(cancel))?;

  assert_eq!(result.status, BuildStatus::Aborted);
  assert_eq!(queue.history().len(), 1);
  assert_eq!(family.member("core")?.module.version, "1-SNAPSHOT");

  Ok(())
}
