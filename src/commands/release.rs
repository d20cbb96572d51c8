//! Cascade release command
//!
//! Dry-run by default: prints the release plan. With `--apply` the cascade
//! project's build is scheduled on a `LocalQueue` and the command blocks until
//! it and every build it triggered have finished.

use serde::Serialize;
use std::env;
use std::sync::Arc;

use crate::commands::plan::resolve_target;
use crate::core::cause::Cause;
use crate::core::context::FamilyContext;
use crate::core::error::{CascadeError, CascadeResult};
use crate::graph::project_graph::ProjectHandle;
use crate::host::executor::WorkspaceExecutor;
use crate::host::queue::{BuildRecord, LocalQueue};
use crate::release::outcome::ReleaseError;
use crate::release::plan::ReleasePlan;
use crate::release::scheduler::{BuildGoal, BuildRequest, BuildScheduler, BuildStatus};
use crate::ui::progress::ReleaseProgress;

/// Result of an applied cascade release
#[derive(Debug, Serialize)]
pub struct ReleaseReport<'a> {
  pub plan: &'a ReleasePlan,
  pub status: BuildStatus,
  pub builds: Vec<BuildRecord>,
}

/// Run the release command
pub fn run_release(
  ctx: &FamilyContext,
  artifact: &str,
  group: Option<&str>,
  apply: bool,
  json: bool,
) -> CascadeResult<()> {
  let target = resolve_target(ctx, artifact, group)?;
  let plan = ReleasePlan::for_module(&ctx.project_graph(), &target)?;

  if !apply {
    if json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      print!("{}", plan.to_human_readable());
      println!();
      println!("🔍 Dry-run. Pass --apply to run the cascade release.");
    }
    return Ok(());
  }

  if !plan.is_releasable() {
    let missing: Vec<String> = plan.missing.iter().map(|m| m.to_string()).collect();
    return Err(CascadeError::with_help(
      format!("No member project releases: {}", missing.join(", ")),
      "Every snapshot parent and dependency must be built by a member of this family",
    ));
  }

  let mut queue = LocalQueue::new(
    Arc::new(WorkspaceExecutor::new(ctx.workspace.clone())),
    ctx.workspace.clone(),
  )
  .with_admission_timeout(ctx.config().queue.admission_timeout());

  let progress = (!json).then(|| {
    Arc::new(ReleaseProgress::new(
      plan.max_builds() + 2,
      format!("Releasing {}", target),
    ))
  });
  if let Some(progress) = &progress {
    queue = queue.with_listener(progress.clone());
  }

  let user = env::var("USER").unwrap_or_else(|_| "cli".to_string());
  let request = BuildRequest::new(
    ProjectHandle::new(ctx.config().cascade.project.clone()),
    BuildGoal::Cascade { target: target.clone() },
    Cause::UserRequested { user },
  );
  let result = queue.schedule_and_await(request)?;
  if let Some(progress) = &progress {
    progress.finish();
  }

  let report = ReleaseReport {
    plan: &plan,
    status: result.status,
    builds: queue.history(),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report);
  }

  match result.status {
    BuildStatus::Success => Ok(()),
    BuildStatus::Aborted => Err(CascadeError::Release(ReleaseError::Cancelled)),
    BuildStatus::Failure => Err(CascadeError::Release(ReleaseError::Host(format!(
      "cascade build #{} of {} failed",
      result.number, target
    )))),
  }
}

fn print_report(report: &ReleaseReport<'_>) {
  println!();
  for build in &report.builds {
    let marker = match build.status {
      BuildStatus::Success => "✅",
      BuildStatus::Failure => "❌",
      BuildStatus::Aborted => "⏹️ ",
    };
    println!("{} #{} {} ({})", marker, build.number, build.project, build.goal);
    for line in &build.log {
      println!("     {}", line);
    }
  }
  println!();

  if report.status == BuildStatus::Success {
    println!("✅ Released {}", report.plan.target);
  }
}
