//! What a build actually does once the queue has started it
//!
//! - **Update**: pin unreleased parent/dependency declarations to the latest
//!   release of the member that builds them
//! - **Release**: strip `-SNAPSHOT` from the module's own version and record it
//! - **ReleaseModule**: run the release resolver for the target
//! - **Cascade**: schedule the target member's `ReleaseModule` build and wait

use crate::core::cause::Cause;
use crate::core::error::CascadeResult;
use crate::graph::project_graph::{ManifestSource, ModuleCoordinate, ProjectGraph, ProjectHandle};
use crate::graph::version::VersionClassifier;
use crate::host::manifest::ManifestDocument;
use crate::host::workspace::FamilyWorkspace;
use crate::release::outcome::{ReleaseError, ReleaseOutcome};
use crate::release::resolver::ReleaseResolver;
use crate::release::scheduler::{BuildGoal, BuildRequest, BuildScheduler, BuildStatus, CancelToken};
use std::collections::HashSet;
use std::sync::Arc;

/// Everything a build may consult while it runs
pub struct ExecutionContext<'a> {
  pub project: &'a ProjectHandle,
  pub causes: &'a [Cause],
  pub cancel: &'a CancelToken,
  /// Queue the build runs on; nested builds go back through it
  pub scheduler: &'a dyn BuildScheduler,
}

/// Terminal status plus the build's own log
#[derive(Debug, Clone)]
pub struct Execution {
  pub status: BuildStatus,
  pub log: Vec<String>,
}

impl Execution {
  pub fn new(status: BuildStatus, log: Vec<String>) -> Self {
    Self { status, log }
  }
}

/// Runs a started build to completion on the calling thread
pub trait BuildExecutor: Send + Sync {
  fn execute(&self, goal: &BuildGoal, ctx: &ExecutionContext<'_>) -> Execution;
}

/// Executes goals against a `FamilyWorkspace` on disk
pub struct WorkspaceExecutor {
  workspace: Arc<FamilyWorkspace>,
  classifier: VersionClassifier,
}

impl WorkspaceExecutor {
  pub fn new(workspace: Arc<FamilyWorkspace>) -> Self {
    Self {
      workspace,
      classifier: VersionClassifier,
    }
  }

  fn update(&self, project: &ProjectHandle, goals: &[String], log: &mut Vec<String>) -> CascadeResult<BuildStatus> {
    log.push(format!("goals: {}", goals.join(" ")));
    let manifest = self.workspace.read_member(project.as_str())?;
    let path = &self.workspace.require_member(project.as_str())?.path;
    let mut doc = ManifestDocument::open(path)?;
    let mut pinned = 0;

    if let Some(parent) = manifest.parent.as_ref().filter(|p| self.classifier.is_unreleased(&p.version)) {
      if let Some(release) = self.workspace.last_release_of(&parent.coordinate)? {
        doc.set_parent_version(&release)?;
        log.push(format!("parent {} {} -> {}", parent.coordinate, parent.version, release));
        pinned += 1;
      } else {
        log.push(format!("parent {} has no release yet", parent.coordinate));
      }
    }

    let mut seen = HashSet::new();
    for dependency in manifest
      .dependencies
      .iter()
      .filter(|d| self.classifier.is_unreleased(&d.version))
      .filter(|d| seen.insert(&d.coordinate))
    {
      match self.workspace.last_release_of(&dependency.coordinate)? {
        Some(release) => match doc.set_dependency_version(&dependency.coordinate, &release) {
          0 => log.push(format!("dependency {} could not be edited in place", dependency.coordinate)),
          changed => {
            log.push(format!("dependency {} {} -> {}", dependency.coordinate, dependency.version, release));
            pinned += changed;
          }
        },
        None => log.push(format!("dependency {} has no release yet", dependency.coordinate)),
      }
    }

    if pinned > 0 {
      doc.save()?;
      log.push(format!("checked in {} version change(s)", pinned));
    } else {
      log.push("nothing to update".to_string());
    }
    Ok(BuildStatus::Success)
  }

  fn release(&self, project: &ProjectHandle, goals: &[String], log: &mut Vec<String>) -> CascadeResult<BuildStatus> {
    log.push(format!("goals: {}", goals.join(" ")));
    let manifest = self.workspace.read_member(project.as_str())?;
    let current = manifest.module.version.as_str();
    if !self.classifier.is_unreleased(current) {
      log.push(format!("{} is already at released version {}", manifest.coordinate(), current));
      return Ok(BuildStatus::Failure);
    }

    let released = self.classifier.release_version(current);
    let path = &self.workspace.require_member(project.as_str())?.path;
    let mut doc = ManifestDocument::open(path)?;
    doc.set_own_version(released)?;
    doc.set_last_release(released);
    doc.save()?;

    log.push(format!("released {} {}", manifest.coordinate(), released));
    tracing::info!(project = %project, version = released, "module released");
    Ok(BuildStatus::Success)
  }

  fn release_module(
    &self,
    target: &ModuleCoordinate,
    ctx: &ExecutionContext<'_>,
    log: &mut Vec<String>,
  ) -> BuildStatus {
    let source: &dyn ManifestSource = &*self.workspace;
    let graph = ProjectGraph::new(source, self.workspace.family_id());
    let resolver = ReleaseResolver::new(graph, ctx.scheduler, self.workspace.config().goals.clone())
      .with_cancel(ctx.cancel.clone());

    let outcome = resolver.release(target, ctx.causes);
    log.extend(resolver.take_log());

    match outcome {
      ReleaseOutcome::Success => BuildStatus::Success,
      ReleaseOutcome::Failure(ReleaseError::Cancelled) => BuildStatus::Aborted,
      ReleaseOutcome::Failure(_) => BuildStatus::Failure,
      ReleaseOutcome::NotApplicable(_) => BuildStatus::Success,
    }
  }

  fn cascade(
    &self,
    target: &ModuleCoordinate,
    ctx: &ExecutionContext<'_>,
    log: &mut Vec<String>,
  ) -> CascadeResult<BuildStatus> {
    let family_id = self.workspace.family_id();
    let Some(member) = self.workspace.resolve_member_project(family_id, target) else {
      log.push(format!("no member project builds {}", target));
      return Ok(BuildStatus::Failure);
    };

    let request = BuildRequest::new(
      member.clone(),
      BuildGoal::ReleaseModule { target: target.clone() },
      Cause::cascade_member(family_id),
    )
    .with_cancel(ctx.cancel.clone());

    log.push(format!("scheduled release of {} on {}", target, member));
    let result = ctx.scheduler.schedule_and_await(request)?;
    log.push(format!("{} #{} finished: {}", member, result.number, result.status));
    Ok(result.status)
  }
}

impl BuildExecutor for WorkspaceExecutor {
  fn execute(&self, goal: &BuildGoal, ctx: &ExecutionContext<'_>) -> Execution {
    let mut log = Vec::new();
    let status = match goal {
      BuildGoal::Update { goals } => self.update(ctx.project, goals, &mut log),
      BuildGoal::Release { goals } => self.release(ctx.project, goals, &mut log),
      BuildGoal::ReleaseModule { target } => Ok(self.release_module(target, ctx, &mut log)),
      BuildGoal::Cascade { target } => self.cascade(target, ctx, &mut log),
    };

    let status = status.unwrap_or_else(|err| {
      tracing::error!(project = %ctx.project, "{}", err);
      log.push(format!("error: {}", err));
      BuildStatus::Failure
    });
    Execution::new(status, log)
  }
}
