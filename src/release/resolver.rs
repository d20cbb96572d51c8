//! Recursive release resolution
//!
//! Releasing module `M` means: make its parent released, make its
//! dependencies released, then run `M`'s own release build. Parent and
//! dependencies follow the same fixed protocol:
//!
//! ```text
//! unreleased? ── no ──▶ done
//!     │ yes
//!     ▼
//! update(M) ─▶ still unreleased? ─▶ release(each, recursively, in order)
//!     ─▶ still unreleased? ─▶ update(M) ─▶ still unreleased? ─▶ FAILURE
//! ```
//!
//! # Invariants
//!
//! - Exactly one re-attempt per phase; a manifest that never converges fails, it never loops.
//! - The parent phase completes before the dependency phase starts.
//! - Dependencies are released one at a time, in declaration order.
//! - The first failure anywhere aborts the whole call; released subordinates stay released.
//! - A module revisited while on the active call chain fails with `CycleDetected`.

use crate::core::cause::Cause;
use crate::core::config::GoalsConfig;
use crate::graph::project_graph::{DependencyDescriptor, ModuleCoordinate, ProjectGraph, ProjectHandle};
use crate::release::outcome::{Phase, ReleaseError, ReleaseOutcome, SubBuild};
use crate::release::scheduler::{BuildGoal, BuildRequest, BuildScheduler, CancelToken};
use std::cell::RefCell;

/// Drives one cascade's recursive release on the calling thread
pub struct ReleaseResolver<'a> {
  graph: ProjectGraph<'a>,
  scheduler: &'a dyn BuildScheduler,
  goals: GoalsConfig,
  cancel: CancelToken,
  log: RefCell<Vec<String>>,
}

impl<'a> ReleaseResolver<'a> {
  pub fn new(graph: ProjectGraph<'a>, scheduler: &'a dyn BuildScheduler, goals: GoalsConfig) -> Self {
    Self {
      graph,
      scheduler,
      goals,
      cancel: CancelToken::new(),
      log: RefCell::new(Vec::new()),
    }
  }

  /// Observe `cancel` before every subordinate build and hand it to each request
  pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }

  /// Lines describing what the resolver did, in order
  pub fn take_log(&self) -> Vec<String> {
    std::mem::take(&mut *self.log.borrow_mut())
  }

  /// Release `target` on behalf of a build triggered with `causes`.
  ///
  /// Only builds carrying this family's cascade-member cause enter the
  /// protocol; anything else is `NotApplicable`.
  pub fn release(&self, target: &ModuleCoordinate, causes: &[Cause]) -> ReleaseOutcome {
    let family_id = self.graph.family_id().to_string();
    let Some(cause) = causes.iter().find(|c| c.is_cascade_member_of(&family_id)) else {
      let reason = format!("{} was not triggered by a cascade of this family", target);
      tracing::info!(module = %target, "{}", reason);
      return ReleaseOutcome::NotApplicable(reason);
    };

    let mut chain = Vec::new();
    let outcome = ReleaseOutcome::from(self.release_module(target, cause, &mut chain));
    match &outcome {
      ReleaseOutcome::Failure(err) => tracing::error!(module = %target, "{}", err),
      _ => tracing::info!(module = %target, "{}", outcome.summary()),
    }
    self.note(0, outcome.summary());
    outcome
  }

  fn release_module(
    &self,
    module: &ModuleCoordinate,
    cause: &Cause,
    chain: &mut Vec<ModuleCoordinate>,
  ) -> Result<(), ReleaseError> {
    if let Some(start) = chain.iter().position(|m| m == module) {
      let mut cycle = chain[start..].to_vec();
      cycle.push(module.clone());
      return Err(ReleaseError::CycleDetected { chain: cycle });
    }

    chain.push(module.clone());
    let result = self.release_steps(module, cause, chain);
    chain.pop();
    result
  }

  fn release_steps(
    &self,
    module: &ModuleCoordinate,
    cause: &Cause,
    chain: &mut Vec<ModuleCoordinate>,
  ) -> Result<(), ReleaseError> {
    let depth = chain.len();
    let project = self
      .graph
      .member_project_for(module)
      .ok_or_else(|| ReleaseError::ProjectNotFound { module: module.clone() })?;

    let own = self.graph.own_version(module).map_err(host)?;
    if !own.is_unreleased() {
      return Err(ReleaseError::AlreadyReleased {
        module: module.clone(),
        version: own.version,
      });
    }
    self.note(depth, format!("releasing {} ({})", module, own.version));

    self.parent_phase(module, &project, cause, chain)?;
    self.dependency_phase(module, &project, cause, chain)?;

    self.trigger(&project, SubBuild::Release, cause, depth)?;
    self.note(depth, format!("released {}", module));
    Ok(())
  }

  fn parent_phase(
    &self,
    module: &ModuleCoordinate,
    project: &ProjectHandle,
    cause: &Cause,
    chain: &mut Vec<ModuleCoordinate>,
  ) -> Result<(), ReleaseError> {
    let depth = chain.len();
    let unreleased_parent = || -> Result<Option<DependencyDescriptor>, ReleaseError> {
      Ok(self.graph.parent_of(module).map_err(host)?.filter(|p| p.is_unreleased()))
    };

    let Some(parent) = unreleased_parent()? else {
      return Ok(());
    };
    self.note(depth, format!("parent {} is unreleased", parent));
    self.trigger(project, SubBuild::Update, cause, depth)?;

    if let Some(parent) = unreleased_parent()? {
      if self.already_released(&parent.coordinate)? {
        self.note(depth, format!("{} is already released", parent.coordinate));
      } else {
        self.release_module(&parent.coordinate, cause, chain)?;
      }
    }

    if unreleased_parent()?.is_some() {
      self.trigger(project, SubBuild::Update, cause, depth)?;
    }

    match unreleased_parent()? {
      Some(parent) => Err(ReleaseError::UnresolvedAfterRetry {
        module: module.clone(),
        phase: Phase::Parent,
        offenders: vec![parent],
      }),
      None => Ok(()),
    }
  }

  fn dependency_phase(
    &self,
    module: &ModuleCoordinate,
    project: &ProjectHandle,
    cause: &Cause,
    chain: &mut Vec<ModuleCoordinate>,
  ) -> Result<(), ReleaseError> {
    let depth = chain.len();
    let unreleased = || self.graph.unreleased_dependencies(module).map_err(host);

    let pending = unreleased()?;
    if pending.is_empty() {
      return Ok(());
    }
    self.note(depth, format!("{} unreleased dependencies", pending.len()));
    self.trigger(project, SubBuild::Update, cause, depth)?;

    for dependency in unreleased()? {
      if self.already_released(&dependency.coordinate)? {
        self.note(depth, format!("{} is already released", dependency.coordinate));
        continue;
      }
      self.release_module(&dependency.coordinate, cause, chain)?;
    }

    if !unreleased()?.is_empty() {
      self.trigger(project, SubBuild::Update, cause, depth)?;
    }

    let offenders = unreleased()?;
    if offenders.is_empty() {
      Ok(())
    } else {
      Err(ReleaseError::UnresolvedAfterRetry {
        module: module.clone(),
        phase: Phase::Dependencies,
        offenders,
      })
    }
  }

  /// The member building `module` is no longer at a snapshot, either because
  /// an earlier step of this cascade released it or because it was released
  /// before the cascade started. Only the follow-up update can resolve it.
  fn already_released(&self, module: &ModuleCoordinate) -> Result<bool, ReleaseError> {
    if self.graph.member_project_for(module).is_none() {
      return Ok(false);
    }
    Ok(!self.graph.own_version(module).map_err(host)?.is_unreleased())
  }

  /// Schedule an update or release build of `project` and block for its result
  fn trigger(&self, project: &ProjectHandle, kind: SubBuild, cause: &Cause, depth: usize) -> Result<(), ReleaseError> {
    if self.cancel.is_cancelled() {
      return Err(ReleaseError::Cancelled);
    }

    let goal = match kind {
      SubBuild::Update => BuildGoal::Update {
        goals: self.goals.update.clone(),
      },
      SubBuild::Release => BuildGoal::Release {
        goals: self.goals.release.clone(),
      },
    };
    let request = BuildRequest::new(project.clone(), goal, cause.clone()).with_cancel(self.cancel.clone());

    tracing::info!(project = %project, kind = %kind, "triggering sub-build");
    let result = self.scheduler.schedule_and_await(request).map_err(host)?;
    self.note(depth, format!("{} {} #{} {}", kind, project, result.number, result.status));

    if result.is_success() {
      Ok(())
    } else {
      Err(ReleaseError::SubordinateBuildFailed {
        project: project.clone(),
        kind,
        status: result.status,
      })
    }
  }

  fn note(&self, depth: usize, line: String) {
    let indent = "  ".repeat(depth.saturating_sub(1));
    self.log.borrow_mut().push(format!("{}{}", indent, line));
  }
}

fn host(err: crate::core::error::CascadeError) -> ReleaseError {
  ReleaseError::Host(err.to_string())
}
