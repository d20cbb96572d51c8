//! Scheduler seam between the resolver and the build host
//!
//! The resolver's only way to cause side effects is `schedule_and_await`: queue a
//! build and block the calling thread until it reaches a terminal state.
//! Hosts may implement it with threads, futures, or a remote queue; the
//! contract to the resolver is a plain blocking call.

use crate::core::cause::Cause;
use crate::core::error::CascadeResult;
use crate::graph::project_graph::{ModuleCoordinate, ProjectHandle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a scheduled build should do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildGoal {
  /// Top-level cascade build: release `target` and everything it needs
  Cascade { target: ModuleCoordinate },
  /// Member build running the release resolver for `target`
  ReleaseModule { target: ModuleCoordinate },
  /// Substitute latest released parent/dependency versions and commit
  Update { goals: Vec<String> },
  /// Release build proper
  Release { goals: Vec<String> },
}

impl fmt::Display for BuildGoal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildGoal::Cascade { target } => write!(f, "cascade {}", target),
      BuildGoal::ReleaseModule { target } => write!(f, "release-module {}", target),
      BuildGoal::Update { goals } => write!(f, "update [{}]", goals.join(" ")),
      BuildGoal::Release { goals } => write!(f, "release [{}]", goals.join(" ")),
    }
  }
}

/// Terminal state of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
  Success,
  Failure,
  Aborted,
}

impl fmt::Display for BuildStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildStatus::Success => write!(f, "SUCCESS"),
      BuildStatus::Failure => write!(f, "FAILURE"),
      BuildStatus::Aborted => write!(f, "ABORTED"),
    }
  }
}

/// Shared cancellation flag, cloned into every subordinate request
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::Release);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

/// A build to queue
#[derive(Debug, Clone)]
pub struct BuildRequest {
  pub project: ProjectHandle,
  pub goal: BuildGoal,
  pub causes: Vec<Cause>,
  pub cancel: CancelToken,
}

impl BuildRequest {
  pub fn new(project: ProjectHandle, goal: BuildGoal, cause: Cause) -> Self {
    Self {
      project,
      goal,
      causes: vec![cause],
      cancel: CancelToken::new(),
    }
  }

  /// Propagate a parent build's cancellation into this request
  pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }
}

/// Terminal result of a scheduled build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
  pub number: u64,
  pub status: BuildStatus,
  pub log: Vec<String>,
}

impl BuildResult {
  pub fn is_success(&self) -> bool {
    self.status == BuildStatus::Success
  }
}

/// "Schedule a build and block for its terminal result"
pub trait BuildScheduler: Send + Sync {
  fn schedule_and_await(&self, request: BuildRequest) -> CascadeResult<BuildResult>;
}
