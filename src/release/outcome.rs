//! Release outcomes and the failure taxonomy of the resolver

use crate::graph::project_graph::{DependencyDescriptor, ModuleCoordinate, ProjectHandle};
use crate::release::scheduler::BuildStatus;
use serde::Serialize;
use std::fmt;

/// Which phase of the fixed update protocol failed to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Parent,
  Dependencies,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Parent => write!(f, "parent"),
      Phase::Dependencies => write!(f, "dependencies"),
    }
  }
}

/// Kind of subordinate build the resolver triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubBuild {
  Update,
  Release,
}

impl fmt::Display for SubBuild {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SubBuild::Update => write!(f, "update"),
      SubBuild::Release => write!(f, "release"),
    }
  }
}

/// Fatal conditions of a release call; any one aborts the whole cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
  /// Module does not resolve to a member project of the family
  ProjectNotFound { module: ModuleCoordinate },

  /// Release requested for a module whose own version is already released
  AlreadyReleased { module: ModuleCoordinate, version: String },

  /// An update or release sub-build ended without success
  SubordinateBuildFailed {
    project: ProjectHandle,
    kind: SubBuild,
    status: BuildStatus,
  },

  /// Parent or dependencies still unreleased after update, recurse, update
  UnresolvedAfterRetry {
    module: ModuleCoordinate,
    phase: Phase,
    offenders: Vec<DependencyDescriptor>,
  },

  /// Module revisited while already being released higher in the call chain
  CycleDetected { chain: Vec<ModuleCoordinate> },

  /// Cancelled before the next subordinate build
  Cancelled,

  /// Manifest or scheduler collaborator failed
  Host(String),
}

impl ReleaseError {
  pub(crate) fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::AlreadyReleased { .. } => {
        Some("Bump the module to the next -SNAPSHOT version before releasing it again.".to_string())
      }
      ReleaseError::CycleDetected { .. } => {
        Some("Break the cycle between these modules; `cascade plan` shows the release order.".to_string())
      }
      ReleaseError::UnresolvedAfterRetry { .. } => {
        Some("Check that each offender has a released version the update goals can pick up.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::ProjectNotFound { module } => {
        write!(f, "no member project builds module {}", module)
      }
      ReleaseError::AlreadyReleased { module, version } => {
        write!(f, "module {} is already released at {}", module, version)
      }
      ReleaseError::SubordinateBuildFailed { project, kind, status } => {
        write!(f, "{} build of {} ended with {}", kind, project, status)
      }
      ReleaseError::UnresolvedAfterRetry {
        module,
        phase,
        offenders,
      } => {
        let list: Vec<String> = offenders.iter().map(|d| d.to_string()).collect();
        match phase {
          Phase::Parent => write!(f, "cannot release parent of {}: {}", module, list.join(", ")),
          Phase::Dependencies => write!(
            f,
            "dependencies of {} are still unreleased: {}",
            module,
            list.join(", ")
          ),
        }
      }
      ReleaseError::CycleDetected { chain } => {
        let names: Vec<String> = chain.iter().map(|m| m.to_string()).collect();
        write!(f, "cycle detected: {}", names.join(" → "))
      }
      ReleaseError::Cancelled => write!(f, "release cancelled"),
      ReleaseError::Host(message) => write!(f, "{}", message),
    }
  }
}

/// Result of attempting to release one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
  Success,
  Failure(ReleaseError),
  /// Not triggered by a recognized cascade-member cause (a guard, not an error)
  NotApplicable(String),
}

impl ReleaseOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, ReleaseOutcome::Success)
  }

  /// Human-readable line for a build log
  pub fn summary(&self) -> String {
    match self {
      ReleaseOutcome::Success => "release succeeded".to_string(),
      ReleaseOutcome::Failure(err) => format!("release failed: {}", err),
      ReleaseOutcome::NotApplicable(reason) => format!("release not applicable: {}", reason),
    }
  }
}

impl From<Result<(), ReleaseError>> for ReleaseOutcome {
  fn from(result: Result<(), ReleaseError>) -> Self {
    match result {
      Ok(()) => ReleaseOutcome::Success,
      Err(err) => ReleaseOutcome::Failure(err),
    }
  }
}
