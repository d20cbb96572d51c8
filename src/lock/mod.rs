//! Per-family mutual exclusion
//!
//! - **family_lock**: role counters per family and the registry that owns them
//! - **admission**: read-only gate deciding whether a queued item may start
//! - **lifecycle**: start/finish hooks, the sole writer of the counters
//!
//! Both admission control and the lifecycle tracker see builds through the
//! `FamilyTask` trait, so any host's queue item can be plugged in.

pub mod admission;
pub mod family_lock;
pub mod lifecycle;

pub use admission::{Admission, AdmissionController, BlockReason};
pub use family_lock::{Delta, FamilyLock, FamilyLockRegistry};
pub use lifecycle::LifecycleTracker;

use crate::core::cause::Cause;
use crate::core::identity::ProjectIdentity;

/// A queued or running build as seen by the family lock subsystem
pub trait FamilyTask {
  /// Identity of the project being built, if it belongs to a family
  fn identity(&self) -> Option<&ProjectIdentity>;

  /// Causes the build was triggered with
  fn causes(&self) -> &[Cause];

  /// Short name for logs
  fn label(&self) -> String {
    "build".to_string()
  }
}

/// Host callbacks around every build's execution
pub trait RunListener: Send + Sync {
  /// The build actually started executing
  fn on_started(&self, build: &dyn FamilyTask);

  /// The build ended; fires exactly once regardless of outcome
  fn on_finalized(&self, build: &dyn FamilyTask);
}
