//! Build lifecycle hooks that keep family counters in step with reality
//!
//! The host calls `on_started` when a build actually starts and
//! `on_finalized` exactly once when it ends (success, failure, or abort).
//! This is the only writer of `FamilyLock` counters.

use crate::lock::family_lock::{Delta, FamilyLockRegistry};
use crate::lock::{FamilyTask, RunListener};
use std::sync::Arc;

/// Increments on start, decrements on finalize, ignores builds outside any family
#[derive(Debug, Clone)]
pub struct LifecycleTracker {
  registry: Arc<FamilyLockRegistry>,
}

impl LifecycleTracker {
  pub fn new(registry: Arc<FamilyLockRegistry>) -> Self {
    Self { registry }
  }

  fn apply(&self, build: &dyn FamilyTask, delta: Delta) {
    let Some(identity) = build.identity().filter(|i| i.is_valid()) else {
      return;
    };

    let lock = self.registry.ensure(&identity.family_id);
    match lock.set_active(identity.role, delta) {
      Ok(count) => tracing::debug!(
        family = %identity.family_id,
        role = %identity.role,
        build = %build.label(),
        active = count,
        "family counter updated"
      ),
      Err(err) => tracing::warn!(build = %build.label(), "{}", err),
    }
  }
}

impl RunListener for LifecycleTracker {
  fn on_started(&self, build: &dyn FamilyTask) {
    self.apply(build, Delta::Started);
  }

  fn on_finalized(&self, build: &dyn FamilyTask) {
    self.apply(build, Delta::Finished);
  }
}
