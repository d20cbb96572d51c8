//! Per-family role counters
//!
//! A `FamilyLock` holds one counter per coordination role: the number of
//! builds of that role currently executing in the family. Counters are
//! mutated only by the lifecycle tracker and read by admission control.
//!
//! # Invariants
//!
//! - Counters never go negative; a decrement at zero is rejected with `LockError::Underflow`.
//! - `ensure` is get-or-create exactly once per family ID, even under racing first access.
//! - Lock state lives as long as its registry (no teardown; key space = families seen).

use crate::core::error::LockError;
use crate::core::identity::Role;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Direction of a counter change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
  /// A build of the role started (+1)
  Started,
  /// A build of the role finished (-1)
  Finished,
}

/// Role counters of one family
#[derive(Debug)]
pub struct FamilyLock {
  family_id: String,
  counters: [AtomicUsize; 3],
}

impl FamilyLock {
  fn new(family_id: String) -> Self {
    Self {
      family_id,
      counters: [AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)],
    }
  }

  pub fn family_id(&self) -> &str {
    &self.family_id
  }

  /// Adjust the counter for `role`, returning the new count.
  ///
  /// `Role::Unknown` has no counter and is ignored (returns 0).
  pub fn set_active(&self, role: Role, delta: Delta) -> Result<usize, LockError> {
    let Some(slot) = role.slot() else {
      return Ok(0);
    };
    let counter = &self.counters[slot];

    match delta {
      Delta::Started => Ok(counter.fetch_add(1, Ordering::AcqRel) + 1),
      Delta::Finished => counter
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        .map(|previous| previous - 1)
        .map_err(|_| LockError::Underflow {
          family: self.family_id.clone(),
          role,
        }),
    }
  }

  /// Number of builds of `role` currently executing
  pub fn active_count(&self, role: Role) -> usize {
    role
      .slot()
      .map(|slot| self.counters[slot].load(Ordering::Acquire))
      .unwrap_or(0)
  }

  /// Counter for `role` is non-zero
  pub fn is_active(&self, role: Role) -> bool {
    self.active_count(role) > 0
  }

  /// Snapshot of all counters, in `Role::COUNTED` order
  pub fn snapshot(&self) -> [usize; 3] {
    Role::COUNTED.map(|role| self.active_count(role))
  }
}

/// Explicitly owned map of family ID -> lock state
///
/// Shared by reference (`Arc`) between admission control and the lifecycle
/// tracker; tests build one per case.
#[derive(Debug, Default)]
pub struct FamilyLockRegistry {
  families: RwLock<HashMap<String, Arc<FamilyLock>>>,
}

impl FamilyLockRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Get or create the lock for `family_id`
  pub fn ensure(&self, family_id: &str) -> Arc<FamilyLock> {
    if let Some(lock) = self.get(family_id) {
      return lock;
    }

    let mut families = self.families.write().unwrap_or_else(|e| e.into_inner());
    families
      .entry(family_id.to_string())
      .or_insert_with(|| Arc::new(FamilyLock::new(family_id.to_string())))
      .clone()
  }

  /// Existing lock for `family_id`, without creating one
  pub fn get(&self, family_id: &str) -> Option<Arc<FamilyLock>> {
    let families = self.families.read().unwrap_or_else(|e| e.into_inner());
    families.get(family_id).cloned()
  }

  /// Number of families seen so far
  pub fn len(&self) -> usize {
    self.families.read().unwrap_or_else(|e| e.into_inner()).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
