//! Admission control: may a queued build start now?
//!
//! The queue consults `AdmissionController::can_run` on every scheduling pass.
//! Decisions are read-only against the family counters and depend only on
//! those counters and the item's own role and cause list.
//!
//! # Precedence
//!
//! ```text
//! LAYOUT   blocked by: layout | cascade | member
//! CASCADE  blocked by: layout | cascade | member
//! MEMBER   blocked by: layout
//!                      cascade, unless caused by that family's cascade
//! ```
//!
//! Concurrent member builds of one family are admitted; per-project exclusion
//! belongs to the surrounding build system.

use crate::core::cause::has_cascade_cause;
use crate::core::identity::{Role, short_id};
use crate::lock::FamilyTask;
use crate::lock::family_lock::FamilyLockRegistry;
use std::fmt;
use std::sync::Arc;

/// Why an item may not start yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
  /// A layout build of the family is running (it may be re-materializing members)
  LayoutRunning { family_id: String },
  /// A cascade build of the family is running
  CascadeRunning { family_id: String },
  /// Member builds of the family are running
  MembersRunning { family_id: String, count: usize },
  /// A member build outside the cascade chain must wait for the cascade
  AwaitingCascade { family_id: String },
}

impl fmt::Display for BlockReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BlockReason::LayoutRunning { family_id } => {
        write!(f, "a layout build of family {} is running", short_id(family_id))
      }
      BlockReason::CascadeRunning { family_id } => {
        write!(f, "a cascade build of family {} is running", short_id(family_id))
      }
      BlockReason::MembersRunning { family_id, count } => {
        write!(f, "{} member build(s) of family {} are running", count, short_id(family_id))
      }
      BlockReason::AwaitingCascade { family_id } => write!(
        f,
        "a non-cascade member build must wait for the cascade of family {} to finish",
        short_id(family_id)
      ),
    }
  }
}

/// Admission decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
  Admitted,
  Blocked(BlockReason),
}

impl Admission {
  pub fn is_admitted(&self) -> bool {
    matches!(self, Admission::Admitted)
  }
}

/// Gate combining an item's role and causes with its family's counters
#[derive(Debug, Clone)]
pub struct AdmissionController {
  registry: Arc<FamilyLockRegistry>,
}

impl AdmissionController {
  pub fn new(registry: Arc<FamilyLockRegistry>) -> Self {
    Self { registry }
  }

  /// Decide whether `item` may start now
  pub fn can_run<T: FamilyTask + ?Sized>(&self, item: &T) -> Admission {
    let Some(identity) = item.identity().filter(|i| i.is_valid()) else {
      return Admission::Admitted;
    };

    // Read path: a family with no lock state yet is idle.
    let Some(lock) = self.registry.get(&identity.family_id) else {
      return Admission::Admitted;
    };

    let family_id = identity.family_id.clone();
    let layout = lock.is_active(Role::Layout);
    let cascade = lock.is_active(Role::Cascade);
    let members = lock.active_count(Role::Member);

    let decision = match identity.role {
      Role::Layout | Role::Cascade => {
        if layout {
          Admission::Blocked(BlockReason::LayoutRunning { family_id })
        } else if cascade {
          Admission::Blocked(BlockReason::CascadeRunning { family_id })
        } else if members > 0 {
          Admission::Blocked(BlockReason::MembersRunning {
            family_id,
            count: members,
          })
        } else {
          Admission::Admitted
        }
      }
      Role::Member => {
        if layout {
          Admission::Blocked(BlockReason::LayoutRunning { family_id })
        } else if cascade && !has_cascade_cause(item.causes(), &family_id) {
          Admission::Blocked(BlockReason::AwaitingCascade { family_id })
        } else {
          Admission::Admitted
        }
      }
      Role::Unknown => Admission::Admitted,
    };

    tracing::debug!(
      family = %identity.family_id,
      role = %identity.role,
      admitted = decision.is_admitted(),
      "admission decision"
    );
    decision
  }
}
