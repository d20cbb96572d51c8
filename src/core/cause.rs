//! Build trigger causes
//!
//! A build is queued with one or more causes. Admission control and the
//! release resolver branch on the variant: only `CascadeMember` builds of the
//! matching family are part of a cascade's own recursive release chain.

use crate::core::identity::short_id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a build was triggered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cause {
  /// Started by a person (CLI, UI)
  UserRequested { user: String },
  /// Scheduled by a cascade release of the given family
  CascadeMember { family_id: String },
  /// Scheduled after a layout re-materialized its members
  LayoutGenerated { family_id: String },
  /// Triggered by another project's build
  Upstream { project: String, build: u64 },
  /// Periodic trigger
  Timer,
}

impl Cause {
  /// Cause attached to every build a cascade of `family_id` schedules
  pub fn cascade_member(family_id: impl Into<String>) -> Self {
    Cause::CascadeMember {
      family_id: family_id.into(),
    }
  }

  /// Whether this cause marks a build as part of `family_id`'s cascade
  pub fn is_cascade_member_of(&self, family_id: &str) -> bool {
    matches!(self, Cause::CascadeMember { family_id: f } if f == family_id)
  }
}

/// Whether any cause in the list is the recognized cascade-member cause for `family_id`
pub fn has_cascade_cause(causes: &[Cause], family_id: &str) -> bool {
  causes.iter().any(|c| c.is_cascade_member_of(family_id))
}

impl fmt::Display for Cause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cause::UserRequested { user } => write!(f, "started by {}", user),
      Cause::CascadeMember { family_id } => write!(f, "cascade release of family {}", short_id(family_id)),
      Cause::LayoutGenerated { .. } => write!(f, "layout regenerated members"),
      Cause::Upstream { project, build } => write!(f, "upstream {} #{}", project, build),
      Cause::Timer => write!(f, "timer"),
    }
  }
}
