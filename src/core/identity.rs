//! Project identities within a release family
//!
//! Every project that takes part in a cascade carries a `ProjectIdentity`:
//! its coordination role, the family it belongs to, and a per-instance
//! project ID. The family ID is minted once when a layout is created and
//! propagated unchanged to the cascade and member projects generated from it.
//!
//! # Invariants
//!
//! 1. An identity is valid iff role, family ID and project ID are all present.
//! 2. Invalid identities are outside the family system; every core component ignores them.
//! 3. A duplicated project never keeps its source's project ID (`regenerated`).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Coordination role of a project inside its family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// User-authored multi-module definition
  Layout,
  /// Orchestration project running the recursive release
  Cascade,
  /// Per-module project generated from the layout
  Member,
  /// Absent or unparseable role
  #[default]
  Unknown,
}

impl Role {
  /// The closed set of roles that own a lock counter
  pub const COUNTED: [Role; 3] = [Role::Layout, Role::Cascade, Role::Member];

  /// Slot of this role in a fixed-size counter array
  pub fn slot(self) -> Option<usize> {
    match self {
      Role::Layout => Some(0),
      Role::Cascade => Some(1),
      Role::Member => Some(2),
      Role::Unknown => None,
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::Layout => write!(f, "layout"),
      Role::Cascade => write!(f, "cascade"),
      Role::Member => write!(f, "member"),
      Role::Unknown => write!(f, "unknown"),
    }
  }
}

/// Identity of a project's place in a release family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ProjectIdentity {
  #[serde(default)]
  pub role: Role,
  #[serde(default, rename = "family")]
  pub family_id: String,
  #[serde(default, rename = "project")]
  pub project_id: String,
}

impl ProjectIdentity {
  /// Build an identity from its parts
  pub fn new(role: Role, family_id: impl Into<String>, project_id: impl Into<String>) -> Self {
    Self {
      role,
      family_id: family_id.into(),
      project_id: project_id.into(),
    }
  }

  /// Mint a new family: fresh family ID and fresh layout project ID
  pub fn for_layout() -> Self {
    Self::new(Role::Layout, generate_id("family"), generate_id("project"))
  }

  /// Identity for a project generated from this one (same family, new project ID)
  pub fn derive(&self, role: Role) -> Self {
    Self::new(role, self.family_id.clone(), generate_id("project"))
  }

  /// Copy of this identity with a fresh project ID, used when a project is duplicated
  pub fn regenerated(&self) -> Self {
    self.derive(self.role)
  }

  /// All three fields present
  pub fn is_valid(&self) -> bool {
    self.role != Role::Unknown && !self.family_id.is_empty() && !self.project_id.is_empty()
  }
}

impl fmt::Display for ProjectIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}/{}", self.role, short_id(&self.family_id), short_id(&self.project_id))
  }
}

/// First 12 characters of an ID, for display
pub fn short_id(id: &str) -> &str {
  id.char_indices().nth(12).map_or(id, |(end, _)| &id[..end])
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique hex ID (SHA-256 of seed, wall clock and a process counter)
pub fn generate_id(seed: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(seed.as_bytes());
  hasher.update(chrono::Utc::now().to_rfc3339().as_bytes());
  hasher.update(std::process::id().to_le_bytes());
  hasher.update(ID_COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
  format!("{:x}", hasher.finalize())
}
