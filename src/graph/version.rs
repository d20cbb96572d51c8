//! Released vs. unreleased (snapshot) version classification
//!
//! The only criterion the resolver uses to decide whether a module needs work.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal suffix marking an unreleased version (case-sensitive)
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Classification of a declared version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
  Released,
  Unreleased,
}

impl fmt::Display for Classification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Classification::Released => write!(f, "released"),
      Classification::Unreleased => write!(f, "snapshot"),
    }
  }
}

/// Pure version predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionClassifier;

impl VersionClassifier {
  /// A version is unreleased iff it ends with `-SNAPSHOT`.
  ///
  /// An empty version is treated as released so a missing version never
  /// makes the resolver loop on work it cannot do.
  pub fn is_unreleased(&self, version: &str) -> bool {
    !version.is_empty() && version.ends_with(SNAPSHOT_SUFFIX)
  }

  pub fn classify(&self, version: &str) -> Classification {
    if self.is_unreleased(version) {
      Classification::Unreleased
    } else {
      Classification::Released
    }
  }

  /// Version a snapshot becomes once released (`1.2-SNAPSHOT` -> `1.2`)
  pub fn release_version<'a>(&self, version: &'a str) -> &'a str {
    version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version)
  }
}
