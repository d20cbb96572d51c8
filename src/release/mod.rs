//! Cascade release resolution
//!
//! # Core Invariants
//!
//! 1. **Parents before children, dependencies before dependents**
//!    - The parent phase finishes before the dependency phase begins
//!    - Dependencies are released serially, in declaration order
//!
//! 2. **Fail fast, never roll back**
//!    - The first failed sub-build ends the whole cascade
//!    - Already-released subordinates stay released
//!
//! 3. **Every sub-build is a cascade member**
//!    - Update and release builds carry the family's `CascadeMember` cause,
//!      which is what lets admission control run them while the cascade holds
//!      the family
//!
//! # Architecture
//!
//! - **resolver**: the recursive algorithm (`ReleaseResolver::release`)
//! - **scheduler**: the blocking "schedule and await" seam to the build host
//! - **outcome**: `ReleaseOutcome` and the `ReleaseError` taxonomy
//! - **plan**: dry-run prediction of the release order

pub mod outcome;
pub mod plan;
pub mod resolver;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use outcome::{ReleaseError, ReleaseOutcome};
pub use plan::ReleasePlan;
pub use resolver::ReleaseResolver;
pub use scheduler::{BuildGoal, BuildRequest, BuildResult, BuildScheduler, BuildStatus, CancelToken};
