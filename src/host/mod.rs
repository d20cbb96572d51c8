//! Reference build host: a family on disk and an in-process queue
//!
//! - **manifest**: `project.toml` reading and format-preserving edits
//! - **workspace**: `FamilyWorkspace`, the manifest source and identity lookup
//! - **executor**: what update, release, release-module and cascade builds do
//! - **queue**: `LocalQueue`, the admission-gated `BuildScheduler`

pub mod executor;
pub mod manifest;
pub mod queue;
pub mod workspace;

pub use executor::{BuildExecutor, Execution, ExecutionContext, WorkspaceExecutor};
pub use manifest::{ManifestDocument, ProjectManifest};
pub use queue::{BuildRecord, IdentityLookup, LocalQueue};
pub use workspace::{FamilyWorkspace, MemberProject};
