//! CLI commands for cascade
//!
//! ## Setup & Inspection
//! - **init**: Mint a new family and write cascade.toml
//! - **status**: Show every member's version and unreleased declarations
//! - **duplicate**: Copy a member project with a regenerated identity
//!
//! ## Releases
//! - **plan**: Predict what a cascade release of a module would release
//! - **release**: Run a cascade release through the local queue
//!
//! Every command except `init` takes `&FamilyContext` to avoid redundant loads.

pub mod duplicate;
pub mod init;
pub mod plan;
pub mod release;
pub mod status;

pub use duplicate::run_duplicate;
pub use init::run_init;
pub use plan::run_plan;
pub use release::run_release;
pub use status::run_status;
