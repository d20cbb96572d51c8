//! Core building blocks shared by every cascade operation
//!
//! - **config**: Family configuration (cascade.toml) parsing and validation
//! - **context**: Family context built once per CLI invocation
//! - **error**: Error types with contextual help messages and exit codes
//! - **identity**: Roles, project identities and ID generation
//! - **cause**: Why a build was triggered

pub mod cause;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
