//! Cascade releases for multi-module project families
//!
//! A family is one user-authored layout project, one cascade project that
//! orchestrates releases, and one member project per module. Releasing a
//! module releases its unreleased parent and dependencies first, recursively,
//! while per-family admission control keeps unrelated builds of the family
//! out of the way.
//!
//! - **core**: configuration, identities, causes, errors
//! - **graph**: version classification and family graph queries
//! - **lock**: per-family counters, admission control, lifecycle hooks
//! - **release**: the recursive resolver and dry-run plans
//! - **host**: on-disk family workspace and the in-process build queue
//! - **commands** / **ui**: the `cascade` CLI

pub mod commands;
pub mod core;
pub mod graph;
pub mod host;
pub mod lock;
pub mod release;
pub mod ui;
