//! Release-family graph analysis
//!
//! - **version**: released vs. unreleased (`-SNAPSHOT`) classification
//! - **project_graph**: live queries over the family's current manifests
//! - **family_graph**: petgraph walk of everything a cascade would release
//!
//! We own our domain types and queries; the host only supplies manifests
//! through `ManifestSource`.

pub mod family_graph;
pub mod project_graph;
pub mod version;

pub use family_graph::FamilyGraph;
pub use project_graph::{DependencyDescriptor, ManifestSource, ModuleCoordinate, ProjectGraph, ProjectHandle};
pub use version::{Classification, VersionClassifier};
