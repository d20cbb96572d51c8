//! Static graph of what a cascade would have to release
//!
//! Walks unreleased parent/dependency edges from a target module and builds a
//! petgraph `DiGraph`. Used for dry-run plans and up-front cycle reports; the
//! resolver itself never needs it.
//!
//! ## Graph Structure
//!
//! - **Nodes**: modules reachable through unreleased declarations
//! - **Edges**: `A → B` means "A declares B (parent or dependency) at a snapshot version"
//! - **Edge order**: edge indices follow declaration order (parent first)

use crate::core::error::CascadeResult;
use crate::graph::project_graph::{ModuleCoordinate, ProjectGraph, ProjectHandle};
use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Why one module needs another released first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
  Parent,
  Dependency,
}

impl fmt::Display for EdgeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EdgeKind::Parent => write!(f, "parent"),
      EdgeKind::Dependency => write!(f, "dependency"),
    }
  }
}

/// A module in the walk
#[derive(Debug, Clone, Serialize)]
pub struct ModuleNode {
  pub module: ModuleCoordinate,
  /// Member project building it; `None` if the family has none
  pub project: Option<ProjectHandle>,
  /// Own manifest version, when the project exists
  pub version: Option<String>,
  pub has_unreleased_parent: bool,
  pub has_unreleased_dependencies: bool,
}

/// Modules reachable from a target through unreleased declarations
pub struct FamilyGraph {
  graph: DiGraph<ModuleNode, EdgeKind>,
  index: HashMap<ModuleCoordinate, NodeIndex>,
  root: NodeIndex,
}

impl FamilyGraph {
  /// Walk the family starting at `target`
  pub fn walk(project_graph: &ProjectGraph<'_>, target: &ModuleCoordinate) -> CascadeResult<Self> {
    let mut graph = DiGraph::new();
    let mut index = HashMap::new();

    let root = Self::add_module(project_graph, &mut graph, &mut index, target)?;
    let mut stack = vec![root];
    let mut expanded = HashSet::new();

    while let Some(node) = stack.pop() {
      if !expanded.insert(node) || graph[node].project.is_none() {
        continue;
      }
      let module = graph[node].module.clone();

      let mut wanted = Vec::new();
      if let Some(parent) = project_graph.parent_of(&module)?.filter(|p| p.is_unreleased()) {
        wanted.push((parent.coordinate, EdgeKind::Parent));
      }
      for dep in project_graph.unreleased_dependencies(&module)? {
        wanted.push((dep.coordinate, EdgeKind::Dependency));
      }

      graph[node].has_unreleased_parent = wanted.iter().any(|(_, k)| *k == EdgeKind::Parent);
      graph[node].has_unreleased_dependencies = wanted.iter().any(|(_, k)| *k == EdgeKind::Dependency);

      for (coordinate, kind) in wanted {
        let child = match index.get(&coordinate) {
          Some(idx) => *idx,
          None => Self::add_module(project_graph, &mut graph, &mut index, &coordinate)?,
        };
        graph.add_edge(node, child, kind);
        stack.push(child);
      }
    }

    Ok(Self { graph, index, root })
  }

  fn add_module(
    project_graph: &ProjectGraph<'_>,
    graph: &mut DiGraph<ModuleNode, EdgeKind>,
    index: &mut HashMap<ModuleCoordinate, NodeIndex>,
    module: &ModuleCoordinate,
  ) -> CascadeResult<NodeIndex> {
    let project = project_graph.member_project_for(module);
    let version = match project {
      Some(_) => Some(project_graph.own_version(module)?.version),
      None => None,
    };

    let idx = graph.add_node(ModuleNode {
      module: module.clone(),
      project,
      version,
      has_unreleased_parent: false,
      has_unreleased_dependencies: false,
    });
    index.insert(module.clone(), idx);
    Ok(idx)
  }

  /// The target's node
  pub fn root(&self) -> &ModuleNode {
    &self.graph[self.root]
  }

  pub fn node(&self, module: &ModuleCoordinate) -> Option<&ModuleNode> {
    self.index.get(module).map(|idx| &self.graph[*idx])
  }

  /// Children of `idx` in declaration order (parent first)
  fn ordered_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
    let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).collect();
    edges.sort_by_key(|e| e.id());
    edges.into_iter().map(|e| e.target()).collect()
  }

  /// Check if the walk found cycles (circular release requirements)
  pub fn has_cycles(&self) -> bool {
    toposort(&self.graph, None).is_err()
  }

  /// Every cycle as a closed chain (`a → b → a`), self-loops included
  pub fn find_cycles(&self) -> Vec<Vec<ModuleCoordinate>> {
    let mut cycles: Vec<Vec<ModuleCoordinate>> = tarjan_scc(&self.graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
      .map(|mut scc| {
        scc.sort_by_key(|idx| self.graph[*idx].module.clone());
        let mut chain: Vec<ModuleCoordinate> = scc.iter().map(|idx| self.graph[*idx].module.clone()).collect();
        chain.push(chain[0].clone());
        chain
      })
      .collect();
    cycles.sort();
    cycles
  }

  /// Modules declared at a snapshot version that no member project builds
  pub fn missing_projects(&self) -> Vec<ModuleCoordinate> {
    let mut missing: Vec<_> = self
      .graph
      .node_weights()
      .filter(|n| n.project.is_none())
      .map(|n| n.module.clone())
      .collect();
    missing.sort();
    missing
  }

  /// Release order the resolver would follow: post-order, parent first, then
  /// dependencies in declaration order, each module once. Callers check
  /// `find_cycles` first; on a cyclic walk this order is not meaningful.
  pub fn release_order(&self) -> Vec<&ModuleNode> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(self.root, false)];

    while let Some((idx, children_done)) = stack.pop() {
      if children_done {
        order.push(&self.graph[idx]);
        continue;
      }
      if !visited.insert(idx) {
        continue;
      }
      stack.push((idx, true));
      for child in self.ordered_children(idx).into_iter().rev() {
        if !visited.contains(&child) {
          stack.push((child, false));
        }
      }
    }

    order
  }

  /// Get number of modules in the walk
  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }
}
