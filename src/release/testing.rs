//! In-memory family used by resolver and plan tests
//!
//! Acts as both the manifest source and a synchronous scheduler. Update
//! builds pin unreleased parent/dependency declarations to the target's
//! latest release; release builds strip `-SNAPSHOT` from the module's own
//! version. Every scheduled build is recorded as `"<kind> <artifact>"`.

use crate::core::cause::Cause;
use crate::core::error::{CascadeResult, ProjectError};
use crate::graph::project_graph::{Declaration, Manifest, ManifestSource, ModuleCoordinate, ProjectHandle};
use crate::graph::version::VersionClassifier;
use crate::release::scheduler::{BuildGoal, BuildRequest, BuildResult, BuildScheduler, BuildStatus};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

pub const FAMILY: &str = "fam-test";
pub const GROUP: &str = "org.acme";

struct Module {
  version: String,
  initial_version: String,
  parent: Option<String>,
  dependencies: Vec<String>,
  last_release: Option<String>,
}

#[derive(Default)]
struct State {
  modules: BTreeMap<String, Module>,
  pinned: HashMap<(String, String), String>,
  events: Vec<String>,
  causes: Vec<Cause>,
  failing_release: HashSet<String>,
  failing_update: HashSet<String>,
  frozen: HashSet<String>,
  next_build: u64,
}

impl State {
  fn declared(&self, owner: &str, artifact: &str) -> Declaration {
    let version = self
      .pinned
      .get(&(owner.to_string(), artifact.to_string()))
      .cloned()
      .or_else(|| self.modules.get(artifact).map(|m| m.initial_version.clone()))
      .unwrap_or_else(|| "1-SNAPSHOT".to_string());
    Declaration::new(GROUP, artifact, &version)
  }

  fn update(&mut self, owner: &str) {
    if self.frozen.contains(owner) {
      return;
    }
    let Some(module) = self.modules.get(owner) else {
      return;
    };
    let targets: Vec<String> = module.parent.iter().chain(module.dependencies.iter()).cloned().collect();
    for target in targets {
      let declared = self.declared(owner, &target);
      if !VersionClassifier.is_unreleased(&declared.version) {
        continue;
      }
      if let Some(release) = self.modules.get(&target).and_then(|m| m.last_release.clone()) {
        self.pinned.insert((owner.to_string(), target), release);
      }
    }
  }

  fn release(&mut self, owner: &str) {
    if let Some(module) = self.modules.get_mut(owner) {
      let released = VersionClassifier.release_version(&module.version).to_string();
      module.version = released.clone();
      module.last_release = Some(released);
    }
  }
}

#[derive(Default)]
pub struct FakeFamily {
  state: Mutex<State>,
}

impl FakeFamily {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn module(self, artifact: &str, version: &str, parent: Option<&str>, dependencies: &[&str]) -> Self {
    self.state.lock().unwrap().modules.insert(
      artifact.to_string(),
      Module {
        version: version.to_string(),
        initial_version: version.to_string(),
        parent: parent.map(str::to_string),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        last_release: None,
      },
    );
    self
  }

  pub fn failing_release(self, artifact: &str) -> Self {
    self.state.lock().unwrap().failing_release.insert(artifact.to_string());
    self
  }

  pub fn failing_update(self, artifact: &str) -> Self {
    self.state.lock().unwrap().failing_update.insert(artifact.to_string());
    self
  }

  /// Other modules declare `artifact` at `version` regardless of its own version
  pub fn declared_as(self, artifact: &str, version: &str) -> Self {
    if let Some(module) = self.state.lock().unwrap().modules.get_mut(artifact) {
      module.initial_version = version.to_string();
    }
    self
  }

  /// Updates of `artifact` never change its manifest
  pub fn frozen(self, artifact: &str) -> Self {
    self.state.lock().unwrap().frozen.insert(artifact.to_string());
    self
  }

  pub fn events(&self) -> Vec<String> {
    self.state.lock().unwrap().events.clone()
  }

  pub fn count(&self, event: &str) -> usize {
    self.events().iter().filter(|e| *e == event).count()
  }

  pub fn causes_seen(&self) -> Vec<Cause> {
    self.state.lock().unwrap().causes.clone()
  }
}

impl ManifestSource for FakeFamily {
  fn current_manifest(&self, project: &ProjectHandle) -> CascadeResult<Manifest> {
    let state = self.state.lock().unwrap();
    let name = project.as_str();
    let module = state.modules.get(name).ok_or_else(|| ProjectError::NotFound {
      project: name.to_string(),
    })?;

    Ok(Manifest {
      coordinate: ModuleCoordinate::new(GROUP, name),
      version: module.version.clone(),
      parent: module.parent.as_ref().map(|p| state.declared(name, p)),
      dependencies: module.dependencies.iter().map(|d| state.declared(name, d)).collect(),
    })
  }

  fn resolve_member_project(&self, family_id: &str, module: &ModuleCoordinate) -> Option<ProjectHandle> {
    let state = self.state.lock().unwrap();
    (family_id == FAMILY && module.group == GROUP && state.modules.contains_key(&module.artifact))
      .then(|| ProjectHandle::new(module.artifact.clone()))
  }
}

impl BuildScheduler for FakeFamily {
  fn schedule_and_await(&self, request: BuildRequest) -> CascadeResult<BuildResult> {
    let mut state = self.state.lock().unwrap();
    state.next_build += 1;
    state.causes.extend(request.causes.iter().cloned());
    let name = request.project.as_str().to_string();

    let failed = match &request.goal {
      BuildGoal::Update { .. } => {
        state.events.push(format!("update {}", name));
        let failed = state.failing_update.contains(&name);
        if !failed {
          state.update(&name);
        }
        failed
      }
      BuildGoal::Release { .. } => {
        state.events.push(format!("release {}", name));
        let failed = state.failing_release.contains(&name);
        if !failed {
          state.release(&name);
        }
        failed
      }
      other => panic!("resolver scheduled an unexpected goal: {}", other),
    };

    Ok(BuildResult {
      number: state.next_build,
      status: if failed { BuildStatus::Failure } else { BuildStatus::Success },
      log: Vec::new(),
    })
  }
}
