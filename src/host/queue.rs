//! In-process build queue with family admission control
//!
//! `schedule_and_await` runs the whole life of one build on the caller's
//! thread:
//!
//! ```text
//! enqueue ─▶ wait until admitted ─▶ on_started ─▶ execute ─▶ on_finalized ─▶ record
//!              (Condvar, re-checked                           (drop guard)
//!               whenever a build ends)
//! ```
//!
//! The admission check and `on_started` happen under the queue mutex, so two
//! waiters can never both be admitted against the same idle family.
//! `on_finalized` runs from a guard and fires even if the executor panics.

use crate::core::cause::Cause;
use crate::core::error::CascadeResult;
use crate::core::identity::ProjectIdentity;
use crate::graph::project_graph::ProjectHandle;
use crate::host::executor::{BuildExecutor, ExecutionContext};
use crate::host::workspace::FamilyWorkspace;
use crate::lock::{Admission, AdmissionController, FamilyLockRegistry, FamilyTask, LifecycleTracker, RunListener};
use crate::release::scheduler::{BuildGoal, BuildRequest, BuildResult, BuildScheduler, BuildStatus, CancelToken};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// How often a blocked waiter re-checks its cancel token
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Maps a project to its family identity
pub trait IdentityLookup: Send + Sync {
  fn identity_for(&self, project: &ProjectHandle) -> Option<ProjectIdentity>;
}

impl IdentityLookup for FamilyWorkspace {
  fn identity_for(&self, project: &ProjectHandle) -> Option<ProjectIdentity> {
    self.identity_of(project.as_str())
  }
}

/// A build waiting in or running on the queue
#[derive(Debug)]
pub struct QueueItem {
  pub number: u64,
  pub project: ProjectHandle,
  pub identity: Option<ProjectIdentity>,
  pub goal: BuildGoal,
  pub causes: Vec<Cause>,
  pub cancel: CancelToken,
  pub queued_at: DateTime<Utc>,
}

impl FamilyTask for QueueItem {
  fn identity(&self) -> Option<&ProjectIdentity> {
    self.identity.as_ref()
  }

  fn causes(&self) -> &[Cause] {
    &self.causes
  }

  fn label(&self) -> String {
    format!("#{} {} ({})", self.number, self.project, self.goal)
  }
}

/// A finished build
#[derive(Debug, Clone, Serialize)]
pub struct BuildRecord {
  pub number: u64,
  pub project: ProjectHandle,
  pub goal: BuildGoal,
  pub causes: Vec<Cause>,
  pub status: BuildStatus,
  pub queued_at: DateTime<Utc>,
  pub started_at: Option<DateTime<Utc>>,
  pub finished_at: DateTime<Utc>,
  pub log: Vec<String>,
}

#[derive(Default)]
struct QueueState {
  next_number: u64,
  waiting: usize,
  history: Vec<BuildRecord>,
}

/// Blocking, admission-gated scheduler for one process
pub struct LocalQueue {
  state: Mutex<QueueState>,
  changed: Condvar,
  registry: Arc<FamilyLockRegistry>,
  admission: AdmissionController,
  listeners: Vec<Arc<dyn RunListener>>,
  executor: Arc<dyn BuildExecutor>,
  identities: Arc<dyn IdentityLookup>,
  admission_timeout: Option<Duration>,
}

impl LocalQueue {
  /// Queue with the family lifecycle tracker installed as its first listener
  pub fn new(executor: Arc<dyn BuildExecutor>, identities: Arc<dyn IdentityLookup>) -> Self {
    let registry = Arc::new(FamilyLockRegistry::new());
    Self {
      state: Mutex::new(QueueState::default()),
      changed: Condvar::new(),
      admission: AdmissionController::new(registry.clone()),
      listeners: vec![Arc::new(LifecycleTracker::new(registry.clone()))],
      registry,
      executor,
      identities,
      admission_timeout: None,
    }
  }

  /// Also notify `listener` around every build
  pub fn with_listener(mut self, listener: Arc<dyn RunListener>) -> Self {
    self.listeners.push(listener);
    self
  }

  /// Abort items that stay blocked longer than `timeout`
  pub fn with_admission_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.admission_timeout = timeout;
    self
  }

  /// Family counters this queue maintains
  pub fn registry(&self) -> &Arc<FamilyLockRegistry> {
    &self.registry
  }

  /// Finished builds ordered by build number
  pub fn history(&self) -> Vec<BuildRecord> {
    let mut history = self.lock_state().history.clone();
    history.sort_by_key(|r| r.number);
    history
  }

  /// Items currently blocked on admission
  pub fn waiting(&self) -> usize {
    self.lock_state().waiting
  }

  fn lock_state(&self) -> MutexGuard<'_, QueueState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Block until `item` is admitted and started, or give up.
  /// Returns the log lines written while waiting and whether the item started.
  fn admit(&self, item: &QueueItem) -> (Vec<String>, bool) {
    let deadline = self.admission_timeout.map(|t| Instant::now() + t);
    let mut log = Vec::new();
    let mut last_reason = None;
    let mut state = self.lock_state();
    state.waiting += 1;

    let started = loop {
      if item.cancel.is_cancelled() {
        log.push("cancelled while waiting for admission".to_string());
        break false;
      }

      match self.admission.can_run(item) {
        Admission::Admitted => {
          for listener in &self.listeners {
            listener.on_started(item);
          }
          break true;
        }
        Admission::Blocked(reason) => {
          let text = reason.to_string();
          if last_reason.as_ref() != Some(&text) {
            tracing::debug!(build = %item.label(), "{}", text);
            log.push(format!("waiting: {}", text));
            last_reason = Some(text);
          }
        }
      }

      let wait = match deadline {
        Some(deadline) => {
          let now = Instant::now();
          if now >= deadline {
            log.push("gave up waiting for admission".to_string());
            break false;
          }
          (deadline - now).min(CANCEL_POLL)
        }
        None => CANCEL_POLL,
      };
      state = self
        .changed
        .wait_timeout(state, wait)
        .unwrap_or_else(PoisonError::into_inner)
        .0;
    };

    state.waiting -= 1;
    (log, started)
  }

  fn record(
    &self,
    item: QueueItem,
    status: BuildStatus,
    started_at: Option<DateTime<Utc>>,
    log: Vec<String>,
  ) -> BuildResult {
    let record = BuildRecord {
      number: item.number,
      project: item.project,
      goal: item.goal,
      causes: item.causes,
      status,
      queued_at: item.queued_at,
      started_at,
      finished_at: Utc::now(),
      log: log.clone(),
    };
    self.lock_state().history.push(record);
    BuildResult {
      number: item.number,
      status,
      log,
    }
  }
}

/// Fires `on_finalized` and wakes waiters when the running build ends
struct Running<'q> {
  queue: &'q LocalQueue,
  item: &'q QueueItem,
}

impl Drop for Running<'_> {
  fn drop(&mut self) {
    for listener in &self.queue.listeners {
      listener.on_finalized(self.item);
    }
    let _state = self.queue.lock_state();
    self.queue.changed.notify_all();
  }
}

impl BuildScheduler for LocalQueue {
  fn schedule_and_await(&self, request: BuildRequest) -> CascadeResult<BuildResult> {
    let item = {
      let mut state = self.lock_state();
      state.next_number += 1;
      QueueItem {
        number: state.next_number,
        identity: self.identities.identity_for(&request.project),
        project: request.project,
        goal: request.goal,
        causes: request.causes,
        cancel: request.cancel,
        queued_at: Utc::now(),
      }
    };
    tracing::debug!(build = %item.label(), "queued");

    let (mut log, started) = self.admit(&item);
    if !started {
      tracing::info!(build = %item.label(), "aborted before start");
      return Ok(self.record(item, BuildStatus::Aborted, None, log));
    }

    let started_at = Utc::now();
    tracing::info!(build = %item.label(), "started");
    let execution = {
      let _running = Running { queue: self, item: &item };
      let ctx = ExecutionContext {
        project: &item.project,
        causes: &item.causes,
        cancel: &item.cancel,
        scheduler: self,
      };
      self.executor.execute(&item.goal, &ctx)
    };
    tracing::info!(build = %item.label(), status = %execution.status, "finished");

    log.extend(execution.log);
    Ok(self.record(item, execution.status, Some(started_at), log))
  }
}
