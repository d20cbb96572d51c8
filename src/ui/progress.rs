//! Progress indicators for cascade releases
//!
//! Uses `linya` for allocation-free, concurrency-optimized progress bars.
//! Every build the queue finishes advances the bar by one; the total is the
//! release plan's upper bound, so a cascade that needs fewer updates ends early
//! and is topped up by `finish`.

use crate::lock::{FamilyTask, RunListener};
use linya::{Bar, Progress};
use std::sync::{Mutex, PoisonError};

struct Bars {
  progress: Progress,
  bar: Bar,
  total: usize,
  done: usize,
}

/// Queue listener drawing one bar for a whole cascade
pub struct ReleaseProgress {
  bars: Mutex<Bars>,
}

impl ReleaseProgress {
  /// Create a bar expecting at most `total` builds
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let total = total.max(1);
    let bar = progress.bar(total, label.into());
    Self {
      bars: Mutex::new(Bars {
        progress,
        bar,
        total,
        done: 0,
      }),
    }
  }

  /// Fill the bar once the cascade is over
  pub fn finish(&self) {
    let mut bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
    let Bars { progress, bar, total, done } = &mut *bars;
    *done = *total;
    progress.set_and_draw(bar, *total);
  }
}

impl RunListener for ReleaseProgress {
  fn on_started(&self, _build: &dyn FamilyTask) {}

  fn on_finalized(&self, _build: &dyn FamilyTask) {
    let mut bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
    if bars.done < bars.total {
      bars.done += 1;
      let Bars { progress, bar, .. } = &mut *bars;
      progress.inc_and_draw(bar, 1);
    }
  }
}
