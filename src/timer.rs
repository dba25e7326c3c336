//! Owned handle for the recurring one-second tick.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Runs `on_tick` every `period` on a spawned task until `on_tick` returns
/// false or the handle is cancelled. Dropping the handle cancels it.
#[derive(Default)]
pub struct TickTimer {
  task: Option<JoinHandle<()>>,
}

impl TickTimer {
  pub fn new() -> Self {
    Self { task: None }
  }

  /// Replaces any running tick task.
  pub fn start<F, Fut>(&mut self, period: Duration, mut on_tick: F)
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
  {
    self.cancel();
    let task = tokio::spawn(async move {
      let mut ticker = interval_at(Instant::now() + period, period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        if !on_tick().await {
          break;
        }
      }
    });
    self.task = Some(task);
  }

  /// Idempotent.
  pub fn cancel(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }

  pub fn is_running(&self) -> bool {
    self.task.as_ref().is_some_and(|t| !t.is_finished())
  }
}

impl Drop for TickTimer {
  fn drop(&mut self) {
    self.cancel();
  }
}
