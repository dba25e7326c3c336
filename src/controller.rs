//! Session controller: owns one `QuizSession`, its tick timer and the feedback
//! notifier, and publishes a snapshot after every transition.
//!
//! One controller per view. Callers drive it through `&mut self`, which keeps
//! transitions serialized; the tick task is the only other party touching the
//! session and goes through the same mutex.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::calendar::DateSource;
use crate::config::QuizSettings;
use crate::domain::{Phase, Weekday};
use crate::feedback::FeedbackNotifier;
use crate::results::{summarize, QuizSummary};
use crate::session::{AnswerOutcome, QuizSession, SessionError, SessionSnapshot};
use crate::timer::TickTimer;

pub struct SessionController {
  id: Uuid,
  settings: QuizSettings,
  session: Arc<Mutex<QuizSession>>,
  updates: Arc<watch::Sender<SessionSnapshot>>,
  timer: TickTimer,
  dates: Box<dyn DateSource>,
  notifier: Arc<dyn FeedbackNotifier>,
}

impl SessionController {
  pub fn new(
    settings: QuizSettings,
    dates: Box<dyn DateSource>,
    notifier: Arc<dyn FeedbackNotifier>,
  ) -> Self {
    let session = QuizSession::new();
    let (updates, _) = watch::channel(session.snapshot());
    Self {
      id: Uuid::new_v4(),
      settings,
      session: Arc::new(Mutex::new(session)),
      updates: Arc::new(updates),
      timer: TickTimer::new(),
      dates,
      notifier,
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  /// Receives a new snapshot after every transition and every tick.
  pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
    self.updates.subscribe()
  }

  pub async fn snapshot(&self) -> SessionSnapshot {
    self.session.lock().await.snapshot()
  }

  pub fn is_ticking(&self) -> bool {
    self.timer.is_running()
  }

  /// Begin (or restart) a session and start the elapsed timer.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn start(&mut self) -> SessionSnapshot {
    self.timer.cancel();
    let (snapshot, attempt) = {
      let mut session = self.session.lock().await;
      session.start(self.dates.as_mut(), self.settings.question_count);
      (session.snapshot(), session.attempt())
    };
    self.updates.send_replace(snapshot.clone());
    info!(target: "quiz", session = %self.id, total = snapshot.total, "Session started");

    self.notifier.notify_start();
    if snapshot.phase == Phase::Active {
      self.start_timer(attempt);
    }
    snapshot
  }

  /// Must be called with the attempt that is about to be timed: a tick from
  /// an aborted task can still reach the lock after a restart.
  fn start_timer(&mut self, attempt: u64) {
    let session = self.session.clone();
    let updates = self.updates.clone();
    self.timer.start(self.settings.tick_interval, move || {
      let session = session.clone();
      let updates = updates.clone();
      async move { tick_attempt(&session, &updates, attempt).await }
    });
  }

  /// Record an answer for the open question. Feedback is fired after the
  /// answer is recorded and never affects the outcome.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn submit_answer(&mut self, weekday: Weekday) -> Result<AnswerOutcome, SessionError> {
    let (outcome, snapshot) = {
      let mut session = self.session.lock().await;
      let outcome = session.submit_answer(weekday).map_err(|e| {
        warn!(target: "quiz", session = %self.id, error = %e, "Answer rejected");
        e
      })?;
      (outcome, session.snapshot())
    };

    if outcome.finished {
      self.timer.cancel();
    }
    self.updates.send_replace(snapshot.clone());

    if outcome.correct {
      self.notifier.notify_correct();
    } else {
      self.notifier.notify_incorrect();
    }

    debug!(
      target: "quiz",
      session = %self.id,
      index = outcome.index,
      answer = weekday.code(),
      expected = outcome.correct_weekday.code(),
      correct = outcome.correct,
      "Answer recorded"
    );
    if outcome.finished {
      info!(target: "quiz", session = %self.id, elapsed_secs = snapshot.elapsed_secs, "Session finished");
    }
    Ok(outcome)
  }

  /// Scored summary, available once the session is finished.
  pub async fn summary(&self) -> Option<QuizSummary> {
    let session = self.session.lock().await;
    session.is_finished().then(|| summarize(&session))
  }

  /// Return to the entry state: stop the timer and drop the attempt.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn reset(&mut self) -> SessionSnapshot {
    self.timer.cancel();
    let snapshot = {
      let mut session = self.session.lock().await;
      session.reset();
      session.snapshot()
    };
    self.updates.send_replace(snapshot.clone());
    debug!(target: "quiz", session = %self.id, "Session reset");
    snapshot
  }

  /// Teardown hook for the owning view. Safe to call more than once.
  pub fn shutdown(&mut self) {
    self.timer.cancel();
    debug!(target: "quiz", session = %self.id, "Session controller shut down");
  }
}

/// One timer tick. Counts only if `attempt` is still the live one; returns
/// false once the timer should stop.
async fn tick_attempt(
  session: &Mutex<QuizSession>,
  updates: &watch::Sender<SessionSnapshot>,
  attempt: u64,
) -> bool {
  let snapshot = {
    let mut session = session.lock().await;
    if session.attempt() != attempt || !session.tick() {
      return false;
    }
    session.snapshot()
  };
  updates.send_replace(snapshot);
  true
}
