//! Feedback cues (the sounds the front end plays) and the notifier capability
//! the session controller uses to trigger them.
//!
//! Notifiers are fire-and-forget: they return nothing and must not block, so a
//! missing or broken playback path can never stall a state transition.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Start,
    Correct,
    Incorrect,
}

pub trait FeedbackNotifier: Send + Sync {
    fn notify_correct(&self);
    fn notify_incorrect(&self);
    /// Entry cue when a session begins. Optional.
    fn notify_start(&self) {}
}

/// Forwards cues to the connection task over a bounded channel. Cues that do
/// not fit (full buffer, closed receiver) are dropped.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Cue>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Cue>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    fn emit(&self, cue: Cue) {
        if let Err(e) = self.tx.try_send(cue) {
            debug!(target: "quiz", ?cue, error = %e, "Cue dropped");
        }
    }
}

impl FeedbackNotifier for ChannelNotifier {
    fn notify_correct(&self) {
        self.emit(Cue::Correct);
    }

    fn notify_incorrect(&self) {
        self.emit(Cue::Incorrect);
    }

    fn notify_start(&self) {
        self.emit(Cue::Start);
    }
}

/// Records cues in memory; used to assert on feedback in tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNotifier {
    cues: std::sync::Mutex<Vec<Cue>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, cue: Cue) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

#[cfg(test)]
impl FeedbackNotifier for RecordingNotifier {
    fn notify_correct(&self) {
        self.push(Cue::Correct);
    }

    fn notify_incorrect(&self) {
        self.push(Cue::Incorrect);
    }

    fn notify_start(&self) {
        self.push(Cue::Start);
    }
}
