//! Application state shared by all handlers: validated quiz settings, the
//! clock used for date generation, and a couple of connection counters.
//!
//! Sessions themselves are not stored here. Each WebSocket connection owns
//! its controller outright and nothing is shared across sessions.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::calendar::{DateGenerator, RandomDates};
use crate::clock::Clock;
use crate::config::{load_config_from_env, QuizSettings};
use crate::controller::SessionController;
use crate::feedback::FeedbackNotifier;

pub struct AppState {
    pub settings: QuizSettings,
    pub clock: Clock,
    live_views: AtomicUsize,
    views_opened: AtomicU64,
}

impl AppState {
    /// Build state from env: load optional TOML config and validate it.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let settings: QuizSettings = load_config_from_env()
            .map(|c| c.quiz)
            .unwrap_or_default()
            .into();
        info!(
            target: "yobi_backend",
            question_count = settings.question_count,
            year_range_radius = settings.year_range_radius,
            tick_interval_ms = settings.tick_interval.as_millis() as u64,
            "Quiz settings"
        );
        Self::with_settings(settings, Clock::System)
    }

    pub fn with_settings(settings: QuizSettings, clock: Clock) -> Self {
        Self {
            settings,
            clock,
            live_views: AtomicUsize::new(0),
            views_opened: AtomicU64::new(0),
        }
    }

    pub fn date_generator(&self) -> DateGenerator {
        DateGenerator::new(self.clock, self.settings.year_range_radius)
    }

    /// Fresh controller (in Loading) with its own random date source.
    pub fn new_controller(&self, notifier: Arc<dyn FeedbackNotifier>) -> SessionController {
        let dates = RandomDates::new(self.date_generator());
        SessionController::new(self.settings, Box::new(dates), notifier)
    }

    /// Counts a connected view until the returned guard is dropped.
    pub fn open_view(self: &Arc<Self>) -> ViewGuard {
        self.live_views.fetch_add(1, Ordering::Relaxed);
        self.views_opened.fetch_add(1, Ordering::Relaxed);
        ViewGuard { state: self.clone() }
    }

    pub fn live_views(&self) -> usize {
        self.live_views.load(Ordering::Relaxed)
    }

    pub fn views_opened(&self) -> u64 {
        self.views_opened.load(Ordering::Relaxed)
    }
}

pub struct ViewGuard {
    state: Arc<AppState>,
}

impl Drop for ViewGuard {
    fn drop(&mut self) {
        self.state.live_views.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_guard_tracks_live_connections() {
        let state = Arc::new(AppState::with_settings(QuizSettings::default(), Clock::System));
        let a = state.open_view();
        let b = state.open_view();
        assert_eq!(state.live_views(), 2);
        drop(a);
        assert_eq!(state.live_views(), 1);
        drop(b);
        assert_eq!(state.live_views(), 0);
        assert_eq!(state.views_opened(), 2);
    }
}
