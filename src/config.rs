//! Loading quiz configuration from TOML.
//!
//! The file is optional. Expected shape:
//!
//! ```toml
//! [quiz]
//! question_count = 5
//! year_range_radius = 100
//! tick_interval_ms = 1000
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const DEFAULT_YEAR_RANGE_RADIUS: u32 = 100;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
/// Largest accepted radius. Keeps the date window well inside chrono's range.
pub const MAX_YEAR_RANGE_RADIUS: u32 = 10_000;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub quiz: QuizConfig,
}

/// Raw `[quiz]` table; every field falls back to its default when missing.
#[derive(Clone, Debug, Deserialize)]
pub struct QuizConfig {
  #[serde(default = "default_question_count")]
  pub question_count: usize,
  #[serde(default = "default_year_range_radius")]
  pub year_range_radius: u32,
  #[serde(default = "default_tick_interval_ms")]
  pub tick_interval_ms: u64,
}

fn default_question_count() -> usize { DEFAULT_QUESTION_COUNT }
fn default_year_range_radius() -> u32 { DEFAULT_YEAR_RANGE_RADIUS }
fn default_tick_interval_ms() -> u64 { DEFAULT_TICK_INTERVAL_MS }

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      question_count: DEFAULT_QUESTION_COUNT,
      year_range_radius: DEFAULT_YEAR_RANGE_RADIUS,
      tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
    }
  }
}

/// Validated settings handed to each session controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSettings {
  pub question_count: usize,
  pub year_range_radius: u32,
  pub tick_interval: Duration,
}

impl Default for QuizSettings {
  fn default() -> Self {
    QuizConfig::default().into()
  }
}

/// Zero values are not meaningful for any field, and a radius above
/// `MAX_YEAR_RANGE_RADIUS` is out of range; both are replaced by the default
/// and logged.
impl From<QuizConfig> for QuizSettings {
  fn from(cfg: QuizConfig) -> Self {
    let question_count = if cfg.question_count == 0 {
      warn!(target: "yobi_backend", "question_count = 0 is invalid; using {DEFAULT_QUESTION_COUNT}");
      DEFAULT_QUESTION_COUNT
    } else {
      cfg.question_count
    };
    let year_range_radius = match cfg.year_range_radius {
      0 => {
        warn!(target: "yobi_backend", "year_range_radius = 0 is invalid; using {DEFAULT_YEAR_RANGE_RADIUS}");
        DEFAULT_YEAR_RANGE_RADIUS
      }
      r if r > MAX_YEAR_RANGE_RADIUS => {
        warn!(
          target: "yobi_backend",
          "year_range_radius = {r} exceeds {MAX_YEAR_RANGE_RADIUS}; using {DEFAULT_YEAR_RANGE_RADIUS}"
        );
        DEFAULT_YEAR_RANGE_RADIUS
      }
      r => r,
    };
    let tick_interval_ms = if cfg.tick_interval_ms == 0 {
      warn!(target: "yobi_backend", "tick_interval_ms = 0 is invalid; using {DEFAULT_TICK_INTERVAL_MS}");
      DEFAULT_TICK_INTERVAL_MS
    } else {
      cfg.tick_interval_ms
    };
    Self {
      question_count,
      year_range_radius,
      tick_interval: Duration::from_millis(tick_interval_ms),
    }
  }
}

pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "yobi_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "yobi_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "yobi_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse_config("").expect("empty toml");
    let settings = QuizSettings::from(cfg.quiz);
    assert_eq!(settings, QuizSettings::default());
    assert_eq!(settings.question_count, 5);
    assert_eq!(settings.year_range_radius, 100);
    assert_eq!(settings.tick_interval, Duration::from_secs(1));
  }

  #[test]
  fn partial_table_keeps_other_defaults() {
    let cfg = parse_config("[quiz]\nyear_range_radius = 20\n").expect("toml");
    let settings = QuizSettings::from(cfg.quiz);
    assert_eq!(settings.year_range_radius, 20);
    assert_eq!(settings.question_count, 5);
  }

  #[test]
  fn zero_values_fall_back() {
    let cfg = parse_config("[quiz]\nquestion_count = 0\ntick_interval_ms = 0\n").expect("toml");
    let settings = QuizSettings::from(cfg.quiz);
    assert_eq!(settings.question_count, DEFAULT_QUESTION_COUNT);
    assert_eq!(settings.tick_interval, Duration::from_millis(DEFAULT_TICK_INTERVAL_MS));
  }

  #[test]
  fn oversized_radius_falls_back() {
    let cfg = parse_config("[quiz]\nyear_range_radius = 4000000000\n").expect("toml");
    assert_eq!(QuizSettings::from(cfg.quiz).year_range_radius, DEFAULT_YEAR_RANGE_RADIUS);

    let cfg = parse_config("[quiz]\nyear_range_radius = 10000\n").expect("toml");
    assert_eq!(QuizSettings::from(cfg.quiz).year_range_radius, MAX_YEAR_RANGE_RADIUS);
  }

  #[test]
  fn rejects_wrong_types() {
    assert!(parse_config("[quiz]\nquestion_count = \"five\"\n").is_err());
  }
}
