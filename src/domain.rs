//! Domain models: weekdays, questions and session phases.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{format_date, weekday_of};

/// Day of the week. Index 0 is Sunday; the order is also the order of the
/// answer controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
  Sun,
  Mon,
  Tue,
  Wed,
  Thu,
  Fri,
  Sat,
}

impl Weekday {
  pub const ALL: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
  ];

  /// Maps `0..7` to a weekday; any other value wraps modulo 7.
  pub fn from_index(index: usize) -> Self {
    Self::ALL[index % 7]
  }

  pub fn index(self) -> usize {
    self as usize
  }

  pub fn code(self) -> &'static str {
    ["sun", "mon", "tue", "wed", "thu", "fri", "sat"][self.index()]
  }

  /// Locale label shown on the answer controls.
  pub fn label(self) -> &'static str {
    ["日", "月", "火", "水", "木", "金", "土"][self.index()]
  }
}

impl fmt::Display for Weekday {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown weekday: {0:?}")]
pub struct WeekdayParseError(pub String);

/// Accepts either the code (`"wed"`, case-insensitive) or the label (`"水"`).
impl FromStr for Weekday {
  type Err = WeekdayParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let needle = s.trim();
    Weekday::ALL
      .into_iter()
      .find(|w| w.code().eq_ignore_ascii_case(needle) || w.label() == needle)
      .ok_or_else(|| WeekdayParseError(s.to_string()))
  }
}

/// One quiz question. The correct weekday is always recomputed from the date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Question {
  date: NaiveDate,
}

impl Question {
  pub fn new(date: NaiveDate) -> Self {
    Self { date }
  }

  pub fn date(&self) -> NaiveDate {
    self.date
  }

  pub fn correct_weekday(&self) -> Weekday {
    weekday_of(self.date)
  }

  pub fn formatted_date(&self) -> String {
    format_date(self.date)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  /// Questions not generated yet.
  Loading,
  Active,
  Finished,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Phase::Loading => "loading",
      Phase::Active => "active",
      Phase::Finished => "finished",
    };
    f.write_str(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_codes_and_labels() {
    assert_eq!("wed".parse::<Weekday>(), Ok(Weekday::Wed));
    assert_eq!("Sat".parse::<Weekday>(), Ok(Weekday::Sat));
    assert_eq!("木".parse::<Weekday>(), Ok(Weekday::Thu));
    assert_eq!(" 日 ".parse::<Weekday>(), Ok(Weekday::Sun));
    assert!("funday".parse::<Weekday>().is_err());
  }

  #[test]
  fn index_round_trips_in_fixed_order() {
    for (i, w) in Weekday::ALL.into_iter().enumerate() {
      assert_eq!(w.index(), i);
      assert_eq!(Weekday::from_index(i), w);
    }
    assert_eq!(Weekday::from_index(7), Weekday::Sun);
  }

  #[test]
  fn question_derives_answer_from_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 13).expect("valid date");
    let q = Question::new(date);
    assert_eq!(q.correct_weekday(), Weekday::Wed);
    assert_eq!(q.formatted_date(), "2024/03/13");
  }
}
