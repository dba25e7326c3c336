//! Wall-clock abstraction so date generation can be pinned in tests.

use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
  #[default]
  System,
  Fixed(DateTime<Utc>),
}

impl Clock {
  /// Clock pinned to the given instant.
  #[must_use]
  pub fn fixed(at: DateTime<Utc>) -> Self {
    Self::Fixed(at)
  }

  #[must_use]
  pub fn now(&self) -> DateTime<Utc> {
    match self {
      Clock::System => Utc::now(),
      Clock::Fixed(t) => *t,
    }
  }

  /// Calendar day of `now()` in UTC.
  #[must_use]
  pub fn today(&self) -> NaiveDate {
    self.now().date_naive()
  }
}
