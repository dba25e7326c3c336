//! Calendar arithmetic: weekday resolution, date formatting/parsing and the
//! random date generator used to build questions.
//!
//! Weekdays are resolved from the signed day offset to 1970-01-01 (a Thursday),
//! so dates before the epoch go through the same path as dates after it.

use chrono::{DateTime, NaiveDate, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use crate::clock::Clock;
use crate::domain::Weekday;

const EPOCH_WEEKDAY_INDEX: i64 = 4;
const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
/// Interval width uses an average year; calendar-year boundaries are not exact.
const DAYS_PER_YEAR: f64 = 365.25;

fn epoch() -> NaiveDate {
  NaiveDate::default()
}

pub fn weekday_of(date: NaiveDate) -> Weekday {
  let offset = date.signed_duration_since(epoch()).num_days();
  let index = (offset + EPOCH_WEEKDAY_INDEX).rem_euclid(7);
  Weekday::from_index(index as usize)
}

/// `YYYY/MM/DD`, zero-padded.
pub fn format_date(date: NaiveDate) -> String {
  date.format("%Y/%m/%d").to_string()
}

#[derive(Debug, Error)]
#[error("invalid date {input:?}: expected YYYY/MM/DD or YYYY-MM-DD")]
pub struct DateParseError {
  pub input: String,
  #[source]
  pub source: chrono::ParseError,
}

pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
  let s = input.trim();
  NaiveDate::parse_from_str(s, "%Y/%m/%d")
    .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
    .map_err(|source| DateParseError { input: input.to_string(), source })
}

/// Uniform dates within `[now - radius years, now + radius years]`.
#[derive(Debug, Clone, Copy)]
pub struct DateGenerator {
  clock: Clock,
  radius_years: u32,
}

impl DateGenerator {
  pub fn new(clock: Clock, radius_years: u32) -> Self {
    Self { clock, radius_years }
  }

  pub fn radius_years(&self) -> u32 {
    self.radius_years
  }

  /// The window is clamped to what chrono can represent, so any radius yields
  /// a real date.
  pub fn generate<R: Rng>(&self, rng: &mut R) -> NaiveDate {
    let now = self.clock.now();
    let radius_ms = (f64::from(self.radius_years) * DAYS_PER_YEAR * MS_PER_DAY) as i64;
    let now_ms = now.timestamp_millis();
    let lo = now_ms.saturating_sub(radius_ms).max(DateTime::<Utc>::MIN_UTC.timestamp_millis());
    let hi = now_ms.saturating_add(radius_ms).min(DateTime::<Utc>::MAX_UTC.timestamp_millis());
    let picked = rng.gen_range(lo..=hi);
    DateTime::<Utc>::from_timestamp_millis(picked)
      .unwrap_or(now)
      .date_naive()
  }
}

/// Where a session draws its question dates from.
pub trait DateSource: Send + Sync {
  fn next_date(&mut self) -> NaiveDate;
}

/// Production source: a generator plus a per-session RNG.
pub struct RandomDates {
  generator: DateGenerator,
  rng: StdRng,
}

impl RandomDates {
  pub fn new(generator: DateGenerator) -> Self {
    Self { generator, rng: StdRng::from_entropy() }
  }

  #[cfg(test)]
  pub fn seeded(generator: DateGenerator, seed: u64) -> Self {
    Self { generator, rng: StdRng::seed_from_u64(seed) }
  }
}

impl DateSource for RandomDates {
  fn next_date(&mut self) -> NaiveDate {
    self.generator.generate(&mut self.rng)
  }
}

/// Replays a fixed list of dates, wrapping around when exhausted.
#[cfg(test)]
pub struct ScriptedDates {
  dates: Vec<NaiveDate>,
  next: usize,
}

#[cfg(test)]
impl ScriptedDates {
  pub fn new(dates: Vec<NaiveDate>) -> Self {
    assert!(!dates.is_empty(), "scripted dates must not be empty");
    Self { dates, next: 0 }
  }
}

#[cfg(test)]
impl DateSource for ScriptedDates {
  fn next_date(&mut self) -> NaiveDate {
    let date = self.dates[self.next % self.dates.len()];
    self.next += 1;
    date
  }
}

#[cfg(test)]
pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Datelike;

  #[test]
  fn known_reference_dates() {
    let table = [
      (ymd(2000, 1, 1), Weekday::Sat),
      (ymd(1900, 1, 1), Weekday::Mon),
      (ymd(1970, 1, 1), Weekday::Thu),
      (ymd(1969, 12, 31), Weekday::Wed),
      (ymd(1969, 12, 28), Weekday::Sun),
      (ymd(1945, 8, 15), Weekday::Wed),
      (ymd(2024, 2, 29), Weekday::Thu),
      (ymd(2024, 3, 10), Weekday::Sun),
      (ymd(2100, 3, 1), Weekday::Mon),
      (ymd(1600, 3, 1), Weekday::Wed),
    ];
    for (date, expected) in table {
      assert_eq!(weekday_of(date), expected, "{date}");
    }
  }

  #[test]
  fn agrees_with_chrono_across_the_epoch() {
    let mut date = ymd(1890, 1, 1);
    let end = ymd(2140, 1, 1);
    while date < end {
      let expected = date.weekday().num_days_from_sunday() as usize;
      assert_eq!(weekday_of(date).index(), expected, "{date}");
      date = date + chrono::Duration::days(13);
    }
  }

  #[test]
  fn formats_zero_padded() {
    assert_eq!(format_date(ymd(1926, 1, 5)), "1926/01/05");
    assert_eq!(format_date(ymd(2124, 12, 31)), "2124/12/31");
  }

  #[test]
  fn parses_both_separators() {
    assert_eq!(parse_date("2024/03/13").expect("slash"), ymd(2024, 3, 13));
    assert_eq!(parse_date(" 2024-03-13 ").expect("dash"), ymd(2024, 3, 13));
    assert!(parse_date("2024/02/30").is_err());
    assert!(parse_date("yesterday").is_err());
  }

  #[test]
  fn generated_dates_stay_within_radius() {
    let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
    let generator = DateGenerator::new(Clock::fixed(now), 100);
    let today = now.date_naive();
    // 100 * 365.25 days, plus one for the day boundary.
    let max_days = 36_526;
    let mut rng = StdRng::seed_from_u64(42);
    let mut counts = [0usize; 7];
    for _ in 0..10_000 {
      let date = generator.generate(&mut rng);
      let distance = date.signed_duration_since(today).num_days().abs();
      assert!(distance <= max_days, "{date} is {distance} days away");
      counts[weekday_of(date).index()] += 1;
    }
    for (i, count) in counts.iter().enumerate() {
      assert!((1_100..=1_760).contains(count), "weekday {i} drawn {count} times");
    }
  }

  #[test]
  fn generator_covers_past_and_future() {
    let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
    let generator = DateGenerator::new(Clock::fixed(now), 100);
    let today = now.date_naive();
    let mut rng = StdRng::seed_from_u64(7);
    let dates: Vec<_> = (0..1_000).map(|_| generator.generate(&mut rng)).collect();
    assert!(dates.iter().any(|d| *d < ymd(1950, 1, 1)));
    assert!(dates.iter().any(|d| *d > ymd(2100, 1, 1)));
    assert!(dates.iter().any(|d| *d < today) && dates.iter().any(|d| *d > today));
  }

  #[test]
  fn oversized_radius_is_clamped_to_representable_dates() {
    let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
    let today = now.date_naive();
    let mut rng = StdRng::seed_from_u64(3);
    for radius in [280_000, 300_000_000, u32::MAX] {
      let generator = DateGenerator::new(Clock::fixed(now), radius);
      let dates: Vec<_> = (0..1_000).map(|_| generator.generate(&mut rng)).collect();
      assert!(dates.iter().filter(|d| **d == today).count() <= 1, "radius {radius} collapsed to today");
      assert!(dates.iter().any(|d| *d < today) && dates.iter().any(|d| *d > today));
    }
    let system = DateGenerator::new(Clock::System, u32::MAX);
    system.generate(&mut rng);
  }

  #[test]
  fn scripted_dates_wrap() {
    let mut src = ScriptedDates::new(vec![ymd(2024, 1, 1), ymd(2024, 1, 2)]);
    assert_eq!(src.next_date(), ymd(2024, 1, 1));
    assert_eq!(src.next_date(), ymd(2024, 1, 2));
    assert_eq!(src.next_date(), ymd(2024, 1, 1));
  }
}
