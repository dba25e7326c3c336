//! The quiz session state machine: Loading -> Active -> Finished.
//!
//! Pure and synchronous. Timing and feedback live in `controller`; this type
//! only owns questions, answers, the cursor and the elapsed counter.

use serde::Serialize;
use thiserror::Error;

use crate::calendar::DateSource;
use crate::domain::{Phase, Question, Weekday};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
  #[error("no active question (session is {phase})")]
  NotActive { phase: Phase },
  #[error("question {index} already answered")]
  AlreadyAnswered { index: usize },
}

/// What happened to a single submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub index: usize,
  pub correct: bool,
  pub correct_weekday: Weekday,
  pub finished: bool,
}

/// View-facing state. Never carries the correct answer of the open question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub phase: Phase,
  /// 1-based number of the open question; 0 while loading.
  pub question_number: usize,
  pub total: usize,
  pub current_date: Option<String>,
  pub answered: usize,
  pub elapsed_secs: u64,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
  questions: Vec<Question>,
  answers: Vec<Option<Weekday>>,
  cursor: usize,
  phase: Phase,
  elapsed_secs: u64,
  /// Bumped by every `start` and `reset`; lets the tick task detect a stale attempt.
  attempt: u64,
}

impl Default for QuizSession {
  fn default() -> Self {
    Self::new()
  }
}

impl QuizSession {
  pub fn new() -> Self {
    Self {
      questions: Vec::new(),
      answers: Vec::new(),
      cursor: 0,
      phase: Phase::Loading,
      elapsed_secs: 0,
      attempt: 0,
    }
  }

  /// Draw `count` fresh questions and enter Active. Valid from any phase;
  /// everything from a previous attempt is discarded.
  pub fn start(&mut self, dates: &mut dyn DateSource, count: usize) {
    self.questions = (0..count).map(|_| Question::new(dates.next_date())).collect();
    self.answers = vec![None; count];
    self.cursor = 0;
    self.elapsed_secs = 0;
    self.attempt += 1;
    self.phase = if count == 0 { Phase::Finished } else { Phase::Active };
  }

  /// Back to Loading with nothing retained.
  pub fn reset(&mut self) {
    let attempt = self.attempt + 1;
    *self = Self { attempt, ..Self::new() };
  }

  /// Count one elapsed second. Returns false (and changes nothing) unless Active.
  pub fn tick(&mut self) -> bool {
    if self.phase != Phase::Active {
      return false;
    }
    self.elapsed_secs += 1;
    true
  }

  pub fn submit_answer(&mut self, weekday: Weekday) -> Result<AnswerOutcome, SessionError> {
    if self.phase != Phase::Active {
      return Err(SessionError::NotActive { phase: self.phase });
    }
    let index = self.cursor;
    let question = self.questions[index];
    let slot = &mut self.answers[index];
    if slot.is_some() {
      return Err(SessionError::AlreadyAnswered { index });
    }
    *slot = Some(weekday);

    let correct_weekday = question.correct_weekday();
    if index + 1 < self.questions.len() {
      self.cursor += 1;
    } else {
      self.phase = Phase::Finished;
    }

    Ok(AnswerOutcome {
      index,
      correct: weekday == correct_weekday,
      correct_weekday,
      finished: self.phase == Phase::Finished,
    })
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn is_finished(&self) -> bool {
    self.phase == Phase::Finished
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn elapsed_secs(&self) -> u64 {
    self.elapsed_secs
  }

  pub fn attempt(&self) -> u64 {
    self.attempt
  }

  pub fn questions(&self) -> &[Question] {
    &self.questions
  }

  pub fn answer(&self, index: usize) -> Option<Weekday> {
    self.answers.get(index).copied().flatten()
  }

  pub fn current_question(&self) -> Option<&Question> {
    match self.phase {
      Phase::Active => self.questions.get(self.cursor),
      _ => None,
    }
  }

  pub fn snapshot(&self) -> SessionSnapshot {
    let question_number = match self.phase {
      Phase::Loading => 0,
      Phase::Active => self.cursor + 1,
      Phase::Finished => self.questions.len(),
    };
    SessionSnapshot {
      phase: self.phase,
      question_number,
      total: self.questions.len(),
      current_date: self.current_question().map(Question::formatted_date),
      answered: self.answers.iter().filter(|a| a.is_some()).count(),
      elapsed_secs: self.elapsed_secs,
    }
  }

  /// Finished session with an arbitrary answer sheet, for summary tests.
  #[cfg(test)]
  pub fn finished_with(questions: Vec<Question>, answers: Vec<Option<Weekday>>, elapsed_secs: u64) -> Self {
    assert_eq!(questions.len(), answers.len());
    Self {
      cursor: questions.len().saturating_sub(1),
      questions,
      answers,
      phase: Phase::Finished,
      elapsed_secs,
      attempt: 1,
    }
  }
}
