//! Scored summary of a session: one row per question plus the correct count.

use serde::Serialize;

use crate::domain::Weekday;
use crate::session::QuizSession;

/// Wire value for a question with no recorded answer.
pub const UNANSWERED: &str = "unanswered";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub index: usize,
    pub date: String,
    pub correct_answer: Weekday,
    pub user_answer: Option<Weekday>,
    pub is_correct: bool,
}

impl ResultRow {
    pub fn user_answer_label(&self) -> &'static str {
        self.user_answer.map_or(UNANSWERED, Weekday::label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub rows: Vec<ResultRow>,
    pub correct_count: usize,
    pub total: usize,
    pub elapsed_secs: u64,
}

/// Rows follow question order. Unanswered questions count as incorrect.
pub fn summarize(session: &QuizSession) -> QuizSummary {
    let rows: Vec<ResultRow> = session
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let correct_answer = question.correct_weekday();
            let user_answer = session.answer(index);
            ResultRow {
                index,
                date: question.formatted_date(),
                correct_answer,
                user_answer,
                is_correct: user_answer == Some(correct_answer),
            }
        })
        .collect();

    QuizSummary {
        correct_count: rows.iter().filter(|r| r.is_correct).count(),
        total: rows.len(),
        elapsed_secs: session.elapsed_secs(),
        rows,
    }
}
