//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::Weekday;
use crate::feedback::Cue;
use crate::results::{QuizSummary, ResultRow};
use crate::session::SessionSnapshot;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Begin a new attempt (also restarts a running one).
    Start,
    SubmitAnswer {
        /// Weekday code (`"wed"`) or label (`"水"`).
        weekday: String,
    },
    /// Back to the entry screen.
    Reset,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State {
        snapshot: SessionSnapshot,
    },
    Cue {
        cue: Cue,
    },
    AnswerResult {
        correct: bool,
        #[serde(rename = "correctAnswer")]
        correct_answer: String,
        finished: bool,
    },
    Results {
        summary: SummaryOut,
    },
    Error {
        message: String,
    },
}

/// One results row as rendered by the front end.
#[derive(Debug, Serialize)]
pub struct ResultRowOut {
    pub index: usize,
    pub date: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    #[serde(rename = "userAnswer")]
    pub user_answer: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct SummaryOut {
    pub rows: Vec<ResultRowOut>,
    #[serde(rename = "correctCount")]
    pub correct_count: usize,
    pub total: usize,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: u64,
}

fn row_out(r: &ResultRow) -> ResultRowOut {
    ResultRowOut {
        index: r.index,
        date: r.date.clone(),
        correct_answer: r.correct_answer.label().to_string(),
        user_answer: r.user_answer_label().to_string(),
        is_correct: r.is_correct,
    }
}

/// Convert the internal summary to the public DTO.
pub fn summary_out(s: &QuizSummary) -> SummaryOut {
    SummaryOut {
        rows: s.rows.iter().map(row_out).collect(),
        correct_count: s.correct_count,
        total: s.total,
        elapsed_secs: s.elapsed_secs,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct WeekdayQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct WeekdayOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub weekday: Weekday,
    pub label: String,
    pub index: usize,
}

impl From<Weekday> for WeekdayOut {
    fn from(w: Weekday) -> Self {
        Self {
            date: None,
            weekday: w,
            label: w.label().to_string(),
            index: w.index(),
        }
    }
}

#[derive(Serialize)]
pub struct WeekdaysOut {
    pub weekdays: Vec<WeekdayOut>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    #[serde(rename = "liveSessions")]
    pub live_sessions: usize,
    #[serde(rename = "sessionsOpened")]
    pub sessions_opened: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_are_type_tagged() {
        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type":"submit_answer","weekday":"水"}"#).expect("parse");
        assert!(matches!(msg, ClientWsMessage::SubmitAnswer { ref weekday } if weekday == "水"));
        let msg: ClientWsMessage = serde_json::from_str(r#"{"type":"start"}"#).expect("parse");
        assert!(matches!(msg, ClientWsMessage::Start));
        assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn cue_and_answer_messages_serialize() {
        let cue = serde_json::to_value(ServerWsMessage::Cue { cue: Cue::Incorrect }).expect("json");
        assert_eq!(cue, serde_json::json!({ "type": "cue", "cue": "incorrect" }));

        let answer = serde_json::to_value(ServerWsMessage::AnswerResult {
            correct: false,
            correct_answer: "水".into(),
            finished: true,
        })
        .expect("json");
        assert_eq!(answer["type"], "answer_result");
        assert_eq!(answer["correctAnswer"], "水");
    }
}
