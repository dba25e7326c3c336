//! WebSocket upgrade + message loop. Each connection owns one session
//! controller for its whole lifetime. Client messages are parsed as JSON and
//! dispatched to the controller; snapshots and cues are pushed as they happen.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::controller::SessionController;
use crate::domain::Weekday;
use crate::feedback::ChannelNotifier;
use crate::protocol::{summary_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

const CUE_BUFFER: usize = 16;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "yobi_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  if let Err(e) = socket.send(Message::Text(out)).await {
    error!(target: "yobi_backend", error = %e, "WS send error");
    return false;
  }
  true
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let _view = state.open_view();
  let (notifier, mut cues) = ChannelNotifier::new(CUE_BUFFER);
  let mut controller = state.new_controller(Arc::new(notifier));
  let mut updates = controller.subscribe();
  info!(target: "quiz", session = %controller.id(), "WebSocket connected");

  let initial = ServerWsMessage::State { snapshot: updates.borrow_and_update().clone() };
  if send(&mut socket, &initial).await {
    loop {
      tokio::select! {
        incoming = socket.recv() => {
          let txt = match incoming {
            Some(Ok(Message::Text(txt))) => txt,
            Some(Ok(Message::Ping(payload))) => {
              let _ = socket.send(Message::Pong(payload)).await;
              continue;
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
              debug!(target: "yobi_backend", error = %e, "WS receive error");
              break;
            }
            Some(Ok(_)) => continue,
          };
          let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(msg) => {
              debug!(target: "yobi_backend", "WS received: {:?}", &msg);
              handle_client_ws(msg, &mut controller).await
            }
            Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
          };
          let mut ok = true;
          for reply in &replies {
            if !send(&mut socket, reply).await {
              ok = false;
              break;
            }
          }
          if !ok {
            break;
          }
        }
        Some(cue) = cues.recv() => {
          if !send(&mut socket, &ServerWsMessage::Cue { cue }).await {
            break;
          }
        }
        changed = updates.changed() => {
          if changed.is_err() {
            break;
          }
          let snapshot = updates.borrow_and_update().clone();
          if !send(&mut socket, &ServerWsMessage::State { snapshot }).await {
            break;
          }
        }
      }
    }
  }

  controller.shutdown();
  info!(target: "quiz", session = %controller.id(), "WebSocket disconnected");
}

async fn handle_client_ws(msg: ClientWsMessage, controller: &mut SessionController) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::Start => {
      controller.start().await;
      Vec::new()
    }

    ClientWsMessage::SubmitAnswer { weekday } => {
      let weekday = match weekday.parse::<Weekday>() {
        Ok(w) => w,
        Err(e) => return vec![ServerWsMessage::Error { message: e.to_string() }],
      };
      match controller.submit_answer(weekday).await {
        Ok(outcome) => {
          let mut replies = vec![ServerWsMessage::AnswerResult {
            correct: outcome.correct,
            correct_answer: outcome.correct_weekday.label().to_string(),
            finished: outcome.finished,
          }];
          if outcome.finished {
            if let Some(summary) = controller.summary().await {
              info!(target: "quiz", session = %controller.id(), correct = summary.correct_count, total = summary.total, "Results sent");
              replies.push(ServerWsMessage::Results { summary: summary_out(&summary) });
            }
          }
          replies
        }
        Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
      }
    }

    ClientWsMessage::Reset => {
      controller.reset().await;
      Vec::new()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::calendar::{ymd, ScriptedDates};
  use crate::config::QuizSettings;
  use crate::feedback::Cue;

  fn scripted_controller() -> (SessionController, tokio::sync::mpsc::Receiver<Cue>) {
    let (notifier, cues) = ChannelNotifier::new(CUE_BUFFER);
    let dates = ScriptedDates::new((10..=14).map(|d| ymd(2024, 3, d)).collect());
    let ctl = SessionController::new(QuizSettings::default(), Box::new(dates), Arc::new(notifier));
    (ctl, cues)
  }

  fn json(msgs: &[ServerWsMessage]) -> Vec<serde_json::Value> {
    msgs.iter().map(|m| serde_json::to_value(m).expect("json")).collect()
  }

  #[tokio::test(start_paused = true)]
  async fn full_round_produces_results() {
    let (mut ctl, mut cues) = scripted_controller();
    assert!(handle_client_ws(ClientWsMessage::Start, &mut ctl).await.is_empty());
    assert_eq!(cues.recv().await, Some(Cue::Start));

    let mut replies = Vec::new();
    for w in ["sun", "mon", "tue", "thu", "木"] {
      replies.push(handle_client_ws(ClientWsMessage::SubmitAnswer { weekday: w.into() }, &mut ctl).await);
    }
    assert!(replies[..4].iter().all(|r| r.len() == 1));
    let out = json(replies.last().expect("five replies"));
    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["type"], "answer_result");
    assert_eq!(out[0]["finished"], true);
    assert_eq!(out[1]["type"], "results");
    assert_eq!(out[1]["summary"]["correctCount"], 4);
    assert_eq!(out[1]["summary"]["rows"][3]["userAnswer"], "木");
    assert_eq!(out[1]["summary"]["rows"][3]["correctAnswer"], "水");
  }

  #[tokio::test(start_paused = true)]
  async fn bad_input_is_reported_not_fatal() {
    let (mut ctl, _cues) = scripted_controller();
    let early = json(&handle_client_ws(ClientWsMessage::SubmitAnswer { weekday: "mon".into() }, &mut ctl).await);
    assert_eq!(early[0]["type"], "error");

    handle_client_ws(ClientWsMessage::Start, &mut ctl).await;
    let unknown = json(&handle_client_ws(ClientWsMessage::SubmitAnswer { weekday: "someday".into() }, &mut ctl).await);
    assert_eq!(unknown[0]["type"], "error");
    assert_eq!(ctl.snapshot().await.answered, 0);

    let pong = json(&handle_client_ws(ClientWsMessage::Ping, &mut ctl).await);
    assert_eq!(pong[0]["type"], "pong");
  }

  #[tokio::test(start_paused = true)]
  async fn reset_returns_to_loading() {
    let (mut ctl, _cues) = scripted_controller();
    handle_client_ws(ClientWsMessage::Start, &mut ctl).await;
    handle_client_ws(ClientWsMessage::Reset, &mut ctl).await;
    assert_eq!(ctl.snapshot().await.phase, crate::domain::Phase::Loading);
    assert!(!ctl.is_ticking());
  }
}
