//! HTTP endpoint handlers. These are thin wrappers over the calendar module.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument, warn};

use crate::calendar::{format_date, parse_date, weekday_of};
use crate::domain::Weekday;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    live_sessions: state.live_views(),
    sessions_opened: state.views_opened(),
  })
}

/// The seven answer options in display order.
#[instrument(level = "info")]
pub async fn http_get_weekdays() -> impl IntoResponse {
  Json(WeekdaysOut { weekdays: Weekday::ALL.into_iter().map(WeekdayOut::from).collect() })
}

#[instrument(level = "info", fields(date = %q.date))]
pub async fn http_get_weekday(
  Query(q): Query<WeekdayQuery>,
) -> Result<Json<WeekdayOut>, (StatusCode, Json<ErrorOut>)> {
  let date = parse_date(&q.date).map_err(|e| {
    warn!(target: "yobi_backend", input = %q.date, error = %e, "Rejected weekday lookup");
    (StatusCode::BAD_REQUEST, Json(ErrorOut { error: e.to_string() }))
  })?;
  let weekday = weekday_of(date);
  info!(target: "yobi_backend", %date, weekday = weekday.code(), "Weekday lookup");
  Ok(Json(WeekdayOut { date: Some(format_date(date)), ..WeekdayOut::from(weekday) }))
}
