//! Yobi · weekday quiz backend
//!
//! Five random dates within ±100 years of today; name the day of the week for
//! each as fast as you can. Sessions run server-side, one per WebSocket view.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod controller;
pub mod domain;
pub mod feedback;
pub mod protocol;
pub mod results;
pub mod routes;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod timer;
