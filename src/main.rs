//! NextMimo · Learning Platform Backend
//!
//! - Axum HTTP + WebSocket API
//! - Lesson catalog, quizzes and code analysis
//! - In-memory gamification sessions (XP, levels, badges, streaks)
//! - Sandboxed code-preview documents for html/css/javascript/jsx/react snippets
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   NEXTMIMO_CONFIG_PATH  : path to TOML config (extra lessons, module metadata, preview settings)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod catalog;
mod gamification;
mod preview;
mod quiz;
mod analyzer;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, sessions, preview settings).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "nextmimo_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
