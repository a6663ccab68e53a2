//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! A connection binds to at most one gamification session (`start_session` or
//! `resume_session`); session actions before that are answered with `error`.
//! A session started on the connection is removed when the connection ends or
//! binds elsewhere; a resumed one is left in the store.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::ApiError;
use crate::gamification::Action;
use crate::logic::*;
use crate::protocol::{preview_out, progress_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

/// Session bound to one connection.
#[derive(Debug, Default)]
struct Binding {
  session: Option<String>,
  /// Created by this connection, so released with it.
  owned: bool,
}

impl Binding {
  fn id(&self) -> Option<&str> {
    self.session.as_deref()
  }
}

/// Drop the binding; removes the session if this connection created it.
async fn release(state: &AppState, binding: &mut Binding) {
  if let (Some(id), true) = (binding.session.take(), binding.owned) {
    state.remove_session(&id).await;
  }
  binding.owned = false;
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "nextmimo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "nextmimo_backend", "WebSocket connected");
  let mut binding = Binding::default();
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = handle_text(&txt, &state, &mut binding).await;
        let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "nextmimo_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "nextmimo_backend", session = ?binding.session, owned = binding.owned, "WebSocket disconnected");
  release(&state, &mut binding).await;
}

/// Parse one text frame and dispatch it.
async fn handle_text(txt: &str, state: &AppState, binding: &mut Binding) -> ServerWsMessage {
  match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "nextmimo_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state, binding).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  }
}

fn error_msg(e: ApiError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(state, binding))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, binding: &mut Binding) -> ServerWsMessage {
  let action = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,

    ClientWsMessage::Preview(body) => {
      let outcome = do_preview(state, &body);
      return ServerWsMessage::Preview(preview_out(&outcome));
    }

    ClientWsMessage::StartSession => {
      release(state, binding).await;
      let out = start_session(state).await;
      *binding = Binding { session: Some(out.session_id.clone()), owned: true };
      info!(target: "gamification", session = %out.session_id, "WS session started");
      return ServerWsMessage::Session { session_id: out.session_id, progress: out.progress };
    }

    ClientWsMessage::ResumeSession { session_id } => {
      return match session_progress(state, &session_id).await {
        Ok(out) => {
          if binding.id() != Some(out.session_id.as_str()) {
            release(state, binding).await;
            *binding = Binding { session: Some(out.session_id.clone()), owned: false };
          }
          info!(target: "gamification", session = %out.session_id, "WS session resumed");
          ServerWsMessage::Session { session_id: out.session_id, progress: out.progress }
        }
        Err(e) => error_msg(e),
      };
    }

    ClientWsMessage::GetProgress => {
      let Some(id) = binding.id() else { return unbound() };
      return match state.session(id).await {
        Some(progress) => ServerWsMessage::Progress { progress: progress_out(&progress), events: Vec::new() },
        None => error_msg(ApiError::SessionNotFound(id.to_string())),
      };
    }

    ClientWsMessage::AddXp { amount } => Action::AddXp(amount),
    ClientWsMessage::UnlockBadge { badge_id } => Action::UnlockBadge(badge_id),
    ClientWsMessage::CompleteLesson(body) => match lesson_completion(state, body, today()) {
      Ok(action) => action,
      Err(e) => return error_msg(e),
    },
  };

  let Some(id) = binding.id() else { return unbound() };
  match apply_action(state, id, action).await {
    Ok(out) => ServerWsMessage::Progress { progress: out.progress, events: out.events },
    Err(e) => error_msg(e),
  }
}

fn unbound() -> ServerWsMessage {
  ServerWsMessage::Error { message: "No session bound: send start_session or resume_session first".into() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;

  fn to_json(msg: &ServerWsMessage) -> serde_json::Value {
    serde_json::to_value(msg).unwrap()
  }

  #[tokio::test]
  async fn session_actions_require_binding() {
    let state = AppState::from_config(AppConfig::default());
    let mut binding = Binding::default();

    let reply = handle_text(r#"{"type":"add_xp","amount":10}"#, &state, &mut binding).await;
    assert_eq!(to_json(&reply)["type"], "error");

    let reply = handle_text(r#"{"type":"start_session"}"#, &state, &mut binding).await;
    assert_eq!(to_json(&reply)["type"], "session");
    assert!(binding.id().is_some());

    let reply = handle_text(r#"{"type":"add_xp","amount":600}"#, &state, &mut binding).await;
    let json = to_json(&reply);
    assert_eq!(json["type"], "progress");
    assert_eq!(json["progress"]["level"], 2);
    assert_eq!(json["events"][0]["type"], "xp_awarded");
  }

  #[tokio::test]
  async fn resume_unknown_session_is_an_error() {
    let state = AppState::from_config(AppConfig::default());
    let mut binding = Binding::default();
    let reply = handle_text(r#"{"type":"resume_session","sessionId":"missing"}"#, &state, &mut binding).await;
    assert_eq!(to_json(&reply)["type"], "error");
    assert!(binding.id().is_none());
  }

  #[tokio::test]
  async fn ping_preview_and_bad_json() {
    let state = AppState::from_config(AppConfig::default());
    let mut binding = Binding::default();
    assert_eq!(to_json(&handle_text(r#"{"type":"ping"}"#, &state, &mut binding).await)["type"], "pong");

    let reply = handle_text(r#"{"type":"preview","code":"","language":"react"}"#, &state, &mut binding).await;
    let json = to_json(&reply);
    assert_eq!(json["type"], "preview");
    assert_eq!(json["status"], "empty");

    let reply = handle_text("not json", &state, &mut binding).await;
    assert!(to_json(&reply)["message"].as_str().unwrap().starts_with("Invalid JSON"));
  }

  #[tokio::test]
  async fn started_session_is_released_with_the_connection() {
    let state = AppState::from_config(AppConfig::default());
    let mut binding = Binding::default();
    handle_text(r#"{"type":"start_session"}"#, &state, &mut binding).await;
    let id = binding.id().unwrap().to_string();
    assert!(state.session(&id).await.is_some());

    release(&state, &mut binding).await;
    assert!(state.session(&id).await.is_none());
    assert!(binding.id().is_none());
  }

  #[tokio::test]
  async fn restarting_drops_the_previous_own_session() {
    let state = AppState::from_config(AppConfig::default());
    let mut binding = Binding::default();
    handle_text(r#"{"type":"start_session"}"#, &state, &mut binding).await;
    let first = binding.id().unwrap().to_string();
    handle_text(r#"{"type":"start_session"}"#, &state, &mut binding).await;

    assert!(state.session(&first).await.is_none());
    assert_eq!(state.sessions.read().await.len(), 1);
  }

  #[tokio::test]
  async fn resumed_session_outlives_the_connection() {
    let state = AppState::from_config(AppConfig::default());
    let (id, _) = state.create_session().await;
    let mut binding = Binding::default();
    let msg = serde_json::json!({ "type": "resume_session", "sessionId": id }).to_string();
    let reply = handle_text(&msg, &state, &mut binding).await;
    assert_eq!(to_json(&reply)["type"], "session");

    release(&state, &mut binding).await;
    assert!(state.session(&id).await.is_some());
  }
}
