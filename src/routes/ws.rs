//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::domain::Scope;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "ctf_scoreboard", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "ctf_scoreboard", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => handle_client_ws(incoming, &state).await,
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "ctf_scoreboard", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "ctf_scoreboard", "WebSocket disconnected");
}

// Flags never reach the log; only ids and lengths do.
#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::SubmitFlag { user_id, challenge_id, flag } => {
      debug!(target: "submission", %user_id, %challenge_id, flag_len = flag.len(), "WS submit_flag received");
      match submit(state, &user_id, &challenge_id, &flag).await {
        Ok(result) => {
          info!(target: "submission", %challenge_id, correct = result.correct, newly_solved = result.newly_solved, "WS submit evaluated");
          ServerWsMessage::SubmitResult { result }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetProgress { user_id, include_hidden } => {
      match get_progress(state, &user_id, Scope::from_include_hidden(include_hidden)).await {
        Ok(progress) => ServerWsMessage::Progress { progress },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetLeaderboard { limit, category } => {
      ServerWsMessage::Leaderboard { entries: get_leaderboard(state, limit, category.as_deref()).await }
    }
  }
}
