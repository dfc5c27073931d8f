//! WebSocket push-channel upgrade handler. A real transport protocol is out
//! of scope here; this forwards [`AppState::events`] broadcasts to
//! whichever client connects.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
  ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
  let mut events = state.events.subscribe();
  loop {
    tokio::select! {
      event = events.recv() => {
        let Ok(event) = event else { break };
        let Ok(json) = serde_json::to_string(&event) else { continue };
        if socket.send(Message::Text(json)).await.is_err() {
          break;
        }
      }
      incoming = socket.recv() => {
        match incoming {
          Some(Ok(Message::Close(_))) | None => break,
          Some(Err(_)) => break,
          _ => {}
        }
      }
    }
  }
}
