//! Shared-secret token middleware: all endpoints except `/health` require
//! `x-mc-auth-token`.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use cartograph_protocol::AUTH_HEADER;

use crate::routes::error_response;
use crate::state::AppState;

pub async fn require_token(
  State(state): State<Arc<AppState>>,
  request: Request,
  next: Next,
) -> Response {
  let provided = request.headers().get(AUTH_HEADER).and_then(|v| v.to_str().ok());
  match provided {
    Some(token) if token == state.config.auth_token => next.run(request).await,
    _ => error_response(axum::http::StatusCode::UNAUTHORIZED, "missing or invalid auth token", None),
  }
}
