//! `GET /health` liveness probe. Not gated by the auth middleware.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthBody {
  status: &'static str,
  uptime: u64,
  timestamp: i64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
  Json(HealthBody {
    status: "ok",
    uptime: state.started_at.elapsed().as_secs(),
    timestamp: crate::now_ms(),
  })
}
