//! HTTP route handlers, one module per resource group.

mod health;
mod tiles;
mod world;
mod ws;

pub use health::health;
pub use tiles::{delete_tiles, get_tile};
pub use world::{
  chunk_exists, world_blocks, world_chunks, world_entities, world_players, world_queue_status,
  world_structures,
};
pub use ws::ws_upgrade;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cartograph_protocol::ApiError;

/// Builds a `{success:false, error, details?}` response body at the given
/// status.
pub fn error_response(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Response {
  let mut body = ApiError::new(error);
  if let Some(details) = details {
    body = body.with_details(details);
  }
  (status, Json(body)).into_response()
}
