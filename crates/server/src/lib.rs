//! Tile server: ingests scanned chunk batches, composites zoom-pyramid PNG
//! tiles, serves them over HTTP, and fans out live updates over WebSocket.

pub mod auth;
pub mod compositor;
pub mod config;
pub mod ingestion;
pub mod lock;
pub mod routes;
pub mod state;
pub mod structures;
pub mod tile_store;

pub use config::{ConfigError, ServerConfig};
pub use state::AppState;

pub fn now_ms() -> i64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|d| d.as_millis() as i64)
    .unwrap_or(0)
}

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

/// Builds the full router: `/health` unauthenticated, everything else
/// behind [`auth::require_token`].
pub fn build_router(state: Arc<AppState>) -> Router {
  let authenticated = Router::new()
    .route("/api/v1/world/chunks", post(routes::world_chunks))
    .route("/api/v1/world/blocks", post(routes::world_blocks))
    .route("/api/v1/world/players", post(routes::world_players))
    .route("/api/v1/world/entities", post(routes::world_entities))
    .route("/api/v1/world/queue/status", post(routes::world_queue_status))
    .route("/api/v1/world/structures", post(routes::world_structures))
    .route("/api/v1/world/chunk/exists", get(routes::chunk_exists))
    .route("/tiles/:dimension/:map_type/:zoom/:x/:z", get(routes::get_tile))
    .route("/tiles", delete(routes::delete_tiles))
    .route("/ws", get(routes::ws_upgrade))
    .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth::require_token));

  Router::new()
    .route("/health", get(routes::health))
    .merge(authenticated)
    .layer(CorsLayer::permissive())
    .with_state(state)
}
