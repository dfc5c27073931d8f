//! `/world/*` and `/world/chunk/exists` endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use cartograph_protocol::{
  BlockChangeBatchRequest, ChunkBatchRequest, ChunkExistsQuery, EntityBatchRequest,
  PlayerBatchRequest, QueueStatusPayload, StructureBatchRequest,
};
use serde::Serialize;
use serde_json::json;

use crate::ingestion;
use crate::routes::error_response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct Received {
  received: usize,
}

pub async fn world_chunks(State(state): State<Arc<AppState>>, Json(body): Json<ChunkBatchRequest>) -> Response {
  if let Err(error) = body.validate() {
    return error_response(axum::http::StatusCode::BAD_REQUEST, "invalid chunk batch", Some(error.to_string()));
  }
  let written = ingestion::ingest_chunks(&state, &body.chunks).await;
  axum::Json(cartograph_protocol::ApiSuccess::new(json!({ "received": body.chunks.len(), "tilesWritten": written.len() }))).into_response()
}

pub async fn world_blocks(State(_state): State<Arc<AppState>>, Json(body): Json<BlockChangeBatchRequest>) -> Response {
  let received = ingestion::ack_block_changes(body.blocks.len());
  axum::Json(cartograph_protocol::ApiSuccess::new(Received { received })).into_response()
}

pub async fn world_players(State(state): State<Arc<AppState>>, Json(body): Json<PlayerBatchRequest>) -> Response {
  let mut players = state.players.lock().unwrap();
  for player in &body.players {
    let is_new = !players.contains_key(&player.name);
    players.insert(player.name.clone(), player.clone());
    let event = if is_new {
      cartograph_protocol::WsEvent::PlayerJoin { timestamp: crate::now_ms(), player: player.clone() }
    } else {
      cartograph_protocol::WsEvent::PlayerUpdate { timestamp: crate::now_ms(), player: player.clone() }
    };
    state.publish(event);
  }
  let received = body.players.len();
  drop(players);
  axum::Json(cartograph_protocol::ApiSuccess::new(Received { received })).into_response()
}

pub async fn world_entities(State(state): State<Arc<AppState>>, Json(body): Json<EntityBatchRequest>) -> Response {
  {
    let mut entities = state.entities.lock().unwrap();
    for entity in &body.entities {
      entities.insert(entity.id.clone(), entity.clone());
    }
  }
  state.publish(cartograph_protocol::WsEvent::EntityUpdate {
    timestamp: crate::now_ms(),
    entities: body.entities.clone(),
  });
  axum::Json(cartograph_protocol::ApiSuccess::new(Received { received: body.entities.len() })).into_response()
}

pub async fn world_queue_status(Json(_body): Json<QueueStatusPayload>) -> Response {
  axum::Json(cartograph_protocol::ApiSuccess::new(json!({ "acknowledged": true }))).into_response()
}

pub async fn world_structures(State(state): State<Arc<AppState>>, Json(body): Json<StructureBatchRequest>) -> Response {
  state.structures.insert_batch(body.structures.clone()).await;
  axum::Json(cartograph_protocol::ApiSuccess::new(Received { received: body.structures.len() })).into_response()
}

pub async fn chunk_exists(State(state): State<Arc<AppState>>, Query(query): Query<ChunkExistsQuery>) -> Response {
  let (block_x, block_z) = (query.chunk_x * cartograph_protocol::CHUNK_SIZE, query.chunk_z * cartograph_protocol::CHUNK_SIZE);
  let (tile_x, tile_z) = cartograph_protocol::block_to_tile(block_x, block_z, 0);
  let coord = cartograph_protocol::TileCoord::new(query.dimension, cartograph_protocol::MapType::Block, 0, tile_x, tile_z);
  let exists = state.tile_store.exists(coord);
  axum::Json(cartograph_protocol::ApiSuccess::new(json!({ "exists": exists }))).into_response()
}
