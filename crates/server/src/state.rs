//! Shared application state threaded through every axum handler.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use cartograph_protocol::{EntityState, PlayerState, WsEvent};
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::lock::TileLockTable;
use crate::structures::StructureStore;
use crate::tile_store::TileStore;

/// A real WebSocket transport is out of scope here — this channel is the
/// shared event surface: ingestion and the minimal player/entity stores
/// publish onto it, and the transport in `routes/ws.rs` subscribes.
const WS_CHANNEL_CAPACITY: usize = 1024;

pub struct AppState {
  pub config: ServerConfig,
  pub tile_store: TileStore,
  pub tile_locks: TileLockTable,
  pub structures: StructureStore,
  pub players: Mutex<HashMap<String, PlayerState>>,
  pub entities: Mutex<HashMap<String, EntityState>>,
  pub started_at: Instant,
  pub events: broadcast::Sender<WsEvent>,
}

impl AppState {
  pub fn new(config: ServerConfig) -> Self {
    let (events, _rx) = broadcast::channel(WS_CHANNEL_CAPACITY);
    Self {
      tile_store: TileStore::new(&config.data_dir),
      structures: StructureStore::new(&config.data_dir),
      tile_locks: TileLockTable::new(),
      players: Mutex::new(HashMap::new()),
      entities: Mutex::new(HashMap::new()),
      started_at: Instant::now(),
      config,
      events,
    }
  }

  pub fn publish(&self, event: WsEvent) {
    // No subscribers is a normal state (no websocket clients connected yet).
    let _ = self.events.send(event);
  }
}
