//! WebSocket push-channel event envelopes.
//!
//! Clients MUST ignore unknown `type` values, so new variants are additive
//! and never change the meaning of an existing one.

use serde::{Deserialize, Serialize};

use crate::coords::TileCoord;
use crate::wire::{EntityState, PlayerState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsEvent {
  #[serde(rename = "player:join")]
  PlayerJoin { timestamp: i64, player: PlayerState },
  #[serde(rename = "player:leave")]
  PlayerLeave { timestamp: i64, name: String },
  #[serde(rename = "player:update")]
  PlayerUpdate { timestamp: i64, player: PlayerState },
  #[serde(rename = "entity:update")]
  EntityUpdate { timestamp: i64, entities: Vec<EntityState> },
  #[serde(rename = "tile:update")]
  TileUpdate { timestamp: i64, tiles: Vec<TileCoord> },
  #[serde(rename = "chat:message")]
  ChatMessage {
    timestamp: i64,
    sender: String,
    message: String,
  },
  #[serde(rename = "chat:history")]
  ChatHistory {
    timestamp: i64,
    messages: Vec<String>,
  },
  #[serde(rename = "spawn:world")]
  SpawnWorld { timestamp: i64, x: f64, y: f64, z: f64 },
  #[serde(rename = "spawn:player")]
  SpawnPlayer { timestamp: i64, name: String, x: f64, y: f64, z: f64 },
  #[serde(rename = "spawn:state")]
  SpawnState { timestamp: i64, state: serde_json::Value },
  #[serde(rename = "time:update")]
  TimeUpdate { timestamp: i64, time_of_day: i64 },
  #[serde(rename = "time:state")]
  TimeState { timestamp: i64, time_of_day: i64 },
  #[serde(rename = "weather:update")]
  WeatherUpdate { timestamp: i64, weather: String },
  #[serde(rename = "weather:state")]
  WeatherState { timestamp: i64, weather: String },
}

impl WsEvent {
  /// The discriminator string as it appears on the wire, e.g. `"tile:update"`.
  pub fn type_tag(&self) -> &'static str {
    match self {
      WsEvent::PlayerJoin { .. } => "player:join",
      WsEvent::PlayerLeave { .. } => "player:leave",
      WsEvent::PlayerUpdate { .. } => "player:update",
      WsEvent::EntityUpdate { .. } => "entity:update",
      WsEvent::TileUpdate { .. } => "tile:update",
      WsEvent::ChatMessage { .. } => "chat:message",
      WsEvent::ChatHistory { .. } => "chat:history",
      WsEvent::SpawnWorld { .. } => "spawn:world",
      WsEvent::SpawnPlayer { .. } => "spawn:player",
      WsEvent::SpawnState { .. } => "spawn:state",
      WsEvent::TimeUpdate { .. } => "time:update",
      WsEvent::TimeState { .. } => "time:state",
      WsEvent::WeatherUpdate { .. } => "weather:update",
      WsEvent::WeatherState { .. } => "weather:state",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::coords::{Dimension, MapType};

  #[test]
  fn tile_update_round_trips_through_json() {
    let event = WsEvent::TileUpdate {
      timestamp: 1000,
      tiles: vec![TileCoord::new(Dimension::Overworld, MapType::Block, 0, 1, 2)],
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "tile:update");
    let back: WsEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back.type_tag(), "tile:update");
  }
}
