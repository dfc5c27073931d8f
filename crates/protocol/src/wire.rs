//! Wire types for the agent-to-server HTTP surface.

use serde::{Deserialize, Serialize};

use crate::coords::Dimension;
use crate::error::ValidationError;

/// RGBA map color. `(0, 0, 0, 0)` means "no color".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapColor {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl MapColor {
  pub const NONE: MapColor = MapColor { r: 0, g: 0, b: 0, a: 0 };

  /// A color of all-zero RGBA is treated as colorless.
  pub fn is_colorless(self) -> bool {
    self == Self::NONE
  }
}

/// One scanned block record within a chunk payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
  pub x: i32,
  pub y: i32,
  pub z: i32,
  #[serde(rename = "type")]
  pub type_id: String,
  pub map_color: MapColor,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub water_depth: Option<u32>,
}

impl BlockRecord {
  /// Whether this block is a liquid surface with known depth.
  pub fn is_water(&self) -> bool {
    matches!(self.water_depth, Some(d) if d > 0)
  }

  fn validate(&self) -> Result<(), ValidationError> {
    if self.type_id.is_empty() {
      return Err(ValidationError::EmptyTypeId);
    }
    if let Some(depth) = self.water_depth {
      if depth == 0 {
        return Err(ValidationError::InvalidWaterDepth(depth));
      }
    }
    Ok(())
  }
}

/// One chunk's worth of scanned surface blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPayload {
  pub dimension: Dimension,
  pub chunk_x: i32,
  pub chunk_z: i32,
  pub blocks: Vec<BlockRecord>,
}

impl ChunkPayload {
  pub fn validate(&self) -> Result<(), ValidationError> {
    for block in &self.blocks {
      block.validate()?;
      crate::error::validate_block_in_chunk(block.x, block.z, self.chunk_x, self.chunk_z)?;
    }
    Ok(())
  }
}

/// `POST /api/v1/world/chunks` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkBatchRequest {
  pub chunks: Vec<ChunkPayload>,
}

impl ChunkBatchRequest {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.chunks.is_empty() {
      return Err(ValidationError::EmptyBatch);
    }
    for chunk in &self.chunks {
      chunk.validate()?;
    }
    Ok(())
  }
}

/// One block-change event delivered to `/world/blocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockChange {
  pub dimension: Dimension,
  pub x: i32,
  pub y: i32,
  pub z: i32,
  pub block_type: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub previous_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub player: Option<String>,
  pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockChangeBatchRequest {
  pub blocks: Vec<BlockChange>,
}

/// A live player's reported position delivered to `/world/players`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
  pub name: String,
  pub x: f64,
  pub y: f64,
  pub z: f64,
  pub dimension: Dimension,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub playfab_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stats: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBatchRequest {
  pub players: Vec<PlayerState>,
}

/// A live entity's reported position delivered to `/world/entities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState {
  pub id: String,
  pub kind: String,
  pub x: f64,
  pub y: f64,
  pub z: f64,
  pub dimension: Dimension,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityBatchRequest {
  pub entities: Vec<EntityState>,
}

/// Progress-reporting payload posted to `/world/queue/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusPayload {
  pub queue_size: usize,
  pub completed_count: u64,
  pub total_count: u64,
  pub completion_percent: f64,
  pub eta_ms: Option<f64>,
  pub avg_job_time_ms: Option<f64>,
  pub is_processing: bool,
}

/// A discovered structure's bounding box in block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureExtents {
  pub min_x: i32,
  pub max_x: i32,
  pub min_z: i32,
  pub max_z: i32,
}

impl StructureExtents {
  pub fn validate(&self) -> Result<(), ValidationError> {
    // min <= max is the only invariant these extents carry; represented as a
    // debug assertion boundary rather than a named ValidationError variant
    // since malformed extents never arise from a well-behaved scanner.
    debug_assert!(self.min_x <= self.max_x && self.min_z <= self.max_z);
    Ok(())
  }

  pub fn center(&self) -> (i32, i32) {
    ((self.min_x + self.max_x) / 2, (self.min_z + self.max_z) / 2)
  }

  /// Whether `self` overlaps or is edge-adjacent to `other`.
  pub fn overlaps_or_adjacent(&self, other: &StructureExtents) -> bool {
    let x_touch = self.max_x + 1 >= other.min_x && other.max_x + 1 >= self.min_x;
    let z_touch = self.max_z + 1 >= other.min_z && other.max_z + 1 >= self.min_z;
    x_touch && z_touch
  }

  /// Whether `self` is fully contained within `other`.
  pub fn contained_by(&self, other: &StructureExtents) -> bool {
    self.min_x >= other.min_x
      && self.max_x <= other.max_x
      && self.min_z >= other.min_z
      && self.max_z <= other.max_z
  }

  pub fn union(&self, other: &StructureExtents) -> StructureExtents {
    StructureExtents {
      min_x: self.min_x.min(other.min_x),
      max_x: self.max_x.max(other.max_x),
      min_z: self.min_z.min(other.min_z),
      max_z: self.max_z.max(other.max_z),
    }
  }
}

/// A discovered named structure reported to `/world/structures`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureRecord {
  pub structure_type: String,
  pub x: i32,
  pub y: i32,
  pub z: i32,
  pub dimension: Dimension,
  pub extents: StructureExtents,
  pub discovered_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureBatchRequest {
  pub structures: Vec<StructureRecord>,
}

/// Envelope for a successful ingestion response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
  pub success: bool,
  pub data: T,
}

impl<T> ApiSuccess<T> {
  pub fn new(data: T) -> Self {
    Self { success: true, data }
  }
}

/// Envelope for a validation/auth failure response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
  pub success: bool,
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

impl ApiError {
  pub fn new(error: impl Into<String>) -> Self {
    Self {
      success: false,
      error: error.into(),
      details: None,
    }
  }

  pub fn with_details(mut self, details: impl Into<String>) -> Self {
    self.details = Some(details.into());
    self
  }
}

/// Body accepted by `GET /tiles/{..}.png` existence probes and reused by
/// `GET /api/v1/world/chunk/exists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkExistsQuery {
  pub dimension: Dimension,
  pub chunk_x: i32,
  pub chunk_z: i32,
}

/// Header carrying the shared-secret agent token.
pub const AUTH_HEADER: &str = "x-mc-auth-token";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn colorless_is_all_zero() {
    assert!(MapColor::NONE.is_colorless());
    assert!(!MapColor { r: 0, g: 0, b: 0, a: 1 }.is_colorless());
  }

  #[test]
  fn extents_union_and_containment() {
    let a = StructureExtents { min_x: 0, max_x: 15, min_z: 0, max_z: 15 };
    let b = StructureExtents { min_x: 16, max_x: 31, min_z: 0, max_z: 15 };
    assert!(a.overlaps_or_adjacent(&b));
    let u = a.union(&b);
    assert_eq!(u, StructureExtents { min_x: 0, max_x: 31, min_z: 0, max_z: 15 });

    let inner = StructureExtents { min_x: 1, max_x: 2, min_z: 1, max_z: 2 };
    assert!(inner.contained_by(&a));
  }

  #[test]
  fn chunk_payload_rejects_out_of_footprint_block() {
    let payload = ChunkPayload {
      dimension: Dimension::Overworld,
      chunk_x: 0,
      chunk_z: 0,
      blocks: vec![BlockRecord {
        x: 16,
        y: 64,
        z: 0,
        type_id: "stone".into(),
        map_color: MapColor { r: 1, g: 1, b: 1, a: 255 },
        water_depth: None,
      }],
    };
    assert!(payload.validate().is_err());
  }
}
