//! Validation failures for incoming wire payloads.

use thiserror::Error;

use crate::coords::{CHUNK_SIZE, MAX_ZOOM};

#[derive(Debug, Error)]
pub enum ValidationError {
  #[error("zoom {zoom} out of range 0..={MAX_ZOOM}")]
  ZoomOutOfRange { zoom: u8 },

  #[error(
    "block ({x}, {z}) lies outside chunk ({chunk_x}, {chunk_z})'s 16x16 footprint"
  )]
  BlockOutsideChunk {
    x: i32,
    z: i32,
    chunk_x: i32,
    chunk_z: i32,
  },

  #[error("water depth must be >= 1 when present, got {0}")]
  InvalidWaterDepth(u32),

  #[error("chunk batch must contain at least one chunk")]
  EmptyBatch,

  #[error("block type id must not be empty")]
  EmptyTypeId,
}

/// Checks that every block in a chunk payload lies within the chunk's
/// 16x16 column footprint.
pub fn validate_block_in_chunk(
  block_x: i32,
  block_z: i32,
  chunk_x: i32,
  chunk_z: i32,
) -> Result<(), ValidationError> {
  let (ox, oz) = (chunk_x * CHUNK_SIZE, chunk_z * CHUNK_SIZE);
  let in_range = (ox..ox + CHUNK_SIZE).contains(&block_x) && (oz..oz + CHUNK_SIZE).contains(&block_z);
  if in_range {
    Ok(())
  } else {
    Err(ValidationError::BlockOutsideChunk {
      x: block_x,
      z: block_z,
      chunk_x,
      chunk_z,
    })
  }
}

pub fn validate_zoom(zoom: u8) -> Result<(), ValidationError> {
  if zoom <= MAX_ZOOM {
    Ok(())
  } else {
    Err(ValidationError::ZoomOutOfRange { zoom })
  }
}
