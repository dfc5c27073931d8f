//! Coordinate model and wire types shared between the scan agent and the
//! tile server — the part of `cartograph` that both sides must agree on
//! byte-for-byte.

pub mod coords;
pub mod error;
pub mod event;
pub mod wire;

pub use coords::{
  block_to_tile, blocks_per_tile, pixel_footprint, ChunkCoord, Dimension, MapType,
  PixelFootprint, ScanStartPolicy, TileCoord, CHUNK_SIZE, MAX_ZOOM, TILE_PIXELS,
};
pub use error::{validate_zoom, ValidationError};
pub use event::WsEvent;
pub use wire::{
  ApiError, ApiSuccess, BlockChange, BlockChangeBatchRequest, BlockRecord, ChunkBatchRequest,
  ChunkExistsQuery, ChunkPayload, EntityBatchRequest, EntityState, MapColor, PlayerBatchRequest,
  PlayerState, QueueStatusPayload, StructureBatchRequest, StructureExtents, StructureRecord,
  AUTH_HEADER,
};
