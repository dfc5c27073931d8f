//! Coordinate model: dimensions, chunk/block/tile arithmetic, the zoom table.

use serde::{Deserialize, Serialize};

/// Number of blocks along one side of a chunk column.
pub const CHUNK_SIZE: i32 = 16;

/// Number of pixels along one side of a rendered tile, at every zoom level.
pub const TILE_PIXELS: u32 = 256;

/// Highest supported zoom level (inclusive). Levels run `0..=MAX_ZOOM`.
pub const MAX_ZOOM: u8 = 7;

/// A dimension tag. The set is closed: no other dimensions exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
  Overworld,
  Nether,
  TheEnd,
}

/// Policy for picking the starting height of a downward scan ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStartPolicy {
  /// Start at the dimension's maximum height.
  FromMaxHeight,
  /// Walk down from max height until the first empty block, then start
  /// there. Used by the nether, which has a solid bedrock ceiling.
  FromFirstAir,
}

impl Dimension {
  /// Minimum world Y (inclusive) for this dimension.
  pub const fn min_y(self) -> i32 {
    match self {
      Dimension::Overworld => -64,
      Dimension::Nether => 0,
      Dimension::TheEnd => 0,
    }
  }

  /// Maximum world Y (inclusive) for this dimension.
  pub const fn max_y(self) -> i32 {
    match self {
      Dimension::Overworld => 320,
      Dimension::Nether => 127,
      Dimension::TheEnd => 256,
    }
  }

  /// Scan-start policy for this dimension.
  pub const fn scan_start_policy(self) -> ScanStartPolicy {
    match self {
      Dimension::Nether => ScanStartPolicy::FromFirstAir,
      Dimension::Overworld | Dimension::TheEnd => ScanStartPolicy::FromMaxHeight,
    }
  }

  /// The wire tag for this dimension, e.g. `"the_end"`.
  pub const fn tag(self) -> &'static str {
    match self {
      Dimension::Overworld => "overworld",
      Dimension::Nether => "nether",
      Dimension::TheEnd => "the_end",
    }
  }
}

/// The kind of map being painted for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
  Block,
  Height,
  Density,
}

impl MapType {
  pub const ALL: [MapType; 3] = [MapType::Block, MapType::Height, MapType::Density];
}

/// A chunk's position in chunk-grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
  pub chunk_x: i32,
  pub chunk_z: i32,
}

impl ChunkCoord {
  pub const fn new(chunk_x: i32, chunk_z: i32) -> Self {
    Self { chunk_x, chunk_z }
  }

  /// World-block coordinate of this chunk's northwest corner.
  pub const fn origin_block(self) -> (i32, i32) {
    (self.chunk_x * CHUNK_SIZE, self.chunk_z * CHUNK_SIZE)
  }

  /// Euclidean distance in chunks to another chunk coordinate.
  pub fn distance(self, other: ChunkCoord) -> f64 {
    let dx = (self.chunk_x - other.chunk_x) as f64;
    let dz = (self.chunk_z - other.chunk_z) as f64;
    (dx * dx + dz * dz).sqrt()
  }
}

/// A tile's address in the zoom pyramid: which dimension, which map layer,
/// which zoom level, and which (x, z) cell at that level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileCoord {
  pub dimension: Dimension,
  pub map_type: MapType,
  pub zoom: u8,
  pub x: i32,
  pub z: i32,
}

impl TileCoord {
  pub const fn new(dimension: Dimension, map_type: MapType, zoom: u8, x: i32, z: i32) -> Self {
    Self {
      dimension,
      map_type,
      zoom,
      x,
      z,
    }
  }

  /// Relative path under the tile store root, e.g.
  /// `overworld/block/0/12/-3.png`.
  pub fn relative_path(&self) -> std::path::PathBuf {
    std::path::PathBuf::from(self.dimension.tag())
      .join(map_type_tag(self.map_type))
      .join(self.zoom.to_string())
      .join(self.x.to_string())
      .join(format!("{}.png", self.z))
  }
}

pub const fn map_type_tag(map_type: MapType) -> &'static str {
  match map_type {
    MapType::Block => "block",
    MapType::Height => "height",
    MapType::Density => "density",
  }
}

/// Number of blocks covered by one side of a tile at `zoom`.
///
/// `blocksPerTile(zoom) = 256 << zoom`.
pub const fn blocks_per_tile(zoom: u8) -> i64 {
  (TILE_PIXELS as i64) << zoom
}

/// The tile (x, z) that contains a given block column at `zoom`.
pub fn block_to_tile(block_x: i32, block_z: i32, zoom: u8) -> (i32, i32) {
  let span = blocks_per_tile(zoom);
  (
    div_floor(block_x as i64, span) as i32,
    div_floor(block_z as i64, span) as i32,
  )
}

/// Pixel footprint (in tile-local pixel space) painted by one block column
/// at `zoom`: the top-left pixel and the side length of the square it
/// covers.
///
/// `scale = blocksPerTile(zoom) / 256` is the number of blocks per pixel
/// and is always `>= 1` for `zoom` in `0..=MAX_ZOOM` (`blocksPerTile(0) ==
/// 256`), so the `scale < 1` case — where a single block would paint a
/// `1/scale × 1/scale` pixel square — never arises in this system; `side`
/// is always `1` and many blocks can collapse onto the same pixel at
/// `zoom > 0`, resolved by last-write-wins.
pub struct PixelFootprint {
  pub pixel_x: u32,
  pub pixel_z: u32,
  pub side: u32,
}

pub fn pixel_footprint(block_x: i32, block_z: i32, tile_x: i32, tile_z: i32, zoom: u8) -> PixelFootprint {
  let span = blocks_per_tile(zoom);
  let scale = span / TILE_PIXELS as i64; // blocks per pixel, >= 1
  let tile_origin_x = tile_x as i64 * span;
  let tile_origin_z = tile_z as i64 * span;
  let rel_x = block_x as i64 - tile_origin_x;
  let rel_z = block_z as i64 - tile_origin_z;
  PixelFootprint {
    pixel_x: div_floor(rel_x, scale.max(1)) as u32,
    pixel_z: div_floor(rel_z, scale.max(1)) as u32,
    side: if scale < 1 { (1 / scale.max(1)).max(1) as u32 } else { 1 },
  }
}

/// Floor division for signed integers (`div_euclid` isn't floor for
/// negative divisors, but our divisors are always positive so it matches).
fn div_floor(a: i64, b: i64) -> i64 {
  a.div_euclid(b)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blocks_per_tile_doubles_with_zoom() {
    assert_eq!(blocks_per_tile(0), 256);
    assert_eq!(blocks_per_tile(1), 512);
    assert_eq!(blocks_per_tile(7), 256 * 128);
  }

  #[test]
  fn block_to_tile_floors_toward_negative_infinity() {
    assert_eq!(block_to_tile(0, 0, 0), (0, 0));
    assert_eq!(block_to_tile(255, 255, 0), (0, 0));
    assert_eq!(block_to_tile(256, 0, 0), (1, 0));
    assert_eq!(block_to_tile(-1, -1, 0), (-1, -1));
    assert_eq!(block_to_tile(-256, 0, 0), (-1, 0));
  }

  #[test]
  fn pixel_footprint_at_zoom_zero_is_one_block_one_pixel() {
    let fp = pixel_footprint(5, 16, 0, 0, 0);
    assert_eq!((fp.pixel_x, fp.pixel_z, fp.side), (5, 16, 1));
  }

  #[test]
  fn pixel_footprint_at_higher_zoom_maps_many_blocks_to_one_pixel() {
    // zoom 1: 512 blocks per tile side, scale = 2 blocks/pixel.
    let fp = pixel_footprint(3, 3, 0, 0, 1);
    assert_eq!((fp.pixel_x, fp.pixel_z, fp.side), (1, 1, 1));
  }

  #[test]
  fn same_chunk_always_maps_to_exactly_one_tile_per_zoom() {
    let chunk = ChunkCoord::new(5, -3);
    let (ox, oz) = chunk.origin_block();
    for zoom in 0..=MAX_ZOOM {
      let t0 = block_to_tile(ox, oz, zoom);
      let t1 = block_to_tile(ox + CHUNK_SIZE - 1, oz + CHUNK_SIZE - 1, zoom);
      assert_eq!(t0, t1, "zoom {zoom} split a chunk across tiles");
    }
  }
}
