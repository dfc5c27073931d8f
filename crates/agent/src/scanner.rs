//! Surface Scanner: per-column downward ray to the topmost colored block.

use cartograph_protocol::{BlockRecord, ChunkPayload, Dimension, ScanStartPolicy};

use crate::runtime::WorldRuntime;

fn scan_start_y(dimension: Dimension, runtime: &dyn WorldRuntime, x: i32, z: i32) -> Option<i32> {
  match dimension.scan_start_policy() {
    ScanStartPolicy::FromMaxHeight => Some(dimension.max_y()),
    ScanStartPolicy::FromFirstAir => {
      let mut y = dimension.max_y();
      while y >= dimension.min_y() {
        if runtime.block_at(dimension, x, y, z).is_none() {
          return Some(y);
        }
        y -= 1;
      }
      None
    }
  }
}

/// Scans one column, returning the block record at the surface, if any.
pub fn scan_column(runtime: &dyn WorldRuntime, dimension: Dimension, x: i32, z: i32) -> Option<BlockRecord> {
  let start_y = scan_start_y(dimension, runtime, x, z)?;

  let mut y = start_y;
  let mut surface = None;
  while y >= dimension.min_y() {
    // Step past colorless blocks (e.g. air-like or unregistered types) to
    // find the topmost block that actually paints a pixel.
    if let Some(info) = runtime.block_at(dimension, x, y, z) {
      if !info.map_color.is_colorless() {
        surface = Some((y, info));
        break;
      }
    }
    y -= 1;
  }
  let (surface_y, info) = surface?;

  let water_depth = if info.water_depth.is_some() {
    let mut depth = 0u32;
    let mut wy = surface_y;
    while wy >= dimension.min_y() {
      match runtime.block_at(dimension, x, wy, z) {
        Some(b) if b.water_depth.is_some() => {
          depth += 1;
          wy -= 1;
        }
        _ => break,
      }
    }
    if depth == 0 { None } else { Some(depth) }
  } else {
    None
  };

  Some(BlockRecord {
    x,
    y: surface_y,
    z,
    type_id: info.block_type,
    map_color: info.map_color,
    water_depth,
  })
}

/// Scans an arbitrary square region. A column with no resolvable surface
/// (unloaded neighbor, void) is simply omitted rather than failing the
/// whole scan.
fn scan_square(
  runtime: &dyn WorldRuntime,
  dimension: Dimension,
  min_x: i32,
  min_z: i32,
  max_x: i32,
  max_z: i32,
) -> Vec<BlockRecord> {
  let mut blocks = Vec::new();
  for z in min_z..=max_z {
    for x in min_x..=max_x {
      if let Some(record) = scan_column(runtime, dimension, x, z) {
        blocks.push(record);
      }
    }
  }
  blocks
}

/// Scans a full 16×16 chunk: the Cartesian product over dx, dz ∈ [0,16).
pub fn scan_chunk(
  runtime: &dyn WorldRuntime,
  dimension: Dimension,
  chunk_x: i32,
  chunk_z: i32,
) -> ChunkPayload {
  let (ox, oz) = cartograph_protocol::ChunkCoord::new(chunk_x, chunk_z).origin_block();
  let blocks = scan_square(
    runtime,
    dimension,
    ox,
    oz,
    ox + cartograph_protocol::CHUNK_SIZE - 1,
    oz + cartograph_protocol::CHUNK_SIZE - 1,
  );
  ChunkPayload { dimension, chunk_x, chunk_z, blocks }
}

/// Result of an area scan: one payload per chunk the square touches, since
/// the wire format (and tile compositor) operate chunk-at-a-time.
pub fn scan_area(
  runtime: &dyn WorldRuntime,
  dimension: Dimension,
  center_x: i32,
  center_z: i32,
  radius: i32,
) -> Vec<ChunkPayload> {
  let min_x = center_x - radius;
  let min_z = center_z - radius;
  let max_x = center_x + radius;
  let max_z = center_z + radius;
  let blocks = scan_square(runtime, dimension, min_x, min_z, max_x, max_z);

  let mut by_chunk: std::collections::HashMap<(i32, i32), Vec<BlockRecord>> = std::collections::HashMap::new();
  for block in blocks {
    let chunk_x = block.x.div_euclid(cartograph_protocol::CHUNK_SIZE);
    let chunk_z = block.z.div_euclid(cartograph_protocol::CHUNK_SIZE);
    by_chunk.entry((chunk_x, chunk_z)).or_default().push(block);
  }

  by_chunk
    .into_iter()
    .map(|((chunk_x, chunk_z), blocks)| ChunkPayload { dimension, chunk_x, chunk_z, blocks })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::palette;
  use crate::runtime::fake::FakeRuntime;
  use crate::runtime::BlockInfo;
  use cartograph_protocol::{Dimension::Overworld, MapColor};

  fn solid(block_type: &str) -> BlockInfo {
    BlockInfo { block_type: block_type.into(), map_color: palette::color_for(block_type), water_depth: None }
  }

  fn colorless(block_type: &str) -> BlockInfo {
    BlockInfo { block_type: block_type.into(), map_color: MapColor::NONE, water_depth: None }
  }

  fn water() -> BlockInfo {
    BlockInfo { block_type: "water".into(), map_color: palette::color_for("water"), water_depth: Some(1) }
  }

  #[test]
  fn scan_column_finds_topmost_solid_block() {
    let runtime = FakeRuntime::new();
    runtime.set_block(Overworld, 0, 70, 0, solid("stone"));
    runtime.set_block(Overworld, 0, 60, 0, solid("bedrock"));
    let record = scan_column(&runtime, Overworld, 0, 0).unwrap();
    assert_eq!(record.y, 70);
    assert_eq!(record.type_id, "stone");
  }

  #[test]
  fn scan_column_computes_water_depth() {
    let runtime = FakeRuntime::new();
    runtime.set_block(Overworld, 0, 70, 0, water());
    runtime.set_block(Overworld, 0, 69, 0, water());
    runtime.set_block(Overworld, 0, 68, 0, solid("sand"));
    let record = scan_column(&runtime, Overworld, 0, 0).unwrap();
    assert_eq!(record.water_depth, Some(2));
  }

  #[test]
  fn scan_column_empty_returns_none() {
    let runtime = FakeRuntime::new();
    assert!(scan_column(&runtime, Overworld, 0, 0).is_none());
  }

  #[test]
  fn scan_column_skips_colorless_blocks_while_descending() {
    let runtime = FakeRuntime::new();
    runtime.set_block(Overworld, 0, 70, 0, colorless("unregistered_marker"));
    runtime.set_block(Overworld, 0, 69, 0, solid("stone"));
    let record = scan_column(&runtime, Overworld, 0, 0).unwrap();
    assert_eq!(record.y, 69);
    assert_eq!(record.type_id, "stone");
    assert!(!record.map_color.is_colorless());
  }

  #[test]
  fn scan_chunk_covers_256_columns_when_fully_populated() {
    let runtime = FakeRuntime::new();
    for x in 0..16 {
      for z in 0..16 {
        runtime.set_block(Overworld, x, 64, z, solid("grass"));
      }
    }
    let payload = scan_chunk(&runtime, Overworld, 0, 0);
    assert_eq!(payload.blocks.len(), 256);
  }

  #[test]
  fn scan_area_splits_by_chunk() {
    let runtime = FakeRuntime::new();
    runtime.set_block(Overworld, 0, 64, 0, solid("grass"));
    runtime.set_block(Overworld, 20, 64, 0, solid("grass"));
    let payloads = scan_area(&runtime, Overworld, 0, 0, 20);
    let chunks: std::collections::HashSet<_> = payloads.iter().map(|p| (p.chunk_x, p.chunk_z)).collect();
    assert!(chunks.contains(&(0, 0)));
    assert!(chunks.contains(&(1, 0)));
  }
}
