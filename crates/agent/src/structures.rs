//! Structure Discovery: flood-filling a named structure's chunk footprint
//! after a full-chunk scan completes.

use std::collections::{HashSet, VecDeque};

use cartograph_protocol::{ChunkCoord, Dimension};

use crate::consts::MAX_FLOOD_FILL_CHUNKS;
use crate::runtime::WorldRuntime;

/// One structure instance discovered around a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredStructure {
  pub structure_type: String,
  pub dimension: Dimension,
  pub chunks: Vec<ChunkCoord>,
  pub discovered_at: i64,
}

impl DiscoveredStructure {
  /// Bounding box in block coordinates over the discovered chunk footprint.
  pub fn extents(&self) -> cartograph_protocol::StructureExtents {
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_z = i32::MAX;
    let mut max_z = i32::MIN;
    for chunk in &self.chunks {
      let (ox, oz) = chunk.origin_block();
      min_x = min_x.min(ox);
      max_x = max_x.max(ox + cartograph_protocol::CHUNK_SIZE - 1);
      min_z = min_z.min(oz);
      max_z = max_z.max(oz + cartograph_protocol::CHUNK_SIZE - 1);
    }
    cartograph_protocol::StructureExtents { min_x, max_x, min_z, max_z }
  }

  /// Dedup key: (type, dimension, center chunk).
  pub fn dedup_key(&self) -> (String, Dimension, ChunkCoord) {
    let (cx, cz) = self.extents().center();
    let center_chunk = ChunkCoord::new(
      cx.div_euclid(cartograph_protocol::CHUNK_SIZE),
      cz.div_euclid(cartograph_protocol::CHUNK_SIZE),
    );
    (self.structure_type.clone(), self.dimension, center_chunk)
  }
}

/// BFS flood-fill over 4-neighbor chunks: every chunk reporting
/// `structure_type` at its center, starting from `origin`, capped at
/// [`MAX_FLOOD_FILL_CHUNKS`].
fn flood_fill(
  runtime: &dyn WorldRuntime,
  dimension: Dimension,
  structure_type: &str,
  origin: ChunkCoord,
) -> Vec<ChunkCoord> {
  let mut visited = HashSet::new();
  let mut result = Vec::new();
  let mut queue = VecDeque::new();
  queue.push_back(origin);
  visited.insert(origin);

  while let Some(chunk) = queue.pop_front() {
    result.push(chunk);
    if result.len() >= MAX_FLOOD_FILL_CHUNKS {
      break;
    }
    for neighbor in [
      ChunkCoord::new(chunk.chunk_x + 1, chunk.chunk_z),
      ChunkCoord::new(chunk.chunk_x - 1, chunk.chunk_z),
      ChunkCoord::new(chunk.chunk_x, chunk.chunk_z + 1),
      ChunkCoord::new(chunk.chunk_x, chunk.chunk_z - 1),
    ] {
      if visited.contains(&neighbor) {
        continue;
      }
      visited.insert(neighbor);
      if runtime.structures_at(dimension, neighbor).iter().any(|t| t == structure_type) {
        queue.push_back(neighbor);
      }
    }
  }
  result
}

/// Discovers every structure instance named at `chunk`'s center, one
/// [`DiscoveredStructure`] per distinct type.
pub fn discover_structures(
  runtime: &dyn WorldRuntime,
  dimension: Dimension,
  chunk: ChunkCoord,
  now_ms: i64,
) -> Vec<DiscoveredStructure> {
  let types = runtime.structures_at(dimension, chunk);
  types
    .into_iter()
    .map(|structure_type| {
      let chunks = flood_fill(runtime, dimension, &structure_type, chunk);
      DiscoveredStructure { structure_type, dimension, chunks, discovered_at: now_ms }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::runtime::fake::FakeRuntime;
  use cartograph_protocol::Dimension::Overworld;

  #[test]
  fn discovers_single_chunk_structure() {
    let runtime = FakeRuntime::new();
    runtime
      .structures
      .lock()
      .unwrap()
      .insert((Overworld, ChunkCoord::new(0, 0)), vec!["village".into()]);
    let found = discover_structures(&runtime, Overworld, ChunkCoord::new(0, 0), 1000);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].chunks, vec![ChunkCoord::new(0, 0)]);
  }

  #[test]
  fn flood_fill_follows_adjacent_chunks_of_same_type() {
    let runtime = FakeRuntime::new();
    {
      let mut structures = runtime.structures.lock().unwrap();
      structures.insert((Overworld, ChunkCoord::new(0, 0)), vec!["village".into()]);
      structures.insert((Overworld, ChunkCoord::new(1, 0)), vec!["village".into()]);
      structures.insert((Overworld, ChunkCoord::new(2, 0)), vec!["other".into()]);
    }
    let found = discover_structures(&runtime, Overworld, ChunkCoord::new(0, 0), 1000);
    assert_eq!(found.len(), 1);
    let mut chunks = found[0].chunks.clone();
    chunks.sort_by_key(|c| (c.chunk_x, c.chunk_z));
    assert_eq!(chunks, vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);
  }

  #[test]
  fn flood_fill_capped_at_max_chunks() {
    let runtime = FakeRuntime::new();
    {
      let mut structures = runtime.structures.lock().unwrap();
      for x in 0..200 {
        structures.insert((Overworld, ChunkCoord::new(x, 0)), vec!["sprawl".into()]);
      }
    }
    let found = discover_structures(&runtime, Overworld, ChunkCoord::new(0, 0), 1000);
    assert_eq!(found[0].chunks.len(), MAX_FLOOD_FILL_CHUNKS);
  }
}
