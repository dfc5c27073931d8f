//! The boundary between this crate and the host game runtime.
//!
//! The actual world (chunk storage, entity ticking, player sessions) is out
//! of scope here — it lives in whatever engine embeds this scheduler. What
//! this crate needs from it is captured as a trait so the scheduler,
//! scanner and tests can all run against a fake in-memory world.

use async_trait::async_trait;
use cartograph_protocol::{ChunkCoord, Dimension, MapColor};

/// A rectangular region of block columns, inclusive on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldRect {
  pub dimension: Dimension,
  pub min_x: i32,
  pub min_z: i32,
  pub max_x: i32,
  pub max_z: i32,
}

impl WorldRect {
  pub fn around(dimension: Dimension, center_x: i32, center_z: i32, radius: i32) -> Self {
    Self {
      dimension,
      min_x: center_x - radius,
      min_z: center_z - radius,
      max_x: center_x + radius,
      max_z: center_z + radius,
    }
  }

  pub fn chunk(dimension: Dimension, chunk: ChunkCoord) -> Self {
    let (ox, oz) = chunk.origin_block();
    Self {
      dimension,
      min_x: ox,
      min_z: oz,
      max_x: ox + cartograph_protocol::CHUNK_SIZE - 1,
      max_z: oz + cartograph_protocol::CHUNK_SIZE - 1,
    }
  }

  fn chunk_range(&self) -> (i32, i32, i32, i32) {
    (
      self.min_x.div_euclid(cartograph_protocol::CHUNK_SIZE),
      self.min_z.div_euclid(cartograph_protocol::CHUNK_SIZE),
      self.max_x.div_euclid(cartograph_protocol::CHUNK_SIZE),
      self.max_z.div_euclid(cartograph_protocol::CHUNK_SIZE),
    )
  }

  /// Every chunk that this rect touches, in row-major order.
  pub fn covered_chunks(&self) -> Vec<ChunkCoord> {
    let (min_cx, min_cz, max_cx, max_cz) = self.chunk_range();
    let mut chunks = Vec::new();
    for cz in min_cz..=max_cz {
      for cx in min_cx..=max_cx {
        chunks.push(ChunkCoord::new(cx, cz));
      }
    }
    chunks
  }
}

/// A single resolved block column entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
  pub block_type: String,
  /// Resolved from the runtime's block registry. `MapColor::NONE` marks the
  /// block colorless, meaning the scanner should keep stepping down past it.
  pub map_color: MapColor,
  /// Present only for water columns; depth in blocks to the floor below.
  pub water_depth: Option<u32>,
}

/// Handle to a region the scheduler has asked the runtime to keep loaded.
/// Dropping it without calling [`WorldRuntime::release_load_area`] leaks a
/// load reference in the host runtime, so callers must release explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadAreaHandle(pub u64);

/// Everything the scheduler needs from the embedding game world.
///
/// Implemented once for real by the host engine; implemented by a fake for
/// every test in this crate, keeping game-world access an explicit
/// component passed by reference rather than hidden global state.
#[async_trait]
pub trait WorldRuntime: Send + Sync {
  /// Registers interest in a region, asking the runtime to load and keep
  /// loaded every chunk it covers. Returns immediately; loading is
  /// asynchronous and polled via [`is_chunk_loaded`](Self::is_chunk_loaded).
  async fn register_load_area(&self, rect: WorldRect) -> LoadAreaHandle;

  /// Releases a previously registered load area. Idempotent.
  fn release_load_area(&self, handle: LoadAreaHandle);

  /// Whether the named chunk is currently resident and readable.
  fn is_chunk_loaded(&self, dimension: Dimension, chunk: ChunkCoord) -> bool;

  /// Resolved block at a world column and height, or `None` if the column
  /// isn't loaded or the block is air/void.
  fn block_at(&self, dimension: Dimension, x: i32, y: i32, z: i32) -> Option<BlockInfo>;

  /// Suspends until the runtime's next simulation tick. The scheduler's
  /// entire cadence (§4.3–§4.5) is expressed in terms of these ticks.
  async fn wait_next_tick(&self);

  /// Type ids of any registered structures whose bounding box contains this
  /// chunk, used to seed structure discovery.
  fn structures_at(&self, dimension: Dimension, chunk: ChunkCoord) -> Vec<String>;

  /// Currently connected players, as `(dimension, chunk position)` pairs,
  /// used for proximity-based queue re-sorting.
  fn known_players(&self) -> Vec<(Dimension, ChunkCoord)>;
}

/// In-memory [`WorldRuntime`] fake, for this crate's own unit tests and for
/// integration tests in `tests/` that need a runtime without a real game
/// engine attached.
#[cfg(any(test, feature = "test-util"))]
pub mod fake {
  use super::*;
  use std::collections::{HashMap, HashSet};
  use std::sync::atomic::{AtomicU64, Ordering};
  use std::sync::Mutex;

  /// In-memory [`WorldRuntime`] for unit and integration tests: every chunk
  /// is "loaded" the instant it's registered, and blocks come from a map
  /// set up by the test.
  #[derive(Default)]
  pub struct FakeRuntime {
    pub blocks: Mutex<HashMap<(Dimension, i32, i32, i32), BlockInfo>>,
    pub loaded_chunks: Mutex<HashSet<(Dimension, ChunkCoord)>>,
    pub players: Mutex<Vec<(Dimension, ChunkCoord)>>,
    pub structures: Mutex<HashMap<(Dimension, ChunkCoord), Vec<String>>>,
    next_handle: AtomicU64,
  }

  impl FakeRuntime {
    pub fn new() -> Self {
      Self::default()
    }

    pub fn set_block(&self, dimension: Dimension, x: i32, y: i32, z: i32, info: BlockInfo) {
      self.blocks.lock().unwrap().insert((dimension, x, y, z), info);
    }
  }

  #[async_trait]
  impl WorldRuntime for FakeRuntime {
    async fn register_load_area(&self, rect: WorldRect) -> LoadAreaHandle {
      let mut loaded = self.loaded_chunks.lock().unwrap();
      for chunk in rect.covered_chunks() {
        loaded.insert((rect.dimension, chunk));
      }
      let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
      LoadAreaHandle(id)
    }

    fn release_load_area(&self, _handle: LoadAreaHandle) {}

    fn is_chunk_loaded(&self, dimension: Dimension, chunk: ChunkCoord) -> bool {
      self.loaded_chunks.lock().unwrap().contains(&(dimension, chunk))
    }

    fn block_at(&self, dimension: Dimension, x: i32, y: i32, z: i32) -> Option<BlockInfo> {
      self.blocks.lock().unwrap().get(&(dimension, x, y, z)).cloned()
    }

    async fn wait_next_tick(&self) {}

    fn structures_at(&self, dimension: Dimension, chunk: ChunkCoord) -> Vec<String> {
      self.structures.lock().unwrap().get(&(dimension, chunk)).cloned().unwrap_or_default()
    }

    fn known_players(&self) -> Vec<(Dimension, ChunkCoord)> {
      self.players.lock().unwrap().clone()
    }
  }

}
