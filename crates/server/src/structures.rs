//! Structure Merger: bounding-box overlap/adjacency detection and merging
//! of same-type structures per dimension, with best-effort JSON persistence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use cartograph_protocol::{Dimension, StructureRecord};
use tracing::error;

/// In-memory structure store, one JSON file per dimension under
/// `{data_dir}/structures/{dimension}.json` persisted best-effort on every
/// mutation.
pub struct StructureStore {
  data_dir: PathBuf,
  by_dimension: Mutex<HashMap<Dimension, Vec<StructureRecord>>>,
}

impl StructureStore {
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    Self { data_dir: data_dir.into(), by_dimension: Mutex::new(HashMap::new()) }
  }

  fn path_for(&self, dimension: Dimension) -> PathBuf {
    self.data_dir.join("structures").join(format!("{}.json", dimension.tag()))
  }

  pub fn list(&self, dimension: Dimension) -> Vec<StructureRecord> {
    self.by_dimension.lock().unwrap().get(&dimension).cloned().unwrap_or_default()
  }

  /// Inserts `incoming`, merging with any existing structure of the same
  /// type whose box overlaps or is edge-adjacent, or discarding it if
  /// fully contained by one. Returns `true` if the store changed.
  pub fn insert(&self, incoming: StructureRecord) -> bool {
    let mut by_dimension = self.by_dimension.lock().unwrap();
    let records = by_dimension.entry(incoming.dimension).or_default();

    let already_contained = records
      .iter()
      .any(|r| r.structure_type == incoming.structure_type && incoming.extents.contained_by(&r.extents));
    if already_contained {
      return false;
    }

    if let Some(pos) = records
      .iter()
      .position(|r| r.structure_type == incoming.structure_type && r.extents.overlaps_or_adjacent(&incoming.extents))
    {
      let existing = records[pos].clone();
      let merged_extents = existing.extents.union(&incoming.extents);
      let (cx, cz) = merged_extents.center();
      records[pos] = StructureRecord {
        structure_type: existing.structure_type,
        x: cx,
        y: existing.y,
        z: cz,
        dimension: existing.dimension,
        extents: merged_extents,
        discovered_at: existing.discovered_at.min(incoming.discovered_at),
      };
    } else {
      records.push(incoming);
    }
    true
  }

  /// Runs [`insert`](Self::insert) for every record in order, then persists
  /// any affected dimensions.
  pub async fn insert_batch(&self, records: Vec<StructureRecord>) {
    let mut dirty = std::collections::HashSet::new();
    for record in records {
      let dimension = record.dimension;
      if self.insert(record) {
        dirty.insert(dimension);
      }
    }
    for dimension in dirty {
      self.persist(dimension).await;
    }
  }

  async fn persist(&self, dimension: Dimension) {
    let path = self.path_for(dimension);
    let records = self.list(dimension);
    let Ok(json) = serde_json::to_vec_pretty(&records) else {
      error!(dimension = dimension.tag(), "failed to serialize structures for persistence");
      return;
    };
    if let Some(parent) = path.parent() {
      if let Err(error) = tokio::fs::create_dir_all(parent).await {
        tracing::error!(%error, "failed to create structures directory");
        return;
      }
    }
    if let Err(error) = tokio::fs::write(&path, json).await {
      tracing::error!(%error, path = %path.display(), "failed to persist structures");
    }
  }
}
