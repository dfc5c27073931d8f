//! Tile Store: content-addressed on-disk layout with atomic writes.

use std::path::PathBuf;

use cartograph_protocol::TileCoord;

#[derive(Debug, thiserror::Error)]
pub enum TileStoreError {
  #[error("reading tile at {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("writing tile at {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("clearing tile tree at {path}: {source}")]
  Clear {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Filesystem-backed store under `{data_dir}/tiles/...`.
#[derive(Debug, Clone)]
pub struct TileStore {
  root: PathBuf,
}

impl TileStore {
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    Self { root: data_dir.into().join("tiles") }
  }

  fn path_for(&self, coord: TileCoord) -> PathBuf {
    self.root.join(coord.relative_path())
  }

  pub fn exists(&self, coord: TileCoord) -> bool {
    self.path_for(coord).is_file()
  }

  pub async fn read(&self, coord: TileCoord) -> Result<Option<Vec<u8>>, TileStoreError> {
    let path = self.path_for(coord);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(TileStoreError::Read { path, source }),
    }
  }

  /// Writes `bytes` to a temp file beside the target, then renames into
  /// place, so concurrent readers always see either the old or new file in
  /// full, never a torn one.
  pub async fn write(&self, coord: TileCoord, bytes: &[u8]) -> Result<(), TileStoreError> {
    let path = self.path_for(coord);
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| TileStoreError::Write { path: path.clone(), source })?;
    }

    let tmp_path = path.with_extension(format!("png.tmp-{}", std::process::id()));
    tokio::fs::write(&tmp_path, bytes)
      .await
      .map_err(|source| TileStoreError::Write { path: tmp_path.clone(), source })?;
    tokio::fs::rename(&tmp_path, &path)
      .await
      .map_err(|source| TileStoreError::Write { path: path.clone(), source })?;
    Ok(())
  }

  pub async fn delete(&self, coord: TileCoord) -> Result<(), TileStoreError> {
    let path = self.path_for(coord);
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(TileStoreError::Write { path, source }),
    }
  }

  /// Removes the entire tiles tree and recreates the skeleton root
  /// directory. A `write()` racing this call must still leave its tile
  /// surviving; since each write recreates its own parent directories, a
  /// write that lands after `clear_all` wins outright.
  pub async fn clear_all(&self) -> Result<(), TileStoreError> {
    if let Err(source) = tokio::fs::remove_dir_all(&self.root).await {
      if source.kind() != std::io::ErrorKind::NotFound {
        return Err(TileStoreError::Clear { path: self.root.clone(), source });
      }
    }
    tokio::fs::create_dir_all(&self.root)
      .await
      .map_err(|source| TileStoreError::Clear { path: self.root.clone(), source })?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cartograph_protocol::{Dimension, MapType};
  use tempfile::TempDir;

  fn coord() -> TileCoord {
    TileCoord::new(Dimension::Overworld, MapType::Block, 0, 1, 2)
  }

  #[tokio::test]
  async fn write_then_read_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = TileStore::new(dir.path());
    assert!(!store.exists(coord()));
    store.write(coord(), b"png-bytes").await.unwrap();
    assert!(store.exists(coord()));
    let bytes = store.read(coord()).await.unwrap().unwrap();
    assert_eq!(bytes, b"png-bytes");
  }

  #[tokio::test]
  async fn read_missing_tile_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = TileStore::new(dir.path());
    assert!(store.read(coord()).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn clear_all_then_write_survives() {
    let dir = TempDir::new().unwrap();
    let store = TileStore::new(dir.path());
    store.write(coord(), b"first").await.unwrap();
    store.clear_all().await.unwrap();
    assert!(!store.exists(coord()));
    store.write(coord(), b"second").await.unwrap();
    assert_eq!(store.read(coord()).await.unwrap().unwrap(), b"second");
  }

  #[tokio::test]
  async fn delete_missing_tile_is_ok() {
    let dir = TempDir::new().unwrap();
    let store = TileStore::new(dir.path());
    store.delete(coord()).await.unwrap();
  }
}
