//! Per-Tile Lock: a keyed mutex so reads and writes to one tile are
//! serialized while unrelated tiles proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// A map from tile-lock-key to a per-key [`tokio::sync::Mutex`]. Acquiring
/// a key's guard blocks only other acquirers of the *same* key; the
/// top-level map mutex is held only briefly, to insert or look up the
/// per-key entry.
#[derive(Default)]
pub struct TileLockTable {
  locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Holds a tile's lock for the lifetime of this guard.
pub struct TileLockGuard {
  _guard: tokio::sync::OwnedMutexGuard<()>,
}

impl TileLockTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Acquires the lock for `key`, suspending until any other holder
  /// releases it.
  pub async fn acquire(&self, key: impl Into<String>) -> TileLockGuard {
    let key = key.into();
    let entry = {
      let mut locks = self.locks.lock().await;
      locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    };
    let guard = entry.lock_owned().await;
    TileLockGuard { _guard: guard }
  }
}
