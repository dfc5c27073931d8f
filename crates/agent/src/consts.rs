//! Scheduler tuning constants.

/// One processor tick fires every this many scheduler ticks.
pub const PROCESS_INTERVAL_TICKS: u32 = 2;

/// Jobs taken off the queue per processor tick.
pub const MAX_JOBS_PER_TICK: usize = 1;

/// Attempts (one per scheduler tick) to wait for a load area's chunks to load.
pub const MAX_CHUNK_LOAD_ATTEMPTS: u32 = 10;

/// A full-chunk scan producing fewer blocks than this is treated as underload.
pub const MIN_BLOCKS_THRESHOLD: usize = 128;

/// Emit a queue-status update after this many completions...
pub const STATUS_UPDATE_INTERVAL_JOBS: u32 = 5;

/// ...subject to this floor between updates.
pub const STATUS_UPDATE_MIN_INTERVAL_MS: u64 = 2000;

/// Flood-fill structure discovery never records more chunks than this.
pub const MAX_FLOOD_FILL_CHUNKS: usize = 100;

/// Queue length above which a processing tick triggers an automatic resort.
pub const RESORT_QUEUE_THRESHOLD: usize = 50;

/// Recent job durations kept for ETA estimation.
pub const TIMING_RING_CAPACITY: usize = 50;

/// Jobs within this chunk-distance of a player are bumped to High priority.
pub const RESORT_HIGH_DISTANCE: f64 = 2.0;

/// Jobs within this chunk-distance of a player are bumped to Normal priority.
pub const RESORT_NORMAL_DISTANCE: f64 = 5.0;
