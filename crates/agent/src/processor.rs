//! Job Processor: the cooperative single-threaded scan loop.

use std::collections::VecDeque;
use std::sync::Arc;

use cartograph_protocol::{
  ChunkBatchRequest, ChunkPayload, QueueStatusPayload, StructureBatchRequest, StructureRecord,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::consts::{
  MAX_CHUNK_LOAD_ATTEMPTS, MIN_BLOCKS_THRESHOLD, PROCESS_INTERVAL_TICKS,
  RESORT_QUEUE_THRESHOLD, STATUS_UPDATE_INTERVAL_JOBS, STATUS_UPDATE_MIN_INTERVAL_MS,
  TIMING_RING_CAPACITY,
};
use crate::queue::{JobKind, JobQueue, Priority};
use crate::runtime::{LoadAreaHandle, WorldRect, WorldRuntime};
use crate::scanner;
use crate::structures::{discover_structures, DiscoveredStructure};
use crate::upload::Uploader;

/// Ring buffer of recent job durations, for ETA estimation.
#[derive(Debug, Default)]
pub struct TimingRing {
  samples: VecDeque<u64>,
}

impl TimingRing {
  pub fn record(&mut self, millis: u64) {
    if self.samples.len() == TIMING_RING_CAPACITY {
      self.samples.pop_front();
    }
    self.samples.push_back(millis);
  }

  pub fn avg_ms(&self) -> Option<f64> {
    if self.samples.is_empty() {
      None
    } else {
      Some(self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64)
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
  Stopped,
  Running,
}

/// Mutable processor state guarded by a single lock, mirroring the
/// single-threaded-cooperative scheduling model: only one tick's worth
/// of work is ever in flight.
pub struct ProcessorState {
  run_state: RunState,
  timing: TimingRing,
  current_load_area: Option<LoadAreaHandle>,
  last_status_update_ms: i64,
  completions_since_status: u32,
}

impl Default for ProcessorState {
  fn default() -> Self {
    Self {
      run_state: RunState::Stopped,
      timing: TimingRing::default(),
      current_load_area: None,
      last_status_update_ms: 0,
      completions_since_status: 0,
    }
  }
}

/// Orchestrates the queue, the world runtime and the uploader through the
/// acquire/poll/upload/release protocol for a single job.
pub struct JobProcessor<R: WorldRuntime> {
  runtime: Arc<R>,
  queue: Mutex<JobQueue>,
  state: Mutex<ProcessorState>,
  uploader: Uploader,
  tick_counter: Mutex<u32>,
}

/// Outcome of processing a single tick, surfaced mostly for tests.
#[derive(Debug, Default)]
pub struct TickOutcome {
  pub chunks_uploaded: usize,
  pub structures_uploaded: usize,
  pub status_emitted: bool,
}

impl<R: WorldRuntime> JobProcessor<R> {
  pub fn new(runtime: Arc<R>, uploader: Uploader) -> Self {
    Self {
      runtime,
      queue: Mutex::new(JobQueue::new()),
      state: Mutex::new(ProcessorState::default()),
      uploader,
      tick_counter: Mutex::new(0),
    }
  }

  pub fn queue(&self) -> &Mutex<JobQueue> {
    &self.queue
  }

  /// `Stopped -> Running`. A no-op if already running.
  pub async fn start(&self) {
    let mut state = self.state.lock().await;
    if state.run_state == RunState::Running {
      return;
    }
    state.run_state = RunState::Running;
    info!("processor started");
  }

  /// `Running -> Stopped`, releasing any held LoadArea.
  pub async fn stop(&self) {
    let mut state = self.state.lock().await;
    if let Some(handle) = state.current_load_area.take() {
      self.runtime.release_load_area(handle);
    }
    state.run_state = RunState::Stopped;
    info!("processor stopped");
  }

  pub async fn is_running(&self) -> bool {
    self.state.lock().await.run_state == RunState::Running
  }

  /// Advances one scheduler tick. Fires processing logic only every
  /// [`PROCESS_INTERVAL_TICKS`] calls, to avoid scanning on every single
  /// game tick.
  pub async fn on_scheduler_tick(&self, now_ms: i64) -> Option<TickOutcome> {
    if !self.is_running().await {
      return None;
    }
    let mut counter = self.tick_counter.lock().await;
    *counter += 1;
    if *counter % PROCESS_INTERVAL_TICKS != 0 {
      return None;
    }
    drop(counter);
    Some(self.process_tick(now_ms).await)
  }

  async fn process_tick(&self, now_ms: i64) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    let job = {
      let mut queue = self.queue.lock().await;
      queue.take_next()
    };
    let Some(job) = job else {
      return outcome;
    };

    let started = std::time::Instant::now();
    let mut chunk_payloads = Vec::new();
    let mut structures = Vec::new();

    match self.process_job(&job, now_ms).await {
      Ok(Some(result)) => {
        chunk_payloads.extend(result.payloads);
        structures.extend(result.structures);
      }
      Ok(None) => {
        // Re-enqueued internally (underload, load timeout): nothing to upload.
      }
      Err(error) => {
        error!(job_id = job.id, %error, "job failed, dropping payload for this tick");
      }
    }

    {
      let mut queue = self.queue.lock().await;
      queue.complete(&job);
    }
    self.state.lock().await.timing.record(started.elapsed().as_millis() as u64);

    if !chunk_payloads.is_empty() {
      let batch = ChunkBatchRequest { chunks: chunk_payloads };
      outcome.chunks_uploaded = batch.chunks.len();
      if let Err(error) = self.uploader.upload_chunks(&batch).await {
        warn!(%error, "chunk batch upload failed");
      }
    }

    if !structures.is_empty() {
      let records: Vec<StructureRecord> = structures
        .iter()
        .map(|s| StructureRecord {
          structure_type: s.structure_type.clone(),
          x: s.extents().center().0,
          y: 64,
          z: s.extents().center().1,
          dimension: s.dimension,
          extents: s.extents(),
          discovered_at: s.discovered_at,
        })
        .collect();
      outcome.structures_uploaded = records.len();
      let batch = StructureBatchRequest { structures: records };
      if let Err(error) = self.uploader.upload_structures(&batch).await {
        warn!(%error, "structure batch upload failed");
      }
    }

    outcome.status_emitted = self.maybe_emit_status(now_ms).await;

    let queue_len = self.queue.lock().await.len();
    if queue_len > RESORT_QUEUE_THRESHOLD {
      let players = self.runtime.known_players();
      self.queue.lock().await.resort(&players);
    }

    outcome
  }

  async fn maybe_emit_status(&self, now_ms: i64) -> bool {
    let should_emit = {
      let mut state = self.state.lock().await;
      state.completions_since_status += 1;
      let queue_empty = self.queue.lock().await.is_empty();
      let due = state.completions_since_status >= STATUS_UPDATE_INTERVAL_JOBS || queue_empty;
      let elapsed = now_ms - state.last_status_update_ms;
      if due && elapsed >= STATUS_UPDATE_MIN_INTERVAL_MS as i64 {
        state.completions_since_status = 0;
        state.last_status_update_ms = now_ms;
        true
      } else {
        false
      }
    };

    if should_emit {
      let stats = self.queue.lock().await.stats();
      let avg = self.state.lock().await.timing.avg_ms();
      let eta = avg.map(|a| a * stats.queue_size as f64);
      let payload = QueueStatusPayload {
        queue_size: stats.queue_size,
        completed_count: stats.jobs_processed,
        total_count: stats.jobs_processed + stats.queue_size as u64,
        completion_percent: if stats.jobs_processed + stats.queue_size as u64 == 0 {
          100.0
        } else {
          100.0 * stats.jobs_processed as f64 / (stats.jobs_processed + stats.queue_size as u64) as f64
        },
        eta_ms: if stats.queue_size == 0 { None } else { eta },
        avg_job_time_ms: avg,
        is_processing: stats.is_processing,
      };
      if let Err(error) = self.uploader.upload_queue_status(&payload).await {
        debug!(%error, "queue status upload failed");
      }
    }
    should_emit
  }

  async fn process_job(
    &self,
    job: &crate::queue::Job,
    now_ms: i64,
  ) -> Result<Option<JobResult>, ProcessError> {
    let rect = match job.kind {
      JobKind::FullChunk { chunk } => WorldRect::chunk(job.dimension, chunk),
      JobKind::AreaScan { center_x, center_z, radius } => {
        WorldRect::around(job.dimension, center_x, center_z, radius)
      }
    };

    if job.priority != Priority::Immediate {
      let handle = self.runtime.register_load_area(rect).await;
      self.state.lock().await.current_load_area = Some(handle);

      let center = job.kind.center_chunk();
      let mut loaded = self.runtime.is_chunk_loaded(job.dimension, center);
      let mut attempts = 0;
      while !loaded && attempts < MAX_CHUNK_LOAD_ATTEMPTS {
        self.runtime.wait_next_tick().await;
        loaded = self.runtime.is_chunk_loaded(job.dimension, center);
        attempts += 1;
      }

      if !loaded {
        self.queue.lock().await.requeue(job.clone(), Priority::Low);
        let held = self.state.lock().await.current_load_area.take();
        if let Some(h) = held {
          self.runtime.release_load_area(h);
        }
        return Ok(None);
      }
    }

    let result = self.scan_and_discover(job, now_ms).await;

    {
      let mut state = self.state.lock().await;
      if let Some(handle) = state.current_load_area.take() {
        self.runtime.release_load_area(handle);
      }
    }

    result
  }

  async fn scan_and_discover(
    &self,
    job: &crate::queue::Job,
    now_ms: i64,
  ) -> Result<Option<JobResult>, ProcessError> {
    let payloads = match job.kind {
      JobKind::FullChunk { chunk } => {
        let payload = scanner::scan_chunk(self.runtime.as_ref(), job.dimension, chunk.chunk_x, chunk.chunk_z);
        if payload.blocks.len() < MIN_BLOCKS_THRESHOLD {
          self.queue.lock().await.requeue(job.clone(), Priority::Low);
          return Ok(None);
        }
        vec![payload]
      }
      JobKind::AreaScan { center_x, center_z, radius } => {
        scanner::scan_area(self.runtime.as_ref(), job.dimension, center_x, center_z, radius)
      }
    };

    let mut structures = Vec::new();
    if let JobKind::FullChunk { chunk } = job.kind {
      structures = discover_structures(self.runtime.as_ref(), job.dimension, chunk, now_ms);
    }

    Ok(Some(JobResult { payloads, structures }))
  }
}

struct JobResult {
  payloads: Vec<ChunkPayload>,
  structures: Vec<DiscoveredStructure>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
  #[error("scan failed: {0}")]
  Scan(String),
}
