//! Prioritized, deduplicated, dynamically re-sortable job queue.

use std::collections::{HashMap, HashSet};

use cartograph_protocol::{ChunkCoord, Dimension};

use crate::consts::{RESORT_HIGH_DISTANCE, RESORT_NORMAL_DISTANCE};

/// Job priority. Declaration order matches the spec's numeric values
/// (`Immediate(0) < High(1) < Normal(2) < Low(3)`), so the derived `Ord`
/// is exactly `compare(a, b) = a.priority - b.priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
  Immediate,
  High,
  Normal,
  Low,
}

impl Priority {
  pub const ALL: [Priority; 4] = [Priority::Immediate, Priority::High, Priority::Normal, Priority::Low];
}

/// What a job actually does once it's scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
  FullChunk { chunk: ChunkCoord },
  AreaScan { center_x: i32, center_z: i32, radius: i32 },
}

impl JobKind {
  /// The chunk this job's work is centered on, used for proximity re-sort
  /// and load-area sizing.
  pub fn center_chunk(&self) -> ChunkCoord {
    match self {
      JobKind::FullChunk { chunk } => *chunk,
      JobKind::AreaScan { center_x, center_z, .. } => {
        ChunkCoord::new(center_x.div_euclid(16), center_z.div_euclid(16))
      }
    }
  }

  fn dedup_key(&self, dimension: Dimension) -> String {
    match self {
      JobKind::FullChunk { chunk } => {
        format!("chunk:{}:{}:{}", dimension.tag(), chunk.chunk_x, chunk.chunk_z)
      }
      JobKind::AreaScan { center_x, center_z, radius } => {
        format!("area:{}:{}:{}:{}", dimension.tag(), center_x, center_z, radius)
      }
    }
  }
}

/// A queued unit of scan work.
#[derive(Debug, Clone)]
pub struct Job {
  pub id: u64,
  pub kind: JobKind,
  pub dimension: Dimension,
  pub priority: Priority,
  /// Insertion sequence number, standing in for wall-clock `createdAt` as
  /// the tiebreak: it increases monotonically with every enqueue, which is
  /// all the queue's ordering invariant requires, and keeps
  /// queue ordering deterministic in tests.
  pub sequence: u64,
  pub source_player: Option<String>,
}

impl Job {
  pub fn key(&self) -> String {
    self.kind.dedup_key(self.dimension)
  }
}

/// Optional fields for an enqueue call.
#[derive(Debug, Clone, Default)]
pub struct EnqueueOpts {
  pub priority: Option<Priority>,
  pub source_player: Option<String>,
}

impl EnqueueOpts {
  pub fn with_priority(priority: Priority) -> Self {
    Self { priority: Some(priority), source_player: None }
  }
}

/// Snapshot of queue health.
#[derive(Debug, Clone)]
pub struct QueueStats {
  pub queue_size: usize,
  pub by_priority: HashMap<Priority, usize>,
  pub is_processing: bool,
  pub jobs_processed: u64,
  pub current_batch_size: usize,
}

/// The job queue itself: an ordered sequence plus a dedup-key set.
#[derive(Debug, Default)]
pub struct JobQueue {
  jobs: Vec<Job>,
  pending_keys: HashSet<String>,
  next_id: u64,
  next_sequence: u64,
  pub(crate) jobs_processed: u64,
  pub(crate) is_processing: bool,
  pub(crate) current_batch_size: usize,
}

fn order_key(job: &Job) -> (Priority, u64) {
  (job.priority, job.sequence)
}

impl JobQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn enqueue_full_chunk(
    &mut self,
    dimension: Dimension,
    chunk_x: i32,
    chunk_z: i32,
    opts: EnqueueOpts,
  ) {
    let priority = opts.priority.unwrap_or(Priority::Normal);
    self.insert(
      JobKind::FullChunk { chunk: ChunkCoord::new(chunk_x, chunk_z) },
      dimension,
      priority,
      opts.source_player,
    );
  }

  pub fn enqueue_area_scan(
    &mut self,
    dimension: Dimension,
    center_x: i32,
    center_z: i32,
    radius: i32,
    opts: EnqueueOpts,
  ) {
    let priority = opts.priority.unwrap_or(Priority::Immediate);
    self.insert(
      JobKind::AreaScan { center_x, center_z, radius },
      dimension,
      priority,
      opts.source_player,
    );
  }

  pub fn enqueue_many(
    &mut self,
    dimension: Dimension,
    coords: impl IntoIterator<Item = (i32, i32)>,
    opts: EnqueueOpts,
  ) {
    for (chunk_x, chunk_z) in coords {
      self.enqueue_full_chunk(dimension, chunk_x, chunk_z, opts.clone());
    }
  }

  pub fn is_queued(&self, dimension: Dimension, chunk_x: i32, chunk_z: i32) -> bool {
    let key = JobKind::FullChunk { chunk: ChunkCoord::new(chunk_x, chunk_z) }.dedup_key(dimension);
    self.pending_keys.contains(&key)
  }

  fn insert(&mut self, kind: JobKind, dimension: Dimension, priority: Priority, source_player: Option<String>) {
    let key = kind.dedup_key(dimension);
    if let Some(existing) = self.jobs.iter().position(|j| j.key() == key) {
      if priority < self.jobs[existing].priority {
        let mut job = self.jobs.remove(existing);
        job.priority = priority;
        self.binary_insert(job);
      }
      // Otherwise: incoming priority is not strictly higher, drop silently.
      return;
    }

    let job = Job {
      id: self.next_id,
      kind,
      dimension,
      priority,
      sequence: self.next_sequence,
      source_player,
    };
    self.next_id += 1;
    self.next_sequence += 1;
    self.pending_keys.insert(key);
    self.binary_insert(job);
  }

  fn binary_insert(&mut self, job: Job) {
    let pos = self.jobs.partition_point(|existing| order_key(existing) <= order_key(&job));
    self.jobs.insert(pos, job);
  }

  /// Takes the highest-priority job off the front of the queue without
  /// releasing its dedup key — the key stays reserved until [`complete`] or
  /// [`requeue`] is called, so a duplicate external enqueue arriving while
  /// the job is being processed is still dropped.
  ///
  /// [`complete`]: JobQueue::complete
  /// [`requeue`]: JobQueue::requeue
  pub fn take_next(&mut self) -> Option<Job> {
    if self.jobs.is_empty() {
      None
    } else {
      Some(self.jobs.remove(0))
    }
  }

  /// Puts a job back in the queue (typically at a downgraded priority)
  /// without releasing its dedup key or bumping `jobs_processed`.
  pub fn requeue(&mut self, mut job: Job, priority: Priority) {
    job.priority = priority;
    self.binary_insert(job);
  }

  /// Marks a job as fully processed: releases its dedup key and increments
  /// the processed counter.
  pub fn complete(&mut self, job: &Job) {
    self.pending_keys.remove(&job.key());
    self.jobs_processed += 1;
  }

  pub fn len(&self) -> usize {
    self.jobs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.jobs.is_empty()
  }

  pub fn clear(&mut self) {
    self.jobs.clear();
    self.pending_keys.clear();
  }

  /// Re-sorts pending jobs by proximity to known players, never downgrading
  /// a job's priority.
  pub fn resort(&mut self, players: &[(Dimension, ChunkCoord)]) {
    for job in &mut self.jobs {
      let nearest = players
        .iter()
        .filter(|(dim, _)| *dim == job.dimension)
        .map(|(_, pos)| job.kind.center_chunk().distance(*pos))
        .fold(f64::INFINITY, f64::min);

      if nearest <= RESORT_HIGH_DISTANCE && job.priority > Priority::High {
        job.priority = Priority::High;
      } else if nearest <= RESORT_NORMAL_DISTANCE && job.priority > Priority::Normal {
        job.priority = Priority::Normal;
      }
    }
    self.jobs.sort_by_key(order_key);
  }

  pub fn stats(&self) -> QueueStats {
    let mut by_priority = HashMap::new();
    for priority in Priority::ALL {
      by_priority.insert(priority, self.jobs.iter().filter(|j| j.priority == priority).count());
    }
    QueueStats {
      queue_size: self.jobs.len(),
      by_priority,
      is_processing: self.is_processing,
      jobs_processed: self.jobs_processed,
      current_batch_size: self.current_batch_size,
    }
  }

  /// Iterates jobs in queue order, for tests and diagnostics.
  pub fn iter(&self) -> impl Iterator<Item = &Job> {
    self.jobs.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cartograph_protocol::Dimension::Overworld;

  fn chunks(q: &JobQueue) -> Vec<(i32, i32, Priority)> {
    q.iter()
      .map(|j| match j.kind {
        JobKind::FullChunk { chunk } => (chunk.chunk_x, chunk.chunk_z, j.priority),
        JobKind::AreaScan { center_x, center_z, .. } => (center_x, center_z, j.priority),
      })
      .collect()
  }

  #[test]
  fn s1_scheduler_basic() {
    let mut q = JobQueue::new();
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::Normal));
    q.enqueue_full_chunk(Overworld, 1, 0, EnqueueOpts::with_priority(Priority::Low));
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::High));

    assert_eq!(q.len(), 2);
    assert_eq!(
      chunks(&q),
      vec![(0, 0, Priority::High), (1, 0, Priority::Low)]
    );
  }

  #[test]
  fn s2_dedup() {
    let mut q = JobQueue::new();
    let coords: Vec<(i32, i32)> = (0..4).flat_map(|i| (0..4).map(move |j| (i, j))).collect();
    q.enqueue_many(Overworld, coords.clone(), EnqueueOpts::default());
    q.enqueue_many(Overworld, coords, EnqueueOpts::default());
    assert_eq!(q.len(), 16);
  }

  #[test]
  fn dedup_never_exceeds_one_job_per_key() {
    let mut q = JobQueue::new();
    for _ in 0..5 {
      q.enqueue_full_chunk(Overworld, 3, 3, EnqueueOpts::default());
    }
    assert_eq!(q.len(), 1);
  }

  #[test]
  fn lower_priority_enqueue_is_dropped_silently() {
    let mut q = JobQueue::new();
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::High));
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::Low));
    assert_eq!(q.len(), 1);
    assert_eq!(q.iter().next().unwrap().priority, Priority::High);
  }

  #[test]
  fn queue_always_sorted_after_insert() {
    let mut q = JobQueue::new();
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::Low));
    q.enqueue_full_chunk(Overworld, 1, 0, EnqueueOpts::with_priority(Priority::Immediate));
    q.enqueue_full_chunk(Overworld, 2, 0, EnqueueOpts::with_priority(Priority::Normal));
    let priorities: Vec<_> = q.iter().map(|j| j.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
  }

  #[test]
  fn resort_never_increases_priority_number() {
    let mut q = JobQueue::new();
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::Low));
    let before: Vec<_> = q.iter().map(|j| j.priority).collect();
    q.resort(&[(Overworld, ChunkCoord::new(100, 100))]); // far away, no upgrade
    let after: Vec<_> = q.iter().map(|j| j.priority).collect();
    for (b, a) in before.iter().zip(after.iter()) {
      assert!(a <= b, "resort increased a priority number");
    }
  }

  #[test]
  fn resort_upgrades_nearby_jobs_and_sorts() {
    let mut q = JobQueue::new();
    q.enqueue_full_chunk(Overworld, 10, 10, EnqueueOpts::with_priority(Priority::Low));
    q.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::Low));
    q.resort(&[(Overworld, ChunkCoord::new(0, 1))]); // distance 1 from (0,0)
    let job = q.iter().find(|j| matches!(j.kind, JobKind::FullChunk { chunk } if chunk == ChunkCoord::new(0, 0))).unwrap();
    assert_eq!(job.priority, Priority::High);
  }

  #[test]
  fn is_queued_reflects_pending_key() {
    let mut q = JobQueue::new();
    assert!(!q.is_queued(Overworld, 5, 5));
    q.enqueue_full_chunk(Overworld, 5, 5, EnqueueOpts::default());
    assert!(q.is_queued(Overworld, 5, 5));
  }

  #[test]
  fn take_next_keeps_key_reserved_until_complete() {
    let mut q = JobQueue::new();
    q.enqueue_full_chunk(Overworld, 1, 1, EnqueueOpts::default());
    let job = q.take_next().unwrap();
    assert!(q.is_queued(Overworld, 1, 1), "key released before complete()");
    q.complete(&job);
    assert!(!q.is_queued(Overworld, 1, 1));
  }
}
