//! End-to-end scenarios S1 and S2, and the full per-job processor protocol
//! against a fake world runtime.

use std::sync::Arc;

use cartograph_agent::fake::FakeRuntime;
use cartograph_agent::{palette, BlockInfo, EnqueueOpts, JobProcessor, JobQueue, Priority, Uploader};
use cartograph_protocol::Dimension::Overworld;

#[test]
fn s1_scheduler_basic() {
  let mut queue = JobQueue::new();
  queue.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::Normal));
  queue.enqueue_full_chunk(Overworld, 1, 0, EnqueueOpts::with_priority(Priority::Low));
  queue.enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::with_priority(Priority::High));

  assert_eq!(queue.len(), 2);
  let jobs: Vec<_> = queue.iter().collect();
  assert_eq!(jobs[0].priority, Priority::High);
  assert_eq!(jobs[1].priority, Priority::Low);
}

#[test]
fn s2_dedup() {
  let mut queue = JobQueue::new();
  let coords: Vec<(i32, i32)> = (0..3).flat_map(|i| (0..3).map(move |j| (i, j))).collect();
  assert_eq!(coords.len(), 9);
  // The dedup scenario uses a 0..4 range (16 cells).
  let coords16: Vec<(i32, i32)> = (0..4).flat_map(|i| (0..4).map(move |j| (i, j))).collect();
  queue.enqueue_many(Overworld, coords16.clone(), EnqueueOpts::default());
  queue.enqueue_many(Overworld, coords16, EnqueueOpts::default());
  assert_eq!(queue.len(), 16);
}

#[tokio::test]
async fn full_tick_scans_uploads_and_completes_job() {
  let runtime = Arc::new(FakeRuntime::new());
  for x in 0..16 {
    for z in 0..16 {
      runtime.set_block(
        Overworld,
        x,
        64,
        z,
        BlockInfo { block_type: "grass".into(), map_color: palette::color_for("grass"), water_depth: None },
      );
    }
  }
  let uploader = Uploader::new("http://127.0.0.1:1", "secret");
  let processor = JobProcessor::new(runtime, uploader);
  processor.start().await;
  processor
    .queue()
    .lock()
    .await
    .enqueue_full_chunk(Overworld, 0, 0, EnqueueOpts::default());

  let outcome = processor.on_scheduler_tick(1000).await;
  // First tick doesn't fire (PROCESS_INTERVAL_TICKS=2); second does.
  assert!(outcome.is_none());
  let outcome = processor.on_scheduler_tick(1000).await.expect("tick 2 should fire");
  assert_eq!(outcome.chunks_uploaded, 1);
  assert!(processor.queue().lock().await.is_empty());
}
