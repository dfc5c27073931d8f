//! Scan agent entry point.
//!
//! The host game runtime that actually implements [`cartograph_agent::WorldRuntime`]
//! is out of scope here; this binary wires the scheduler loop
//! together and expects to be embedded by something that supplies a real
//! runtime and drives [`JobProcessor::on_scheduler_tick`] from its own tick
//! source. What's runnable standalone is config/logging bootstrap and the
//! queue/processor wiring, ready for that embedding.

use std::sync::Arc;

use anyhow::Context;
use cartograph_agent::{AgentConfig, JobProcessor, Uploader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = AgentConfig::from_env().context("loading agent configuration")?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::new(config.log_level.as_tracing_filter()))
    .init();

  tracing::info!(server = %config.server_base_url, "cartograph agent starting");

  let uploader = Uploader::new(config.server_base_url.clone(), config.auth_token.clone());
  let _processor = Arc::new(JobProcessor::new(Arc::new(NoopRuntime), uploader));

  tracing::warn!("no WorldRuntime embedder wired; agent is idle until one drives the processor");
  Ok(())
}

/// Placeholder [`cartograph_agent::WorldRuntime`] used only so this binary
/// builds standalone; a real embedding replaces it with a handle into the
/// host game runtime.
struct NoopRuntime;

#[async_trait::async_trait]
impl cartograph_agent::WorldRuntime for NoopRuntime {
  async fn register_load_area(&self, _rect: cartograph_agent::WorldRect) -> cartograph_agent::LoadAreaHandle {
    cartograph_agent::LoadAreaHandle(0)
  }

  fn release_load_area(&self, _handle: cartograph_agent::LoadAreaHandle) {}

  fn is_chunk_loaded(&self, _dimension: cartograph_protocol::Dimension, _chunk: cartograph_protocol::ChunkCoord) -> bool {
    false
  }

  fn block_at(
    &self,
    _dimension: cartograph_protocol::Dimension,
    _x: i32,
    _y: i32,
    _z: i32,
  ) -> Option<cartograph_agent::BlockInfo> {
    None
  }

  async fn wait_next_tick(&self) {}

  fn structures_at(&self, _dimension: cartograph_protocol::Dimension, _chunk: cartograph_protocol::ChunkCoord) -> Vec<String> {
    Vec::new()
  }

  fn known_players(&self) -> Vec<(cartograph_protocol::Dimension, cartograph_protocol::ChunkCoord)> {
    Vec::new()
  }
}
